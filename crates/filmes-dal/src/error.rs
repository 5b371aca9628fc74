pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("{entity} {id} not found")]
    RecordNotFound { entity: &'static str, id: i64 },

    /// Record rejected by a table `CHECK` constraint
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) if e.is_check_violation() => {
                Error::ConstraintViolation(e.message().to_string())
            }
            other => Error::DatabaseError(other),
        }
    }
}
