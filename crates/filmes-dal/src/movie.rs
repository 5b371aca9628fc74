use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use crate::{ChosenDB, Error, ListingParams, error::Result};
use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;

const VALID_ORDER_FIELDS: &[&str] = &["id", "title", "genre", "duration"];
const DEFAULT_ORDER: &str = "id";

/// Movie record as stored in database
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Movie {
    #[garde(skip)]
    pub id: i64,
    #[serde(rename = "titulo")]
    #[garde(length(min = 1))]
    pub title: String,
    #[serde(rename = "genero")]
    #[garde(length(min = 1))]
    pub genre: String,
    #[serde(rename = "duracao")]
    #[garde(range(min = 60, max = 300))]
    pub duration: i64,
}

// Write views share fields and rules, title is not required there
macro_rules! write_view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, Validate)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $name {
            #[serde(rename = "titulo", default)]
            #[garde(skip)]
            pub title: Option<String>,
            #[serde(rename = "genero", default)]
            #[garde(required, length(min = 1))]
            pub genre: Option<String>,
            #[serde(rename = "duracao", default)]
            #[garde(required, range(min = 60, max = 300))]
            pub duration: Option<i64>,
        }
    };
}

write_view!(
    /// Payload of new movie
    CreateMovie
);

write_view!(
    /// Full replacement of movie fields, also the working copy of a patch
    UpdateMovie
);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadMovie {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "genero")]
    pub genre: String,
    #[serde(rename = "duracao")]
    pub duration: i64,
}

/// Mutable fields of a movie, as addressed by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MovieField {
    Title,
    Genre,
    Duration,
}

impl MovieField {
    pub const ALL: [MovieField; 3] = [MovieField::Title, MovieField::Genre, MovieField::Duration];

    /// Name used in JSON payloads and patch paths
    pub fn wire_name(&self) -> &'static str {
        match self {
            MovieField::Title => "titulo",
            MovieField::Genre => "genero",
            MovieField::Duration => "duracao",
        }
    }

    /// Name of the struct attribute and of the table column
    pub fn column(&self) -> &'static str {
        match self {
            MovieField::Title => "title",
            MovieField::Genre => "genre",
            MovieField::Duration => "duration",
        }
    }

    /// Exact (case insensitive) match on wire name only
    pub fn from_wire_name(name: &str) -> Option<Self> {
        MovieField::ALL
            .into_iter()
            .find(|f| f.wire_name().eq_ignore_ascii_case(name))
    }

    pub fn is_text(&self) -> bool {
        !matches!(self, MovieField::Duration)
    }
}

impl Display for MovieField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown movie field: {0}")]
pub struct UnknownField(pub String);

/// Accepts both wire and column names, case insensitive
impl FromStr for MovieField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovieField::ALL
            .into_iter()
            .find(|f| f.wire_name().eq_ignore_ascii_case(s) || f.column().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Groups validation report by field wire name.
pub fn validation_errors(report: &garde::Report) -> BTreeMap<String, Vec<String>> {
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, error) in report.iter() {
        let path = path.to_string();
        let key = path
            .parse::<MovieField>()
            .map(|f| f.wire_name().to_string())
            .unwrap_or(path);
        errors
            .entry(key)
            .or_default()
            .push(error.message().to_string());
    }
    errors
}

pub type MovieRepository = MovieRepositoryImpl<Pool<ChosenDB>>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Inserts new record, `id` of the payload is ignored and assigned by the store
    pub async fn create(&self, movie: Movie) -> Result<Movie> {
        let result = sqlx::query("INSERT INTO movie (title, genre, duration) VALUES (?, ?, ?)")
            .bind(&movie.title)
            .bind(&movie.genre)
            .bind(movie.duration)
            .execute(&self.executor)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Created movie");
        Ok(Movie { id, ..movie })
    }

    pub async fn update(&self, movie: &Movie) -> Result<()> {
        let result = sqlx::query("UPDATE movie SET title = ?, genre = ?, duration = ? WHERE id = ?")
            .bind(&movie.title)
            .bind(&movie.genre)
            .bind(movie.duration)
            .bind(movie.id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound {
                entity: "Movie",
                id: movie.id,
            })
        } else {
            debug!(id = movie.id, "Updated movie");
            Ok(())
        }
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM movie")
            .fetch_one(&self.executor)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Movie>> {
        let order = params.ordering(VALID_ORDER_FIELDS, DEFAULT_ORDER)?;
        let records = sqlx::query_as::<_, Movie>(&format!(
            "SELECT id, title, genre, duration FROM movie ORDER BY {order} LIMIT ? OFFSET ?"
        ))
        .bind(params.limit)
        .bind(params.offset)
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound { entity: "Movie", id })
        } else {
            debug!(id, "Deleted movie");
            Ok(())
        }
    }

    pub async fn find(&self, id: i64) -> Result<Option<Movie>> {
        let record = sqlx::query_as::<_, Movie>(
            "SELECT id, title, genre, duration FROM movie WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        self.find(id)
            .await?
            .ok_or(Error::RecordNotFound { entity: "Movie", id })
    }
}
