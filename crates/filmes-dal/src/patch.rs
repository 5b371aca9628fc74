//! Partial update of a movie.
//!
//! Client sends JSON Patch like document (list of `{"op", "path", "from", "value"}`),
//! which is first converted into typed [`PatchOperation`]s over known movie fields.
//! Operations are applied in order to [`UpdateMovie`] snapshot of the movie, then the
//! snapshot is validated as whole and only then merged back into the movie.

use garde::Validate as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    mapper,
    movie::{Movie, MovieField, UpdateMovie},
};

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Malformed patch: {0}")]
    Malformed(String),
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] garde::Report),
}

fn malformed(msg: impl Into<String>) -> PatchError {
    PatchError::Malformed(msg.into())
}

/// One operation as received on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawOperation {
    pub op: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// `None` when member is absent, explicit `null` is `Some(Value::Null)`
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub value: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RawOperation {
    pub fn new(op: &str, path: &str, value: Value) -> Self {
        RawOperation {
            op: op.to_string(),
            path: Some(path.to_string()),
            from: None,
            value: Some(value),
        }
    }
}

fn required_value(value: Option<Value>, op: &str) -> Result<Value, PatchError> {
    value.ok_or_else(|| malformed(format!("Missing 'value' member for '{op}'")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(Option<String>),
    Minutes(Option<i64>),
}

impl FieldValue {
    fn parse(field: MovieField, value: Value) -> Result<Self, PatchError> {
        match (field.is_text(), value) {
            (true, Value::Null) => Ok(FieldValue::Text(None)),
            (true, Value::String(s)) => Ok(FieldValue::Text(Some(s))),
            (false, Value::Null) => Ok(FieldValue::Minutes(None)),
            (false, Value::Number(n)) => n
                .as_i64()
                .map(|n| FieldValue::Minutes(Some(n)))
                .ok_or_else(|| malformed(format!("Value {n} for '{field}' is not an integer"))),
            (_, other) => Err(malformed(format!("Invalid value {other} for '{field}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOperation {
    Add { path: MovieField, value: FieldValue },
    Remove { path: MovieField },
    Replace { path: MovieField, value: FieldValue },
    Move { from: MovieField, path: MovieField },
    Copy { from: MovieField, path: MovieField },
    Test { path: MovieField, value: FieldValue },
}

fn parse_pointer(pointer: Option<&str>, member: &str) -> Result<MovieField, PatchError> {
    let pointer = pointer.ok_or_else(|| malformed(format!("Missing '{member}' member")))?;
    let name = pointer
        .strip_prefix('/')
        .ok_or_else(|| malformed(format!("Path '{pointer}' must start with '/'")))?;
    MovieField::from_wire_name(name)
        .ok_or_else(|| malformed(format!("Path '{pointer}' does not address any field")))
}

impl TryFrom<RawOperation> for PatchOperation {
    type Error = PatchError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let op = raw.op.to_ascii_lowercase();
        let path = parse_pointer(raw.path.as_deref(), "path")?;
        let operation = match op.as_str() {
            "add" => PatchOperation::Add {
                path,
                value: FieldValue::parse(path, required_value(raw.value, &op)?)?,
            },
            "replace" => PatchOperation::Replace {
                path,
                value: FieldValue::parse(path, required_value(raw.value, &op)?)?,
            },
            "test" => PatchOperation::Test {
                path,
                value: FieldValue::parse(path, required_value(raw.value, &op)?)?,
            },
            "remove" => PatchOperation::Remove { path },
            "move" | "copy" => {
                let from = parse_pointer(raw.from.as_deref(), "from")?;
                if from.is_text() != path.is_text() {
                    return Err(malformed(format!(
                        "Cannot {op} '{from}' to '{path}', incompatible types"
                    )));
                }
                if op == "move" {
                    PatchOperation::Move { from, path }
                } else {
                    PatchOperation::Copy { from, path }
                }
            }
            other => return Err(malformed(format!("Unsupported operation '{other}'"))),
        };
        Ok(operation)
    }
}

fn field_value(view: &UpdateMovie, field: MovieField) -> FieldValue {
    match field {
        MovieField::Title => FieldValue::Text(view.title.clone()),
        MovieField::Genre => FieldValue::Text(view.genre.clone()),
        MovieField::Duration => FieldValue::Minutes(view.duration),
    }
}

fn set_field(view: &mut UpdateMovie, field: MovieField, value: FieldValue) -> Result<(), PatchError> {
    match (field, value) {
        (MovieField::Title, FieldValue::Text(v)) => view.title = v,
        (MovieField::Genre, FieldValue::Text(v)) => view.genre = v,
        (MovieField::Duration, FieldValue::Minutes(v)) => view.duration = v,
        (field, value) => {
            return Err(malformed(format!("Value {value:?} does not fit '{field}'")));
        }
    }
    Ok(())
}

fn clear_field(view: &mut UpdateMovie, field: MovieField) {
    match field {
        MovieField::Title => view.title = None,
        MovieField::Genre => view.genre = None,
        MovieField::Duration => view.duration = None,
    }
}

/// Ordered list of typed operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoviePatch {
    operations: Vec<PatchOperation>,
}

impl MoviePatch {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        MoviePatch { operations }
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    /// Applies all operations or none, `view` is not validated here.
    pub fn apply_to(&self, view: &mut UpdateMovie) -> Result<(), PatchError> {
        let mut working = view.clone();
        for operation in &self.operations {
            match operation {
                PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
                    set_field(&mut working, *path, value.clone())?
                }
                PatchOperation::Remove { path } => clear_field(&mut working, *path),
                PatchOperation::Move { from, path } => {
                    if from != path {
                        let value = field_value(&working, *from);
                        set_field(&mut working, *path, value)?;
                        clear_field(&mut working, *from);
                    }
                }
                PatchOperation::Copy { from, path } => {
                    let value = field_value(&working, *from);
                    set_field(&mut working, *path, value)?;
                }
                PatchOperation::Test { path, value } => {
                    if field_value(&working, *path) != *value {
                        return Err(malformed(format!("Test failed for '{path}'")));
                    }
                }
            }
        }
        *view = working;
        Ok(())
    }
}

impl TryFrom<Vec<RawOperation>> for MoviePatch {
    type Error = PatchError;

    fn try_from(document: Vec<RawOperation>) -> Result<Self, Self::Error> {
        document
            .into_iter()
            .map(PatchOperation::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(MoviePatch::new)
    }
}

/// Returns patched copy of `movie`, which passed validation.
/// `movie` itself is never modified, so failed patch has no effect.
pub fn patch_movie(movie: &Movie, patch: &MoviePatch) -> Result<Movie, PatchError> {
    let mut view = mapper::to_update_view(movie);
    patch.apply_to(&mut view)?;
    view.validate()?;
    let mut patched = movie.clone();
    mapper::apply_to_entity(view, &mut patched);
    Ok(patched)
}
