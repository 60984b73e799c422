use serde::Serialize;

use crate::types::DbId;

/// A single rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the field (`deviceId`, `nitrogen`, `limit`, ...).
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more fields of a submission or query were rejected.
    #[error("Validation failed: {}", join_field_errors(.0))]
    InvalidFields(Vec<FieldError>),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Render field errors as `field: message; field: message`.
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_fields_display_lists_every_field() {
        let err = CoreError::InvalidFields(vec![
            FieldError::new("deviceId", "bad format"),
            FieldError::new("ph", "out of range"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: deviceId: bad format; ph: out of range"
        );
    }
}
