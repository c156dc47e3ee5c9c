use thiserror::Error;
use uuid::Uuid;

use crate::models::EntityKind;
use crate::validation::ValidationError;

/// Referential-integrity failures reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("{table}.{field} references missing {target} {id}")]
    Dangling {
        table: EntityKind,
        field: &'static str,
        target: EntityKind,
        id: Uuid,
    },

    #[error("{target} {id} is still referenced by {table}.{field}")]
    Restricted {
        target: EntityKind,
        id: Uuid,
        table: EntityKind,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        AppError::NotFound(format!("{kind} {id} not found"))
    }

    /// Label used for the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Reference(_) => "reference",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal",
        }
    }
}
