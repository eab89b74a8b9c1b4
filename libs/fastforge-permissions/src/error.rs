//! Error types for the permissions registry.

use thiserror::Error;

use crate::role::Role;

pub type PermissionsResult<T> = Result<T, PermissionsError>;

/// Errors raised by the permissions registry.
///
/// Permission queries never fail on missing data: an unknown model or role
/// resolves to an empty set. Registration only fails when strict validation
/// is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionsError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("empty attribute name registered for role '{role}' on '{model}'")]
    EmptyAttribute { model: String, role: Role },

    #[error("field '{field}' does not exist in {model}")]
    UnknownField { model: String, field: String },

    #[error("model name '{name}' is already registered by a different model type")]
    DuplicateModelName { name: String },

    #[error("model '{model}' inherits from itself")]
    CyclicHierarchy { model: String },

    #[error("cannot create a consistent ancestry order for '{model}'")]
    InconsistentHierarchy { model: String },

    #[error("global permissions registry is already initialized")]
    AlreadyInitialized,

    #[error("invalid permissions configuration: {0}")]
    Config(String),
}

impl From<figment::Error> for PermissionsError {
    fn from(e: figment::Error) -> Self {
        Self::Config(e.to_string())
    }
}
