//! Glob-importable set of the commonly used items.

pub use crate::{
    Model, ModelData, ModelDescriptor, PermissionsConfig, PermissionsError, PermissionsRegistry,
    PermissionsResult, Role, grant, grant_all_roles,
};
