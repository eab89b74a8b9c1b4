#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Role-based attribute permissions for `FastForge` models.
//!
//! A [`PermissionsRegistry`] maps every (model, [`Role`]) pair to the set of
//! attribute names the role may read. Permissions granted on a base model are
//! inherited by every model extending it, unless the derived model replaces
//! them with an `overwrite` grant.
//!
//! Models declare their permissions next to their definition:
//!
//! ```
//! use fastforge_permissions::{Model, ModelData, PermissionsRegistry, Role, install_declared};
//!
//! #[derive(Model)]
//! #[model(name = "Article", extends(ModelData))]
//! #[permissions(role = "admin", fields("title", "body"))]
//! #[permissions(role = "public", fields("title"))]
//! pub struct Article {
//!     pub data: ModelData,
//!     pub title: String,
//!     pub body: String,
//! }
//!
//! let registry = PermissionsRegistry::new();
//! install_declared(&registry).unwrap();
//!
//! let article = Article::descriptor();
//! assert!(registry.has_access(article, Role::Public, "title"));
//! assert!(registry.has_access(article, Role::Public, "public_id"));
//! assert!(!registry.has_access(article, Role::Public, "body"));
//! ```

extern crate self as fastforge_permissions;

pub mod config;
pub mod declaration;
pub mod error;
pub mod model;
pub mod models;
pub mod prelude;
pub mod registry;
pub mod role;

#[doc(hidden)]
pub use inventory;

pub use fastforge_permissions_macros::Model;

pub use config::PermissionsConfig;
pub use declaration::{
    Declaration, DeclaredPermissions, declared_models, grant, grant_all_roles, install_declared,
};
pub use error::{PermissionsError, PermissionsResult};
pub use model::{DescriptorFn, Model, ModelDescriptor};
pub use models::{ModelData, UserModel};
pub use registry::{PermissionEntry, PermissionsRegistry, init_global};
pub use role::Role;
