#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # fastforge-permissions-macros
//!
//! Procedural macros for the `fastforge-permissions` registry.
//!
//! ## `#[derive(Model)]`
//!
//! Implements `fastforge_permissions::Model` for a struct and declares the
//! attributes each role may access. Declarations are collected at link time
//! and installed into the registry by `install_declared` (the global registry
//! does it on first use).
//!
//! ### Example
//!
//! ```ignore
//! use fastforge_permissions::{Model, ModelData};
//!
//! #[derive(Model)]
//! #[model(name = "Article", extends(ModelData))]
//! #[permissions(role = "admin", fields("title", "body"))]
//! #[permissions(role = "public", fields("title"), overwrite)]
//! #[permissions(all_roles, exclude("public"), fields("body"))]
//! pub struct Article {
//!     pub title: String,
//!     pub body: String,
//! }
//! ```
//!
//! ### Attributes
//!
//! - `#[model(name = "...", extends(Base, ...))]` (optional): registry name
//!   (defaults to the struct name) and base models in precedence order.
//! - `#[permissions(...)]` (repeatable, applied top to bottom):
//!   - `role = "<role>"` **or** `all_roles`, optionally with `exclude("<role>", ...)`
//!   - `fields("a", "b", ...)` (required, may be empty)
//!   - `overwrite`: replace instead of merge, and hide inherited grants for this role

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod model;

/// Derive macro implementing `Model` and declaring role permissions.
///
/// Role names are `public`, `users`, `user`, `admin` and `superadmin`.
/// Only structs with named fields (or unit structs) without generic
/// parameters are supported; the descriptor lists the Rust field names.
#[proc_macro_derive(Model, attributes(model, permissions))]
#[proc_macro_error]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand_derive_model(input).into()
}
