//! Definition-time permission declarations.
//!
//! `#[derive(Model)]` turns every `#[permissions(...)]` attribute into a
//! [`Declaration`] and submits them, in source order, as one
//! [`DeclaredPermissions`] record per model. [`install_declared`] replays the
//! records into a registry.

use tracing::info;

use crate::error::PermissionsResult;
use crate::model::{DescriptorFn, Model, ModelDescriptor};
use crate::registry::PermissionsRegistry;
use crate::role::Role;

/// One `#[permissions(...)]` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Declaration {
    /// `role = "..."`
    Grant {
        role: Role,
        attributes: &'static [&'static str],
        overwrite: bool,
    },
    /// `all_roles`, optionally with `exclude(...)`
    AllRoles {
        exclude: &'static [Role],
        attributes: &'static [&'static str],
        overwrite: bool,
    },
}

impl Declaration {
    /// Register this declaration for `model`.
    ///
    /// # Errors
    ///
    /// Same as [`PermissionsRegistry::register`].
    pub fn apply(
        &self,
        registry: &PermissionsRegistry,
        model: &'static ModelDescriptor,
    ) -> PermissionsResult<()> {
        match *self {
            Self::Grant {
                role,
                attributes,
                overwrite,
            } => registry.register(model, role, attributes.iter().copied(), overwrite),
            Self::AllRoles {
                exclude,
                attributes,
                overwrite,
            } => {
                registry.register_for_roles(model, attributes.iter().copied(), exclude, overwrite)
            }
        }
    }
}

/// Ordered declarations of one model, collected at link time.
#[derive(Debug)]
pub struct DeclaredPermissions {
    model: DescriptorFn,
    declarations: &'static [Declaration],
}

inventory::collect!(DeclaredPermissions);

impl DeclaredPermissions {
    #[must_use]
    pub const fn new(model: DescriptorFn, declarations: &'static [Declaration]) -> Self {
        Self {
            model,
            declarations,
        }
    }

    #[must_use]
    pub fn model(&self) -> &'static ModelDescriptor {
        (self.model)()
    }

    #[must_use]
    pub fn declarations(&self) -> &'static [Declaration] {
        self.declarations
    }

    /// Register the model and apply its declarations in source order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing declaration.
    pub fn apply(&self, registry: &PermissionsRegistry) -> PermissionsResult<()> {
        let model = self.model();
        registry.register_model(model)?;
        for declaration in self.declarations {
            declaration.apply(registry, model)?;
        }
        Ok(())
    }
}

/// Every declared model, sorted by name.
#[must_use]
pub fn declared_models() -> Vec<&'static DeclaredPermissions> {
    let mut declared: Vec<&'static DeclaredPermissions> =
        inventory::iter::<DeclaredPermissions>.into_iter().collect();
    declared.sort_by_key(|d| d.model().name());
    declared
}

/// Apply every declared model's permissions to `registry`.
///
/// Returns the number of models installed.
///
/// # Errors
///
/// Stops at the first failing declaration; models installed before it stay
/// registered.
pub fn install_declared(registry: &PermissionsRegistry) -> PermissionsResult<usize> {
    let declared = declared_models();
    for record in &declared {
        record.apply(registry)?;
    }
    info!(models = declared.len(), "installed declared permissions");
    Ok(declared.len())
}

/// [`PermissionsRegistry::grant`] on the global registry.
///
/// # Errors
///
/// Same as [`PermissionsRegistry::register`].
pub fn grant<M, I>(
    role: Role,
    attributes: I,
    overwrite: bool,
) -> PermissionsResult<&'static ModelDescriptor>
where
    M: Model,
    I: IntoIterator,
    I::Item: Into<String>,
{
    PermissionsRegistry::global().grant::<M, I>(role, attributes, overwrite)
}

/// [`PermissionsRegistry::grant_all_roles`] on the global registry.
///
/// # Errors
///
/// Same as [`PermissionsRegistry::register`].
pub fn grant_all_roles<M, I>(
    attributes: I,
    exclude_roles: &[Role],
    overwrite: bool,
) -> PermissionsResult<&'static ModelDescriptor>
where
    M: Model,
    I: IntoIterator,
    I::Item: Into<String>,
{
    PermissionsRegistry::global().grant_all_roles::<M, I>(attributes, exclude_roles, overwrite)
}
