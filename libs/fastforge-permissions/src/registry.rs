//! Per-model, per-role attribute permissions with inheritance-aware merging.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::PermissionsConfig;
use crate::declaration::install_declared;
use crate::error::{PermissionsError, PermissionsResult};
use crate::model::{Model, ModelDescriptor};
use crate::role::Role;

static GLOBAL: OnceLock<PermissionsRegistry> = OnceLock::new();

/// Attributes granted to one role on one model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    attributes: BTreeSet<String>,
    overwrite: bool,
}

impl PermissionEntry {
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &BTreeSet<String> {
        &self.attributes
    }

    /// When set, queries on this model ignore what ancestors grant the role.
    #[inline]
    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

#[derive(Debug)]
struct ModelPermissions {
    descriptor: &'static ModelDescriptor,
    roles: HashMap<Role, PermissionEntry>,
}

impl ModelPermissions {
    fn new(descriptor: &'static ModelDescriptor) -> Self {
        Self {
            descriptor,
            roles: HashMap::new(),
        }
    }
}

/// Central authority mapping (model, role) to the attributes the role may access.
///
/// Registration and queries may interleave freely: all state sits behind a
/// single read-write lock. Unknown models and roles resolve to an empty set,
/// so access checks fail closed.
///
/// # Examples
///
/// ```
/// use fastforge_permissions::{ModelDescriptor, PermissionsRegistry, Role};
///
/// static BASE: ModelDescriptor = ModelDescriptor::new("Base", &["id", "name"], &[]);
/// fn base() -> &'static ModelDescriptor { &BASE }
/// static CHILD: ModelDescriptor = ModelDescriptor::new("Child", &["extra"], &[base]);
///
/// let registry = PermissionsRegistry::new();
/// registry.register(&BASE, Role::Admin, ["id", "name"], false).unwrap();
/// registry.register(&CHILD, Role::Admin, ["extra"], false).unwrap();
///
/// assert!(registry.has_access(&CHILD, Role::Admin, "name"));
/// assert!(!registry.has_access(&CHILD, Role::Public, "name"));
/// ```
#[derive(Debug, Default)]
pub struct PermissionsRegistry {
    config: PermissionsConfig,
    models: RwLock<HashMap<String, ModelPermissions>>,
}

impl PermissionsRegistry {
    /// Create an empty, permissive registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: PermissionsConfig) -> Self {
        Self {
            config,
            models: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry.
    ///
    /// Created on first use with the default configuration, with every
    /// permission declared through `#[derive(Model)]` already installed.
    /// Use [`init_global`] to pick the configuration explicitly.
    #[must_use]
    pub fn global() -> &'static PermissionsRegistry {
        GLOBAL.get_or_init(|| {
            let registry = PermissionsRegistry::new();
            if let Err(e) = install_declared(&registry) {
                error!(error = %e, "failed to install declared permissions");
            }
            registry
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PermissionsConfig {
        &self.config
    }

    /// Make a model known to the registry without granting anything.
    ///
    /// # Errors
    ///
    /// In strict mode, [`PermissionsError::DuplicateModelName`] if another
    /// descriptor already uses the same name.
    pub fn register_model(&self, model: &'static ModelDescriptor) -> PermissionsResult<()> {
        let mut models = self.models.write();
        self.model_slot(&mut models, model)?;
        Ok(())
    }

    /// Create or update the entry for `(model, role)`.
    ///
    /// Without `overwrite`, attributes are unioned into any existing entry and
    /// its `overwrite` flag is left as it was. With `overwrite`, the entry is
    /// replaced by exactly `attributes` and flagged.
    ///
    /// # Errors
    ///
    /// Never in the default permissive mode. In strict mode:
    /// - [`PermissionsError::EmptyAttribute`] for a blank attribute name
    /// - [`PermissionsError::UnknownField`] for an attribute not declared on
    ///   the model or its ancestors
    /// - [`PermissionsError::DuplicateModelName`] for a name clash
    /// - ancestry errors for a broken hierarchy
    ///
    /// A failed registration leaves the registry untouched.
    pub fn register<I>(
        &self,
        model: &'static ModelDescriptor,
        role: Role,
        attributes: I,
        overwrite: bool,
    ) -> PermissionsResult<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let attributes: BTreeSet<String> = attributes.into_iter().map(Into::into).collect();
        if self.config.strict {
            validate_attributes(model, role, &attributes)?;
        }

        debug!(
            model = model.name(),
            %role,
            count = attributes.len(),
            overwrite,
            "registering permissions"
        );

        let mut models = self.models.write();
        let slot = self.model_slot(&mut models, model)?;

        if !overwrite && let Some(existing) = slot.roles.get_mut(&role) {
            existing.attributes.extend(attributes);
            return Ok(());
        }
        slot.roles.insert(
            role,
            PermissionEntry {
                attributes,
                overwrite,
            },
        );
        Ok(())
    }

    /// Register `attributes` for `role` on `M`; returns `M`'s descriptor unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`PermissionsRegistry::register`].
    pub fn grant<M, I>(
        &self,
        role: Role,
        attributes: I,
        overwrite: bool,
    ) -> PermissionsResult<&'static ModelDescriptor>
    where
        M: Model,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let model = M::descriptor();
        self.register(model, role, attributes, overwrite)?;
        Ok(model)
    }

    /// Register `attributes` on `M` for every role not listed in `exclude_roles`.
    ///
    /// # Errors
    ///
    /// Same as [`PermissionsRegistry::register`]; stops at the first failure.
    pub fn grant_all_roles<M, I>(
        &self,
        attributes: I,
        exclude_roles: &[Role],
        overwrite: bool,
    ) -> PermissionsResult<&'static ModelDescriptor>
    where
        M: Model,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let model = M::descriptor();
        self.register_for_roles(model, attributes, exclude_roles, overwrite)?;
        Ok(model)
    }

    pub(crate) fn register_for_roles<I>(
        &self,
        model: &'static ModelDescriptor,
        attributes: I,
        exclude_roles: &[Role],
        overwrite: bool,
    ) -> PermissionsResult<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();
        for role in Role::ALL {
            if exclude_roles.contains(&role) {
                continue;
            }
            self.register(model, role, attributes.iter().cloned(), overwrite)?;
        }
        Ok(())
    }

    /// Effective attributes `role` may access on `model`.
    ///
    /// If the model's own entry for `role` is flagged `overwrite`, that entry
    /// is the answer. Otherwise entries along the whole ancestry are unioned;
    /// an ancestor's own flag does not hide its bases.
    ///
    /// A hierarchy that cannot be linearized resolves to the empty set.
    #[must_use]
    pub fn get_permissions(&self, model: &'static ModelDescriptor, role: Role) -> BTreeSet<String> {
        self.try_get_permissions(model, role).unwrap_or_else(|e| {
            warn!(model = model.name(), %role, error = %e, "denying access: unresolvable ancestry");
            BTreeSet::new()
        })
    }

    /// Like [`PermissionsRegistry::get_permissions`], but reports ancestry errors.
    ///
    /// # Errors
    ///
    /// [`PermissionsError::CyclicHierarchy`] or
    /// [`PermissionsError::InconsistentHierarchy`].
    pub fn try_get_permissions(
        &self,
        model: &'static ModelDescriptor,
        role: Role,
    ) -> PermissionsResult<BTreeSet<String>> {
        let ancestry = model.ancestry();
        let models = self.models.read();

        if let Some(own) = entry_in(&models, model, role)
            && own.overwrite
        {
            return Ok(own.attributes.clone());
        }

        let mut effective = BTreeSet::new();
        for ancestor in ancestry?.iter().rev() {
            if let Some(entry) = entry_in(&models, ancestor, role) {
                effective.extend(entry.attributes.iter().cloned());
            }
        }
        Ok(effective)
    }

    /// Returns `true` if `attribute` is among the effective permissions.
    #[must_use]
    pub fn has_access(&self, model: &'static ModelDescriptor, role: Role, attribute: &str) -> bool {
        self.get_permissions(model, role).contains(attribute)
    }

    /// The raw entry stored for `(model, role)`, ignoring ancestors.
    #[must_use]
    pub fn entry(&self, model: &ModelDescriptor, role: Role) -> Option<PermissionEntry> {
        entry_in(&self.models.read(), model, role).cloned()
    }

    /// Effective permissions of `model` for every role.
    #[must_use]
    pub fn effective_matrix(
        &self,
        model: &'static ModelDescriptor,
    ) -> BTreeMap<Role, BTreeSet<String>> {
        Role::ALL
            .into_iter()
            .map(|role| (role, self.get_permissions(model, role)))
            .collect()
    }

    /// Look up a known model by name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&'static ModelDescriptor> {
        self.models.read().get(name).map(|perms| perms.descriptor)
    }

    /// Names of every known model, sorted.
    #[must_use]
    pub fn registered_models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Forget every model and entry.
    pub fn clear(&self) {
        self.models.write().clear();
    }

    fn model_slot<'a>(
        &self,
        models: &'a mut HashMap<String, ModelPermissions>,
        model: &'static ModelDescriptor,
    ) -> PermissionsResult<&'a mut ModelPermissions> {
        let slot = models
            .entry(model.name().to_owned())
            .or_insert_with(|| ModelPermissions::new(model));

        if !slot.descriptor.is_same(model) {
            if self.config.strict {
                return Err(PermissionsError::DuplicateModelName {
                    name: model.name().to_owned(),
                });
            }
            warn!(
                model = model.name(),
                "distinct model types share a name; their permissions are merged"
            );
        }
        Ok(slot)
    }
}

fn entry_in<'a>(
    models: &'a HashMap<String, ModelPermissions>,
    model: &ModelDescriptor,
    role: Role,
) -> Option<&'a PermissionEntry> {
    models
        .get(model.name())
        .and_then(|perms| perms.roles.get(&role))
}

fn validate_attributes(
    model: &'static ModelDescriptor,
    role: Role,
    attributes: &BTreeSet<String>,
) -> PermissionsResult<()> {
    let known = model.all_fields()?;
    for attribute in attributes {
        if attribute.trim().is_empty() {
            return Err(PermissionsError::EmptyAttribute {
                model: model.name().to_owned(),
                role,
            });
        }
        if !known.contains(attribute.as_str()) {
            return Err(PermissionsError::UnknownField {
                model: model.name().to_owned(),
                field: attribute.clone(),
            });
        }
    }
    Ok(())
}

/// Install the process-wide registry with an explicit configuration.
///
/// Every permission declared through `#[derive(Model)]` is installed before
/// the registry becomes visible.
///
/// # Errors
///
/// - [`PermissionsError::AlreadyInitialized`] if the global registry exists,
///   including when [`PermissionsRegistry::global`] was called earlier
/// - any error raised while installing declarations under a strict config
pub fn init_global(config: PermissionsConfig) -> PermissionsResult<&'static PermissionsRegistry> {
    if GLOBAL.get().is_some() {
        return Err(PermissionsError::AlreadyInitialized);
    }
    let registry = PermissionsRegistry::with_config(config);
    install_declared(&registry)?;

    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if installed {
        Ok(global)
    } else {
        Err(PermissionsError::AlreadyInitialized)
    }
}
