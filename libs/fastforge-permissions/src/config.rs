//! Configuration for the permissions registry.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::PermissionsResult;

/// Prefix of environment variables overriding file configuration,
/// e.g. `FASTFORGE_PERMISSIONS_STRICT=true`.
pub const ENV_PREFIX: &str = "FASTFORGE_PERMISSIONS_";

/// Registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionsConfig {
    /// Validate registrations: attribute names must be non-blank and declared
    /// on the model or one of its ancestors, and model names must be unique.
    pub strict: bool,
}

impl PermissionsConfig {
    /// Layered configuration sources: defaults, then the optional YAML file,
    /// then the environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration from `path` (if any) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PermissionsError::Config`] if a source cannot be parsed
    /// or contains unknown keys.
    pub fn load(path: Option<&Path>) -> PermissionsResult<Self> {
        Ok(Self::figment(path).extract()?)
    }
}
