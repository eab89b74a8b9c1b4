use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use fastforge_permissions::{ModelDescriptor, PermissionsRegistry, Role};
use serde::Serialize;

/// Effective permissions of one model.
#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub model: &'static str,
    pub bases: Vec<&'static str>,
    pub permissions: BTreeMap<Role, BTreeSet<String>>,
}

impl ModelReport {
    pub fn build(
        registry: &PermissionsRegistry,
        model: &'static ModelDescriptor,
        roles: &[Role],
    ) -> Self {
        Self {
            model: model.name(),
            bases: model.bases().map(ModelDescriptor::name).collect(),
            permissions: roles
                .iter()
                .map(|&role| (role, registry.get_permissions(model, role)))
                .collect(),
        }
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bases.is_empty() {
            writeln!(f, "{}", self.model)?;
        } else {
            writeln!(f, "{} ({})", self.model, self.bases.join(", "))?;
        }
        for (role, attributes) in &self.permissions {
            let listed = if attributes.is_empty() {
                "-".to_owned()
            } else {
                attributes
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(f, "  {role:<10} {listed}")?;
        }
        Ok(())
    }
}

pub fn render_text(reports: &[ModelReport]) -> String {
    reports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn account() -> &'static ModelDescriptor {
        &ACCOUNT
    }

    static ACCOUNT: ModelDescriptor = ModelDescriptor::new("Account", &["id", "email"], &[]);
    static ADMIN_ACCOUNT: ModelDescriptor =
        ModelDescriptor::new("AdminAccount", &["scopes"], &[account]);

    fn registry() -> PermissionsRegistry {
        let registry = PermissionsRegistry::new();
        registry
            .register(&ACCOUNT, Role::Admin, ["id", "email"], false)
            .unwrap();
        registry
            .register(&ADMIN_ACCOUNT, Role::Admin, ["scopes"], false)
            .unwrap();
        registry
    }

    #[test]
    fn text_lists_bases_and_roles() {
        let registry = registry();
        let report = ModelReport::build(&registry, &ADMIN_ACCOUNT, &[Role::Public, Role::Admin]);
        let text = render_text(&[report]);

        assert_eq!(
            text,
            "AdminAccount (Account)\n  public     -\n  admin      email, id, scopes\n"
        );
    }

    #[test]
    fn json_uses_role_names_as_keys() {
        let registry = registry();
        let report = ModelReport::build(&registry, &ACCOUNT, &[Role::Admin]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["model"], "Account");
        assert_eq!(json["bases"], serde_json::json!([]));
        assert_eq!(json["permissions"]["admin"], serde_json::json!(["email", "id"]));
    }
}
