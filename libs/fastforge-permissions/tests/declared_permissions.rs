#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

//! Permissions declared through `#[derive(Model)]` and installed from the
//! link-time inventory.

use std::collections::BTreeSet;

use fastforge_permissions::{
    Declaration, Model, ModelData, PermissionsConfig, PermissionsRegistry, Role, UserModel,
    declared_models, install_declared,
};

#[derive(Model)]
#[model(name = "Article", extends(ModelData))]
#[permissions(role = "admin", fields("title", "body", "draft_notes"))]
#[permissions(role = "user", fields("title", "body"))]
#[permissions(role = "public", fields("title"), overwrite)]
#[permissions(all_roles, exclude("public"), fields("tags"))]
struct Article {
    data: ModelData,
    title: String,
    body: String,
    draft_notes: String,
    tags: Vec<String>,
}

#[derive(Model)]
#[permissions(role = "admin", fields("audit_log"))]
struct Audited {
    audit_log: Vec<String>,
}

#[derive(Model)]
#[model(extends(ModelData, Audited))]
#[permissions(role = "superadmin", fields("secret"))]
struct Secured {
    data: ModelData,
    secret: String,
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn installed() -> PermissionsRegistry {
    let registry = PermissionsRegistry::new();
    install_declared(&registry).unwrap();
    registry
}

#[test]
fn every_declared_model_is_collected() {
    let names: Vec<&str> = declared_models()
        .iter()
        .map(|declared| declared.model().name())
        .collect();
    assert_eq!(names, ["Article", "Audited", "ModelData", "Secured", "User"]);
}

#[test]
fn install_registers_every_declared_model() {
    let registry = PermissionsRegistry::new();
    assert_eq!(install_declared(&registry).unwrap(), 5);
    assert_eq!(
        registry.registered_models(),
        ["Article", "Audited", "ModelData", "Secured", "User"]
    );
}

#[test]
fn declarations_are_kept_in_source_order() {
    let article = declared_models()
        .into_iter()
        .find(|declared| declared.model().name() == "Article")
        .unwrap();
    let declarations = article.declarations();

    assert_eq!(declarations.len(), 4);
    assert_eq!(
        declarations[2],
        Declaration::Grant {
            role: Role::Public,
            attributes: &["title"],
            overwrite: true,
        }
    );
    assert_eq!(
        declarations[3],
        Declaration::AllRoles {
            exclude: &[Role::Public],
            attributes: &["tags"],
            overwrite: false,
        }
    );
}

#[test]
fn model_data_permissions() {
    let registry = installed();
    let model = ModelData::descriptor();

    assert_eq!(
        registry.get_permissions(model, Role::Public),
        set(&["created_at", "public_id", "updated_at"])
    );
    assert_eq!(
        registry.get_permissions(model, Role::User),
        set(&["created_at", "public_id", "updated_at"])
    );
    assert!(registry.get_permissions(model, Role::Users).is_empty());
    assert!(registry.has_access(model, Role::Admin, "owner_id"));
    assert!(!registry.has_access(model, Role::Admin, "internal_id"));
    assert!(registry.has_access(model, Role::SuperAdmin, "internal_id"));
}

#[test]
fn derived_model_inherits_model_data_permissions() {
    let registry = installed();
    let article = Article::descriptor();

    assert_eq!(
        registry.get_permissions(article, Role::User),
        set(&["body", "created_at", "public_id", "tags", "title", "updated_at"])
    );
    assert_eq!(
        registry.get_permissions(article, Role::Users),
        set(&["tags"])
    );
    assert!(registry.has_access(article, Role::SuperAdmin, "internal_id"));
    assert!(registry.has_access(article, Role::SuperAdmin, "tags"));
    assert!(!registry.has_access(article, Role::SuperAdmin, "draft_notes"));
}

#[test]
fn overwrite_declaration_hides_inherited_permissions() {
    let registry = installed();
    let article = Article::descriptor();

    assert_eq!(registry.get_permissions(article, Role::Public), set(&["title"]));
    assert!(!registry.has_access(article, Role::Public, "public_id"));
}

#[test]
fn multiple_bases_are_all_consulted() {
    let registry = installed();
    let secured = Secured::descriptor();

    let ancestry: Vec<&str> = secured
        .ancestry()
        .unwrap()
        .iter()
        .map(|m| m.name())
        .collect();
    assert_eq!(ancestry, ["Secured", "ModelData", "Audited"]);

    assert!(registry.has_access(secured, Role::Admin, "audit_log"));
    assert!(registry.has_access(secured, Role::Admin, "public_id"));
    assert!(!registry.has_access(secured, Role::Admin, "secret"));
    assert!(registry.has_access(secured, Role::SuperAdmin, "secret"));
}

#[test]
fn password_hash_is_never_granted() {
    let registry = installed();
    let user = UserModel::descriptor();

    for role in Role::ALL {
        assert!(!registry.has_access(user, role, "password_hash"));
    }
    assert_eq!(
        registry.get_permissions(user, Role::Public),
        set(&["created_at", "public_id", "updated_at", "username"])
    );
}

#[test]
fn declared_permissions_pass_strict_validation() {
    let registry = PermissionsRegistry::with_config(PermissionsConfig { strict: true });
    assert_eq!(install_declared(&registry).unwrap(), 5);
    assert!(registry.has_access(Article::descriptor(), Role::Admin, "draft_notes"));
}
