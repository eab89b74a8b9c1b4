#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The process-wide registry. Kept in its own test binary so that nothing
//! else touches the global instance first.

use fastforge_permissions::init_global;
use fastforge_permissions::prelude::*;

struct Invoice;

static INVOICE: ModelDescriptor = ModelDescriptor::new("Invoice", &["amount", "number"], &[]);

impl Model for Invoice {
    fn descriptor() -> &'static ModelDescriptor {
        &INVOICE
    }
}

#[test]
fn global_registry_lifecycle() {
    let strict = PermissionsConfig { strict: true };
    let global = init_global(strict.clone()).unwrap();
    assert!(global.config().strict);
    assert!(std::ptr::eq(global, PermissionsRegistry::global()));

    // Declared permissions are installed before the registry is visible.
    assert!(global.has_access(ModelData::descriptor(), Role::Public, "public_id"));

    assert_eq!(
        init_global(strict).unwrap_err(),
        PermissionsError::AlreadyInitialized
    );

    let descriptor = grant::<Invoice, _>(Role::Admin, ["amount", "number"], false).unwrap();
    assert!(descriptor.is_same(&INVOICE));
    grant_all_roles::<Invoice, _>(["number"], &[Role::Public], false).unwrap();

    let registry = PermissionsRegistry::global();
    assert!(registry.has_access(&INVOICE, Role::Admin, "amount"));
    assert!(registry.has_access(&INVOICE, Role::Users, "number"));
    assert!(!registry.has_access(&INVOICE, Role::Public, "number"));

    assert_eq!(
        grant::<Invoice, _>(Role::User, ["total"], false).unwrap_err(),
        PermissionsError::UnknownField {
            model: "Invoice".to_owned(),
            field: "total".to_owned()
        }
    );
}
