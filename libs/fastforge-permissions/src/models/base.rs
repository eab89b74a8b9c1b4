use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Model;

/// Base entity every framework model extends.
///
/// Carries identity, timestamps, soft-delete state and ownership. The
/// internal id never leaves the service except for super administrators;
/// `public_id` is what clients see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Model)]
#[permissions(
    role = "superadmin",
    fields(
        "internal_id",
        "public_id",
        "created_at",
        "updated_at",
        "is_active",
        "created_by",
        "owner_id"
    )
)]
#[permissions(
    role = "admin",
    fields("public_id", "created_at", "updated_at", "is_active", "created_by", "owner_id")
)]
#[permissions(role = "user", fields("public_id", "created_at", "updated_at"))]
#[permissions(role = "public", fields("public_id", "created_at", "updated_at"))]
pub struct ModelData {
    pub internal_id: Uuid,
    pub public_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `false` once soft-deleted.
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl Default for ModelData {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelData {
    /// Fresh, active record with random ids and no owner.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            internal_id: Uuid::new_v4(),
            public_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            is_active: true,
            created_by: None,
            owner_id: None,
        }
    }

    pub fn update_timestamp(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Mark the record inactive without removing it.
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.update_timestamp();
    }

    pub fn restore(&mut self) {
        self.is_active = true;
        self.update_timestamp();
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }

    #[must_use]
    pub fn is_created_by(&self, user_id: Uuid) -> bool {
        self.created_by == Some(user_id)
    }

    pub fn set_owner(&mut self, user_id: Uuid) {
        self.owner_id = Some(user_id);
        self.update_timestamp();
    }

    /// Hand the record over to another user.
    ///
    /// Callers are responsible for checking that the transfer is allowed.
    pub fn transfer_ownership(&mut self, new_owner_id: Uuid) {
        self.set_owner(new_owner_id);
    }
}
