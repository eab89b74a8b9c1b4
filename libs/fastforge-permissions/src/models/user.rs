use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ModelData;
use crate::{Model, Role};

/// Account record. `password_hash` is granted to no role.
///
/// The permissions below are a framework default; applications with a
/// different account policy declare their own user model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Model)]
#[model(name = "User", extends(ModelData))]
#[permissions(
    role = "superadmin",
    fields("username", "email", "role", "last_login", "is_verified")
)]
#[permissions(
    role = "admin",
    fields("username", "email", "role", "last_login", "is_verified")
)]
#[permissions(role = "user", fields("username", "email", "role", "is_verified"))]
#[permissions(role = "users", fields("username"))]
#[permissions(role = "public", fields("username"))]
pub struct UserModel {
    #[serde(flatten)]
    pub data: ModelData,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
    pub is_verified: bool,
}

impl UserModel {
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            data: ModelData::new(),
            username: username.into(),
            email: email.into(),
            password_hash: String::new(),
            role: Role::User,
            last_login: None,
            is_verified: false,
        }
    }

    pub fn record_login(&mut self) {
        self.last_login = Some(Utc::now());
        self.data.update_timestamp();
    }

    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.data.update_timestamp();
    }
}
