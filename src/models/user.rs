use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// A persisted operator account.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub uuid: Uuid,
    pub handle: String,
    pub name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub vessel_uuid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("uuid", &self.uuid)
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("is_admin", &self.is_admin)
            .field("is_active", &self.is_active)
            .field("vessel_uuid", &self.vessel_uuid)
            .finish_non_exhaustive()
    }
}

/// Fields written by the registration path, after admin promotion and vessel
/// assignment have been decided.
#[derive(Clone)]
pub struct NewUser {
    pub handle: String,
    pub name: String,
    pub password: String,
    pub is_admin: bool,
    pub vessel_uuid: Option<Uuid>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("is_admin", &self.is_admin)
            .field("vessel_uuid", &self.vessel_uuid)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize, Clone, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_handle: String,
    #[validate(length(min = 1, max = 128))]
    pub user_name: String,
    #[validate(length(min = 1))]
    pub user_password: String,
    #[serde(default)]
    pub user_is_admin: bool,
    #[serde(default)]
    pub user_vessel_uuid: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Clone, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub user_handle: String,
    #[validate(length(min = 1))]
    pub user_password: String,
}

impl std::fmt::Debug for SaveUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveUserRequest")
            .field("user_handle", &self.user_handle)
            .field("user_name", &self.user_name)
            .field("user_is_admin", &self.user_is_admin)
            .field("user_vessel_uuid", &self.user_vessel_uuid)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest").field("user_handle", &self.user_handle).finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

/// The identity a verified, live bearer token stands for.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub uuid: Uuid,
    pub handle: String,
    pub is_admin: bool,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            uuid: user.uuid,
            handle: user.handle.clone(),
            is_admin: user.is_admin,
        }
    }
}
