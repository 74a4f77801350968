use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// What the front end needs to decide between setup, login and the main view.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitStatus {
    pub user_required: bool,
    pub vessel_required: bool,
    pub is_logged_in: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
