use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `GET /test-db`, kept in the shape the status panel reads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DbStatusResponse {
    pub status: String,
    pub server_time: String,
}
