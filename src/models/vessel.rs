use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Vessel {
    pub uuid: Uuid,
    pub name: String,
    pub flag_nation: Option<String>,
    pub port_of_registry: Option<String>,
    pub build_details: Option<String>,
    pub official_number: Option<String>,
    pub hull_id_number: Option<String>,
    pub keel_offset: Option<f64>,
    pub waterline_offset: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveVesselRequest {
    #[validate(length(min = 1, max = 128))]
    pub vessel_name: String,
    #[serde(default)]
    pub vessel_flag_nation: Option<String>,
    #[serde(default)]
    pub vessel_port_of_registry: Option<String>,
    #[serde(default)]
    pub vessel_build_details: Option<String>,
    #[serde(default)]
    pub vessel_official_number: Option<String>,
    #[serde(default)]
    pub vessel_hull_identification_number: Option<String>,
    #[serde(default)]
    pub vessel_keel_offset: Option<f64>,
    #[serde(default)]
    pub vessel_waterline_offset: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VesselResponse {
    pub vessel_uuid: Uuid,
    pub vessel_name: String,
    pub vessel_flag_nation: Option<String>,
    pub vessel_port_of_registry: Option<String>,
    pub vessel_build_details: Option<String>,
    pub vessel_official_number: Option<String>,
    pub vessel_hull_identification_number: Option<String>,
    pub vessel_keel_offset: Option<f64>,
    pub vessel_waterline_offset: Option<f64>,
    pub setup_required: bool,
}

impl From<&Vessel> for VesselResponse {
    fn from(vessel: &Vessel) -> Self {
        Self {
            vessel_uuid: vessel.uuid,
            vessel_name: vessel.name.clone(),
            vessel_flag_nation: vessel.flag_nation.clone(),
            vessel_port_of_registry: vessel.port_of_registry.clone(),
            vessel_build_details: vessel.build_details.clone(),
            vessel_official_number: vessel.official_number.clone(),
            vessel_hull_identification_number: vessel.hull_id_number.clone(),
            vessel_keel_offset: vessel.keel_offset,
            vessel_waterline_offset: vessel.waterline_offset,
            setup_required: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequired {
    pub setup_required: bool,
}

/// Body of `GET /get-vessel`: either the active vessel or a first-run marker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum GetVesselResponse {
    Found(VesselResponse),
    SetupRequired(SetupRequired),
}

impl GetVesselResponse {
    pub fn setup_required() -> Self {
        GetVesselResponse::SetupRequired(SetupRequired { setup_required: true })
    }

    pub fn vessel(&self) -> Option<&VesselResponse> {
        match self {
            GetVesselResponse::Found(vessel) => Some(vessel),
            GetVesselResponse::SetupRequired(_) => None,
        }
    }
}

impl From<Option<Vessel>> for GetVesselResponse {
    fn from(vessel: Option<Vessel>) -> Self {
        match vessel {
            Some(vessel) => GetVesselResponse::Found(VesselResponse::from(&vessel)),
            None => GetVesselResponse::setup_required(),
        }
    }
}

/// Entry of the assignment list returned by `GET /vessels/get-active`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow, JsonSchema)]
pub struct VesselName {
    pub uuid: Uuid,
    pub name: String,
}
