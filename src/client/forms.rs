use crate::client::error::ClientError;
use crate::models::user::SaveUserRequest;
use crate::models::vessel::SaveVesselRequest;
use uuid::Uuid;

/// First-user (and later admin-driven) registration form.
#[derive(Clone, Default)]
pub struct UserSetupForm {
    pub handle: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
    pub is_admin: bool,
    pub vessel_uuid: Option<Uuid>,
}

impl std::fmt::Debug for UserSetupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSetupForm")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("is_admin", &self.is_admin)
            .field("vessel_uuid", &self.vessel_uuid)
            .finish_non_exhaustive()
    }
}

impl UserSetupForm {
    /// Checked locally; nothing is sent when the confirmation does not match.
    pub fn into_request(self) -> Result<SaveUserRequest, ClientError> {
        if self.password != self.password_confirm {
            return Err(ClientError::PasswordMismatch);
        }
        if self.handle.trim().is_empty() {
            return Err(ClientError::MissingField("userHandle"));
        }
        if self.name.trim().is_empty() {
            return Err(ClientError::MissingField("userName"));
        }
        if self.password.is_empty() {
            return Err(ClientError::MissingField("userPassword"));
        }

        Ok(SaveUserRequest {
            user_handle: self.handle.trim().to_string(),
            user_name: self.name.trim().to_string(),
            user_password: self.password,
            user_is_admin: self.is_admin,
            user_vessel_uuid: self.vessel_uuid,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct VesselSetupForm {
    pub name: String,
    pub flag_nation: String,
    pub port_of_registry: String,
    pub build_details: String,
    pub official_number: String,
    pub hull_identification_number: String,
    pub keel_offset: Option<f64>,
    pub waterline_offset: Option<f64>,
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

impl VesselSetupForm {
    pub fn into_request(self) -> Result<SaveVesselRequest, ClientError> {
        let vessel_name = optional(self.name).ok_or(ClientError::MissingField("vesselName"))?;

        Ok(SaveVesselRequest {
            vessel_name,
            vessel_flag_nation: optional(self.flag_nation),
            vessel_port_of_registry: optional(self.port_of_registry),
            vessel_build_details: optional(self.build_details),
            vessel_official_number: optional(self.official_number),
            vessel_hull_identification_number: optional(self.hull_identification_number),
            vessel_keel_offset: self.keel_offset,
            vessel_waterline_offset: self.waterline_offset,
        })
    }
}
