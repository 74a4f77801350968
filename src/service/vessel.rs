use crate::database::user::UserRepository;
use crate::database::vessel::VesselRepository;
use crate::error::app_error::AppError;
use crate::models::user::Principal;
use crate::models::vessel::{GetVesselResponse, SaveVesselRequest, Vessel, VesselName};
use crate::service::require_admin_unless;
use tracing::info;
use validator::Validate;

pub struct VesselService<'a, R> {
    repo: &'a R,
}

impl<'a, R> VesselService<'a, R>
where
    R: UserRepository + VesselRepository,
{
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// The active vessel's full record, or the first-run marker when there is none.
    ///
    /// With several active vessels the earliest-created one wins.
    pub async fn active_singleton(&self) -> Result<GetVesselResponse, AppError> {
        Ok(GetVesselResponse::from(self.repo.get_active_vessel().await?))
    }

    pub async fn list_active_names(&self) -> Result<Vec<VesselName>, AppError> {
        self.repo.list_active_vessel_names().await
    }

    /// Open during first run (no active vessel or no active user), admin-only afterwards.
    pub async fn create(&self, caller: Option<&Principal>, request: &SaveVesselRequest) -> Result<Vessel, AppError> {
        request.validate()?;

        let first_run = self.repo.count_active_vessels().await? == 0 || self.repo.count_active_users().await? == 0;
        require_admin_unless(first_run, caller)?;

        let vessel = self.repo.create_vessel(request).await?;
        info!(vessel_id = %vessel.uuid, "vessel saved");
        Ok(vessel)
    }
}
