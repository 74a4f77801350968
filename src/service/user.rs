use crate::database::user::UserRepository;
use crate::database::vessel::VesselRepository;
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, Principal, SaveUserRequest, User};
use crate::service::require_admin_unless;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Registers a user.
///
/// Open while no active user exists, admin-only afterwards. The very first user ever
/// stored is always an administrator. Later users keep the requested flag, including
/// when registration reopens after every user was deactivated; the caller then asks
/// for `user_is_admin` to restore an administrator. Without an explicit vessel the user
/// is assigned to the active vessel, if there is one.
pub async fn register<R>(repo: &R, caller: Option<&Principal>, request: &SaveUserRequest) -> Result<User, AppError>
where
    R: UserRepository + VesselRepository,
{
    request.validate()?;

    let first_run = repo.count_active_users().await? == 0;
    require_admin_unless(first_run, caller)?;

    if repo.find_active_by_handle(&request.user_handle).await?.is_some() {
        return Err(AppError::UserAlreadyExists(request.user_handle.clone()));
    }

    let is_admin = request.user_is_admin || repo.count_users().await? == 0;
    let vessel_uuid = assigned_vessel(repo, request.user_vessel_uuid).await?;

    let user = repo
        .create_user(&NewUser {
            handle: request.user_handle.clone(),
            name: request.user_name.clone(),
            password: request.user_password.clone(),
            is_admin,
            vessel_uuid,
        })
        .await?;

    info!(user_id = %user.uuid, is_admin = user.is_admin, vessel_id = ?user.vessel_uuid, "user registered");
    Ok(user)
}

async fn assigned_vessel<R: VesselRepository>(repo: &R, requested: Option<Uuid>) -> Result<Option<Uuid>, AppError> {
    match requested {
        Some(id) => match repo.get_active_vessel_by_id(&id).await? {
            Some(vessel) => Ok(Some(vessel.uuid)),
            None => Err(AppError::BadRequest(format!("Vessel {id} is not an active vessel"))),
        },
        None => Ok(repo.get_active_vessel().await?.map(|vessel| vessel.uuid)),
    }
}
