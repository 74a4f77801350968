use crate::auth::token::TokenService;
use crate::database::user::UserRepository;
use crate::database::vessel::VesselRepository;
use crate::error::app_error::AppError;
use crate::models::init::InitStatus;
use crate::service::auth::AuthService;

/// Resolves whether first-run setup is pending and whether the caller is logged in.
///
/// The two counts and the token check are independent reads, not one snapshot.
pub async fn resolve<R>(repo: &R, tokens: &TokenService, presented_token: Option<&str>) -> Result<InitStatus, AppError>
where
    R: UserRepository + VesselRepository,
{
    let user_required = repo.count_active_users().await? == 0;
    let vessel_required = repo.count_active_vessels().await? == 0;

    let is_logged_in = match presented_token {
        Some(token) if !user_required => match AuthService::new(repo, tokens).authenticate(token).await {
            Ok(_) => true,
            Err(AppError::Unauthorized) => false,
            Err(e) => return Err(e),
        },
        _ => false,
    };

    Ok(InitStatus {
        user_required,
        vessel_required,
        is_logged_in,
    })
}
