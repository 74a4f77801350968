use crate::auth::token::{Claims, TokenService};
use crate::database::user::{UserRepository, dummy_verify, verify_password};
use crate::error::app_error::AppError;
use crate::models::user::Principal;
use tracing::{info, warn};

pub struct AuthService<'a, R> {
    repo: &'a R,
    tokens: &'a TokenService,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repo: &'a R, tokens: &'a TokenService) -> Self {
        Self { repo, tokens }
    }

    /// Exchanges a handle and password for a bearer token.
    ///
    /// Unknown handles and wrong passwords both end in `InvalidCredentials`, and an
    /// unknown handle still pays for one Argon2 verification.
    pub async fn login(&self, handle: &str, password: &str) -> Result<String, AppError> {
        let Some(user) = self.repo.find_active_by_handle(handle).await? else {
            dummy_verify(password);
            warn!("login rejected");
            return Err(AppError::InvalidCredentials);
        };

        if let Err(e) = verify_password(&user, password) {
            if matches!(e, AppError::InvalidCredentials) {
                warn!(user_id = %user.uuid, "login rejected");
            }
            return Err(e);
        }

        let token = self.tokens.issue(user.uuid, &user.handle, user.is_admin)?;
        info!(user_id = %user.uuid, "login succeeded");
        Ok(token)
    }

    /// Signature and expiry first, then liveness of the principal.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let claims = self.tokens.verify(token)?;
        self.check_liveness(&claims).await
    }

    /// A token stays cryptographically valid after its user is deactivated; this is
    /// the step that notices.
    pub async fn check_liveness(&self, claims: &Claims) -> Result<Principal, AppError> {
        match self.repo.find_active_by_id(&claims.sub).await? {
            Some(user) => Ok(Principal::from(&user)),
            None => {
                warn!(user_id = %claims.sub, "token presented for inactive or unknown user");
                Err(AppError::Unauthorized)
            }
        }
    }
}
