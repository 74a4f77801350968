pub mod auth;
pub mod init_state;
pub mod user;
pub mod vessel;

use crate::error::app_error::AppError;
use crate::models::user::Principal;

/// Lets anyone through while `open` holds, otherwise only administrators.
pub(crate) fn require_admin_unless(open: bool, caller: Option<&Principal>) -> Result<(), AppError> {
    if open {
        return Ok(());
    }
    match caller {
        Some(principal) if principal.is_admin => Ok(()),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::Unauthorized),
    }
}
