pub mod auth;

pub use auth::optional_auth;
pub use auth::require_auth;
pub use auth::AuthenticatedUser;
pub use auth::MaybeUser;

use crate::error::{AppError, Result};
use crate::models::user;

/// Guard for endpoints reserved to association staff
pub fn ensure_staff(user: &user::Model) -> Result<()> {
    if !user.is_staff {
        return Err(AppError::Forbidden(
            "Staff privileges required".to_string(),
        ));
    }
    Ok(())
}

/// Unwrap the optional-auth extractor, turning anonymous callers into 401s.
pub fn current_user(MaybeUser(user): MaybeUser) -> Result<user::Model> {
    user.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}
