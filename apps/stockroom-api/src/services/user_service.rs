//! Profile of the authenticated user.

use std::sync::Arc;

use stockroom_core::validation::validate_profile;
use stockroom_core::{CoreError, UpdateProfileRequest, User};
use tracing::info;

use crate::auth::hash_password;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// User profile service.
#[derive(Debug, Clone)]
pub struct UserService {
    state: Arc<AppState>,
}

impl UserService {
    pub fn new(state: Arc<AppState>) -> Self {
        UserService { state }
    }

    /// Returns the user's profile.
    pub async fn profile(&self, user_id: i64) -> ApiResult<User> {
        self.state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(user_id).into())
    }

    /// Replaces the user's profile, re-hashing the new password.
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: &UpdateProfileRequest,
    ) -> ApiResult<User> {
        let input = validate_profile(request)?;
        let users = self.state.db.users();

        if users.email_taken(&input.email, Some(user_id)).await? {
            return Err(ApiError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = users.update(user_id, &input, &password_hash).await?;

        info!(user_id, "Profile updated");
        Ok(user)
    }
}
