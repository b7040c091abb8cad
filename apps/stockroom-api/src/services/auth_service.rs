//! Registration, login and bearer-token authentication.

use std::sync::Arc;

use serde::Serialize;
use stockroom_core::validation::{validate_login, validate_profile};
use stockroom_core::{LoginRequest, RegisterRequest};
use tracing::{info, warn};

use crate::auth::{extract_bearer_token, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// What a successful login hands back.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(state: Arc<AppState>) -> Self {
        AuthService { state }
    }

    /// Registers a new user and returns their id.
    ///
    /// ## Errors
    /// * `ValidationError` - Any field is missing or malformed
    /// * `Conflict` - The email is already registered
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<i64> {
        let input = validate_profile(request)?;
        let users = self.state.db.users();

        if users.email_taken(&input.email, None).await? {
            warn!(email = %input.email, "Registration with taken email");
            return Err(ApiError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = users.insert(&input, &password_hash).await?;

        info!(user_id = user.id, "User registered");
        Ok(user.id)
    }

    /// Exchanges email and password for a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        let email = validate_login(request)?;

        let credentials = self.state.db.users().get_credentials(&email).await?;

        let credentials = match credentials {
            Some(c) if verify_password(&request.password, &c.password_hash) => c,
            _ => {
                warn!(email = %email, "Failed login");
                return Err(ApiError::unauthorized("Invalid email or password"));
            }
        };

        let token = self
            .state
            .jwt
            .generate_token(credentials.user.id, &credentials.user.email)?;

        info!(user_id = credentials.user.id, "Token issued");

        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            expires_in: self.state.jwt.lifetime_secs(),
        })
    }

    /// Resolves an `Authorization` header to the id of an existing user.
    pub async fn authenticate(&self, auth_header: Option<&str>) -> ApiResult<i64> {
        let token = auth_header
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let user_id = self.state.jwt.validate_token(token)?.user_id()?;

        // Tokens outlive deleted accounts; the initiator must still exist.
        if self.state.db.users().get_by_id(user_id).await?.is_none() {
            return Err(ApiError::unauthorized("Unknown user"));
        }

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::test_support::{register_request, services, user};
    use stockroom_core::LoginRequest;

    #[tokio::test]
    async fn test_register_login_authenticate() {
        let services = services().await;
        let user_id = user(&services, "rina@example.com").await;

        let login = services
            .auth()
            .login(&LoginRequest {
                email: "RINA@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.token_type, "Bearer");

        let header = format!("Bearer {}", login.token);
        let resolved = services.auth().authenticate(Some(&header)).await.unwrap();
        assert_eq!(resolved, user_id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let services = services().await;
        user(&services, "dup@example.com").await;

        let err = services
            .auth()
            .register(&register_request("Dup@Example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.status(), 409);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let services = services().await;

        let mut request = register_request("x@example.com");
        request.gender = "M".to_string();
        let err = services.auth().register(&request).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.errors[0].field, "gender");
    }

    #[tokio::test]
    async fn test_login_failures_are_unauthorized() {
        let services = services().await;
        user(&services, "rina@example.com").await;

        for (email, password) in [
            ("rina@example.com", "wrong-horse"),
            ("nobody@example.com", "correct-horse"),
        ] {
            let err = services
                .auth()
                .login(&LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.status(), 401);
        }
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_headers() {
        let services = services().await;
        let auth = services.auth();

        assert_eq!(auth.authenticate(None).await.unwrap_err().status(), 401);
        assert_eq!(
            auth.authenticate(Some("Bearer not-a-jwt")).await.unwrap_err().status(),
            401
        );

        // Valid signature, but no such user.
        let token = services.state().jwt.generate_token(999, "ghost@example.com").unwrap();
        let header = format!("Bearer {}", token);
        assert_eq!(auth.authenticate(Some(&header)).await.unwrap_err().status(), 401);
    }
}
