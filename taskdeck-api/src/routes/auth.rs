/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/token` - Exchange form credentials for a bearer token
/// - `POST /auth/refresh-token` - Re-issue a token for the authenticated user
///
/// Login takes an OAuth2-style form body where `username` carries the
/// user's email. Both unknown-email and wrong-password failures return the
/// same 401 detail so the endpoint doesn't leak which accounts exist.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Form, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::CurrentUser,
        password::verify_password,
    },
    models::user::User,
};

/// Login form body (OAuth2 password flow shape)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// The user's email address
    pub username: String,

    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token_access: String,

    /// Always "Bearer"
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(token_access: String) -> Self {
        Self {
            token_access,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Form login handler
///
/// ```text
/// POST /auth/token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=user@example.com&password=secret
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: "Incorrect email or username" (unknown email or
///   wrong password, indistinguishable)
pub async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_email(&state.db, &form.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or username".to_string()))?;

    let valid = verify_password(&form.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect email or username".to_string(),
        ));
    }

    let claims = Claims::new(&user.email, state.token_duration());
    let token_access = create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse::bearer(token_access)))
}

/// Token refresh handler
///
/// Issues a fresh token for the already-authenticated caller, extending
/// validity without re-submitting a password. Because this route sits
/// behind the JWT middleware, an expired token fails here exactly as it
/// fails on any other protected route; refresh cannot revive an expired
/// token.
///
/// ```text
/// POST /auth/refresh-token
/// Authorization: Bearer <token>
/// ```
pub async fn refresh_access_token(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<TokenResponse>> {
    let claims = Claims::new(&user.email, state.token_duration());
    let token_access = create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse::bearer(token_access)))
}
