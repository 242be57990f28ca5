/// User resource endpoints
///
/// # Endpoints
///
/// - `POST /users/` - Register a new user (public)
/// - `GET /users/` - List users, paginated (bearer)
/// - `GET /users/:id` - Read one user (bearer)
/// - `PUT /users/:id` - Overwrite own record (bearer, self only)
/// - `DELETE /users/:id` - Delete own record (bearer, self only)
///
/// Responses carry the public projection only; the password hash never
/// leaves the server.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Message,
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::CurrentUser, password::hash_password},
    models::user::{CreateUser, UpdateUser, User},
};
use validator::Validate;

/// Request body for create and update (PUT overwrites all three fields)
#[derive(Debug, Deserialize, Validate)]
pub struct UserBody {
    /// Desired username
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before persistence
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Public projection of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserPublic {
    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// User ID
    pub id: i64,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            id: user.id,
        }
    }
}

/// List response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    /// Page of users
    pub users: Vec<UserPublic>,
}

/// Offset/limit pagination query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct Pagination {
    /// Rows to skip (default 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must be non-negative"))]
    pub offset: i64,

    /// Page size (default 10)
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must be non-negative"))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// Registration handler
///
/// Pre-checks uniqueness before inserting: username is checked first, so a
/// request colliding on both fields reports the username conflict.
///
/// # Errors
///
/// - `409 Conflict`: "Username already exists" / "Email already exists"
/// - `422 Unprocessable Entity`: invalid email format or empty fields
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserBody>,
) -> ApiResult<(StatusCode, Json<UserPublic>)> {
    body.validate()?;

    if let Some(existing) =
        User::find_by_username_or_email(&state.db, &body.username, &body.email).await?
    {
        if existing.username == body.username {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&body.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: body.username,
            email: body.email,
            password_hash,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List handler
///
/// ```text
/// GET /users/?offset=0&limit=10
/// Authorization: Bearer <token>
/// ```
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<UserList>> {
    let Query(page) = page?;
    page.validate()?;

    let users = User::list(&state.db, page.limit, page.offset).await?;

    Ok(Json(UserList {
        users: users.into_iter().map(UserPublic::from).collect(),
    }))
}

/// Read handler
///
/// # Errors
///
/// - `404 Not Found`: "User not found"
pub async fn read_user(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserPublic>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update handler (PUT, self only)
///
/// Overwrites username, email, and password. Uniqueness is not pre-checked
/// here; a collision surfaces as a constraint violation at commit and maps
/// to 409 "Username or Email already exists".
///
/// # Errors
///
/// - `403 Forbidden`: "Not enough permissions" (target is another user)
/// - `409 Conflict`: new username or email already taken
pub async fn update_user(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
    Json(body): Json<UserBody>,
) -> ApiResult<Json<UserPublic>> {
    if current.id != user_id {
        return Err(ApiError::Forbidden("Not enough permissions".to_string()));
    }

    body.validate()?;

    let password_hash = hash_password(&body.password)?;

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            username: body.username,
            email: body.email,
            password_hash,
        },
    )
    .await?;

    Ok(Json(user.into()))
}

/// Delete handler (self only)
///
/// # Errors
///
/// - `403 Forbidden`: "Not enough permissions" (target is another user)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    if current.id != user_id {
        return Err(ApiError::Forbidden("Not enough permissions".to_string()));
    }

    User::delete(&state.db, user_id).await?;

    Ok(Json(Message::new("User deleted")))
}
