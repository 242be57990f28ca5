/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::{
    auth::{
        jwt,
        middleware::{AuthError, CurrentUser},
    },
    models::user::User,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning; the config (including the JWT
/// secret) is read-only after process start.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the configured token lifetime
    pub fn token_duration(&self) -> Duration {
        self.config.token_duration()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                      # Welcome message (public)
/// ├── GET  /health                # Health check (public)
/// ├── /auth/
/// │   ├── POST /token             # Form login (public)
/// │   └── POST /refresh-token     # Re-issue token (bearer)
/// ├── /users/
/// │   ├── POST   /                # Register (public)
/// │   ├── GET    /                # List (bearer)
/// │   ├── GET    /:id             # Read (bearer)
/// │   ├── PUT    /:id             # Update, self only (bearer)
/// │   └── DELETE /:id             # Delete, self only (bearer)
/// └── /todos/                     # All bearer-authenticated
///     ├── POST   /
///     ├── GET    /
///     ├── PATCH  /:id
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. JWT authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::root::read_root))
        .route("/health", get(routes::root::health_check));

    let auth_public = Router::new().route("/token", post(routes::auth::login_for_access_token));

    let auth_protected = Router::new()
        .route("/refresh-token", post(routes::auth::refresh_access_token))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let users_public = Router::new().route("/", post(routes::users::create_user));

    let users_protected = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::read_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let todo_routes = Router::new()
        .route("/", post(routes::todos::create_todo))
        .route("/", get(routes::todos::list_todos))
        .route("/:id", patch(routes::todos::patch_todo))
        .route("/:id", delete(routes::todos::delete_todo))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/users", users_public.merge(users_protected))
        .nest("/todos", todo_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Per-request state machine: no token → reject; token present → verify
/// signature and expiry → load the subject's user row → inject
/// [`CurrentUser`] into request extensions. Every non-authenticated
/// outcome converts to the uniform 401 response via `From<AuthError>`.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = jwt::validate_token(token, state.jwt_secret())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let user = User::find_by_email(&state.db, &claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UserMissing)?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
