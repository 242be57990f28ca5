/// Request authentication context
///
/// After the API's JWT middleware validates a bearer token and loads the
/// matching user, it inserts a [`CurrentUser`] into the request extensions.
/// Handlers extract it with Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdeck_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", current.0.username)
/// }
/// ```

use crate::models::user::User;

/// The authenticated user for the current request
///
/// Wraps the full user row loaded from the database during authentication,
/// so handlers never re-query for the caller's identity.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Error type for request authentication
///
/// Every variant except `DatabaseError` maps to the uniform
/// 401 "Could not validate credentials" response: callers learn nothing
/// about whether the header was missing, the signature was bad, the token
/// expired, or the subject no longer exists.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or not a Bearer scheme
    #[error("Missing or malformed authorization header")]
    MissingCredentials,

    /// Token failed signature, issuer, or expiry validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token was valid but its subject matches no user
    #[error("Token subject not found")]
    UserMissing,

    /// Database failure while loading the user
    #[error("Database error: {0}")]
    DatabaseError(String),
}
