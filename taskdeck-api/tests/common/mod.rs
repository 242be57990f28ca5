/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup against `DATABASE_URL`
/// - Seeded user with a known password and a valid JWT
/// - Router built exactly as in production
/// - Request helpers driving the router through tower

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::auth::jwt::{create_token, Claims};
use taskdeck_shared::auth::password::hash_password;
use taskdeck_shared::models::todo::{CreateTodo, Todo, TodoState};
use taskdeck_shared::models::user::{CreateUser, User};
use tower::ServiceExt;

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Produces a suffix unique across concurrently running tests
fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", nanos, n)
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub password: String,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and seeded user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let suffix = unique_suffix();
        let password = "test-password".to_string();

        let user = User::create(
            &db,
            CreateUser {
                username: format!("tester-{}", suffix),
                email: format!("tester-{}@example.com", suffix),
                password_hash: hash_password(&password)?,
            },
        )
        .await?;

        let claims = Claims::new(&user.email, config.token_duration());
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            password,
            jwt_token,
        })
    }

    /// Returns authorization header value for the seeded user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates an additional user directly in the database
    pub async fn create_other_user(&self) -> anyhow::Result<(User, String)> {
        let suffix = unique_suffix();

        let user = User::create(
            &self.db,
            CreateUser {
                username: format!("other-{}", suffix),
                email: format!("other-{}@example.com", suffix),
                password_hash: hash_password("other-password")?,
            },
        )
        .await?;

        let claims = Claims::new(&user.email, self.config.token_duration());
        let token = create_token(&claims, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Creates a todo for the given user directly in the database
    pub async fn create_todo(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        state: TodoState,
    ) -> anyhow::Result<Todo> {
        let todo = Todo::create(
            &self.db,
            CreateTodo {
                user_id,
                title: title.to_string(),
                description: description.to_string(),
                state,
            },
        )
        .await?;

        Ok(todo)
    }

    /// Sends a JSON request through the router and parses the response
    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Sends a form-encoded request (used by the login endpoint)
    pub async fn send_form(&self, uri: &str, form: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Cleans up test data (cascades to the user's todos)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}
