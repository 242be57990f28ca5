/// Todo resource endpoints
///
/// # Endpoints
///
/// - `POST /todos/` - Create a todo owned by the caller
/// - `GET /todos/` - List the caller's todos with filters and pagination
/// - `PATCH /todos/:id` - Partially update one of the caller's todos
/// - `DELETE /todos/:id` - Delete one of the caller's todos
///
/// All routes require a bearer token. Every query is scoped to the
/// caller's user ID, so another user's todo answers 404 exactly like a
/// nonexistent one.

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
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::CurrentUser,
    models::todo::{CreateTodo, Todo, TodoFilter, TodoState, UpdateTodo},
};
use validator::Validate;

/// Request body for creating a todo
#[derive(Debug, Deserialize)]
pub struct TodoBody {
    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Initial state (defaults to `todo`)
    #[serde(default)]
    pub state: TodoState,
}

/// Request body for partially updating a todo
///
/// Absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPatch {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New state
    pub state: Option<TodoState>,
}

/// Full todo record as returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoPublic {
    /// Todo ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Current state
    pub state: TodoState,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoPublic {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            state: todo.state,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// List response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoList {
    /// Page of matching todos
    pub todos: Vec<TodoPublic>,
}

/// List query parameters: pagination plus optional conjunctive filters
#[derive(Debug, Deserialize, Validate)]
pub struct TodoQuery {
    /// Rows to skip (default 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must be non-negative"))]
    pub offset: i64,

    /// Page size (default 10)
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must be non-negative"))]
    pub limit: i64,

    /// Substring filter on title; rejected before any query runs if the
    /// needle is shorter than 3 or longer than 22 characters
    #[validate(length(min = 3, max = 22, message = "title filter must be 3 to 22 characters"))]
    pub title: Option<String>,

    /// Substring filter on description
    pub description: Option<String>,

    /// Exact state filter
    pub state: Option<TodoState>,
}

fn default_limit() -> i64 {
    10
}

/// Create handler
///
/// ```text
/// POST /todos/
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {"title": "Buy milk", "description": "2 liters", "state": "draft"}
/// ```
///
/// Returns the full record including timestamps, 201.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(body): Json<TodoBody>,
) -> ApiResult<(StatusCode, Json<TodoPublic>)> {
    let todo = Todo::create(
        &state.db,
        CreateTodo {
            user_id: current.id,
            title: body.title,
            description: body.description,
            state: body.state,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// List handler
///
/// Filters combine conjunctively: exact `state` match plus case-sensitive
/// substring matches on `title` and `description`.
///
/// ```text
/// GET /todos/?offset=0&limit=10&state=todo&title=milk
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: title filter length outside 3-22, or a
///   query value the parameters cannot be deserialized from (unknown
///   `state` label, non-numeric `offset`)
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    query: Result<Query<TodoQuery>, QueryRejection>,
) -> ApiResult<Json<TodoList>> {
    let Query(query) = query?;
    query.validate()?;

    let filter = TodoFilter {
        state: query.state,
        title: query.title,
        description: query.description,
    };

    let todos = Todo::list(&state.db, current.id, &filter, query.limit, query.offset).await?;

    Ok(Json(TodoList {
        todos: todos.into_iter().map(TodoPublic::from).collect(),
    }))
}

/// Patch handler (partial update)
///
/// Only supplied fields are overwritten; `updated_at` always advances.
///
/// # Errors
///
/// - `404 Not Found`: "Task not found." (absent, or owned by someone else)
pub async fn patch_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(todo_id): Path<i64>,
    Json(body): Json<TodoPatch>,
) -> ApiResult<Json<TodoPublic>> {
    let todo = Todo::update_partial(
        &state.db,
        todo_id,
        current.id,
        UpdateTodo {
            title: body.title,
            description: body.description,
            state: body.state,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found.".to_string()))?;

    Ok(Json(todo.into()))
}

/// Delete handler
///
/// # Errors
///
/// - `404 Not Found`: "Task not found." (absent, or owned by someone else)
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(todo_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    let deleted = Todo::delete(&state.db, todo_id, current.id).await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Task not found.".to_string()));
    }

    Ok(Json(Message::new("Task has been deleted successfully.")))
}
