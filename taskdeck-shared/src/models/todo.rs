/// Todo model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_state AS ENUM ('draft', 'todo', 'doing', 'done');
///
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     state todo_state NOT NULL DEFAULT 'todo',
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Every todo is owned by exactly one user. All queries here are scoped by
/// `user_id`: a todo owned by someone else is indistinguishable from an
/// absent one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, QueryBuilder};

/// Lifecycle state of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "todo_state", rename_all = "lowercase")]
pub enum TodoState {
    /// Not yet actionable
    Draft,

    /// Ready to be worked on (the default)
    Todo,

    /// In progress
    Doing,

    /// Finished
    Done,
}

impl TodoState {
    /// Gets the state label as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoState::Draft => "draft",
            TodoState::Todo => "todo",
            TodoState::Doing => "doing",
            TodoState::Done => "done",
        }
    }
}

impl Default for TodoState {
    fn default() -> Self {
        TodoState::Todo
    }
}

/// Todo row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Auto-assigned integer ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Current lifecycle state
    pub state: TodoState,

    /// Owning user (non-null foreign key)
    pub user_id: i64,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new todo
#[derive(Debug, Clone)]
pub struct CreateTodo {
    /// Owning user
    pub user_id: i64,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Initial state
    pub state: TodoState,
}

/// Input for partially updating a todo
///
/// Only `Some` fields are overwritten; `None` fields keep their current
/// value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New state
    pub state: Option<TodoState>,
}

/// Optional list filters, combined conjunctively
///
/// Title and description are case-sensitive substring matches (SQL `LIKE`
/// with the needle wrapped in `%`); state is an exact match.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    /// Exact state match
    pub state: Option<TodoState>,

    /// Substring match on title
    pub title: Option<String>,

    /// Substring match on description
    pub description: Option<String>,
}

/// Escapes LIKE metacharacters so filter text matches literally
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Todo {
    /// Creates a new todo owned by `data.user_id`
    pub async fn create(pool: &PgPool, data: CreateTodo) -> Result<Self, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, description, state, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, state, user_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.state)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(todo)
    }

    /// Lists the user's todos matching all supplied filters
    ///
    /// Filters are conjunctive: adding a filter can only narrow the result.
    /// Results are ordered by ID and bounded by limit/offset.
    pub async fn list(
        pool: &PgPool,
        user_id: i64,
        filter: &TodoFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::new(
            "SELECT id, title, description, state, user_id, created_at, updated_at \
             FROM todos WHERE user_id = ",
        );
        query.push_bind(user_id);

        if let Some(state) = filter.state {
            query.push(" AND state = ");
            query.push_bind(state);
        }

        if let Some(title) = &filter.title {
            query.push(" AND title LIKE ");
            query.push_bind(format!("%{}%", escape_like(title)));
        }

        if let Some(description) = &filter.description {
            query.push(" AND description LIKE ");
            query.push_bind(format!("%{}%", escape_like(description)));
        }

        query.push(" ORDER BY id LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let todos = query.build_query_as::<Todo>().fetch_all(pool).await?;

        Ok(todos)
    }

    /// Partially updates the user's todo, returning None if it doesn't exist
    ///
    /// Fields left as `None` in `data` are untouched; `updated_at` always
    /// advances.
    pub async fn update_partial(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        data: UpdateTodo,
    ) -> Result<Option<Self>, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                state = COALESCE($5, state),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, description, state, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.state)
        .fetch_optional(pool)
        .await?;

        Ok(todo)
    }

    /// Deletes the user's todo, returning the number of rows removed
    pub async fn delete(pool: &PgPool, id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serde_labels() {
        assert_eq!(serde_json::to_string(&TodoState::Draft).unwrap(), "\"draft\"");
        assert_eq!(serde_json::to_string(&TodoState::Todo).unwrap(), "\"todo\"");
        assert_eq!(serde_json::to_string(&TodoState::Doing).unwrap(), "\"doing\"");
        assert_eq!(serde_json::to_string(&TodoState::Done).unwrap(), "\"done\"");

        let state: TodoState = serde_json::from_str("\"doing\"").unwrap();
        assert_eq!(state, TodoState::Doing);
    }

    #[test]
    fn test_state_rejects_unknown_label() {
        assert!(serde_json::from_str::<TodoState>("\"archived\"").is_err());
    }

    #[test]
    fn test_state_default_is_todo() {
        assert_eq!(TodoState::default(), TodoState::Todo);
        assert_eq!(TodoState::default().as_str(), "todo");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
