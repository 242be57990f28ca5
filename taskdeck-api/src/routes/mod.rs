/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `root`: Welcome message and health check
/// - `auth`: Token issuance and refresh
/// - `users`: User registration and CRUD
/// - `todos`: Per-user todo CRUD with filters

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod root;
pub mod todos;
pub mod users;

/// Simple `{"message": ...}` response body
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    /// Human-readable message
    pub message: String,
}

impl Message {
    /// Creates a message body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
