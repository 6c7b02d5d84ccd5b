//! Task records and display projections.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Fallback display label for tasks created with an empty name.
pub const DEFAULT_TASK_NAME: &str = "Unnamed";

/// Opaque task identifier. Assigned at creation, stable for the task's
/// lifetime, never reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Ids are opaque; any string converts and simply fails lookup if unknown.
impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }
}

/// Task lifecycle state.
///
/// `Scheduled` means exactly one alarm is armed for the task; `Expired`
/// means its alarm has fired and the command run was attempted. A task
/// returns to `Scheduled` only through an edit with a new future deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Scheduled,
    Expired,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Scheduled => f.write_str("scheduled"),
            TaskStatus::Expired => f.write_str("expired"),
        }
    }
}

/// A scheduled unit of work: one shell command bound to one deadline.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub command: String,
    pub deadline: DateTime<Local>,
    pub status: TaskStatus,
    /// Arm instance token. Bumped on every rearm so a fire callback from a
    /// superseded alarm can detect that it is stale.
    pub generation: u64,
}

/// Row handed to views: everything pre-formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub name: String,
    pub command: String,
    pub deadline: String,
    pub countdown: String,
    pub status: TaskStatus,
}

/// Normalize a user-supplied task name, falling back to the default label.
pub fn display_name(raw: &str, default_name: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default_name.to_string()
    } else {
        trimmed.to_string()
    }
}
