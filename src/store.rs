//! Task storage.
//!
//! `TaskStore` is the single owner of all task records. Every mutation goes
//! through one internal lock so caller-driven edits, the countdown ticker's
//! snapshots, and alarm fire callbacks never observe a task mid-update.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::task::{Task, TaskId, TaskStatus};

/// Insertion-ordered, internally synchronized set of tasks.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new task with a fresh id. The caller is responsible for
    /// arming the matching alarm with the returned generation.
    pub fn create(&self, name: String, command: String, deadline: DateTime<Local>) -> Task {
        let task = Task {
            id: TaskId::new(),
            name,
            command,
            deadline,
            status: TaskStatus::Scheduled,
            generation: 0,
        };
        self.lock().push(task.clone());
        task
    }

    /// Replace a task's name, command, and deadline.
    ///
    /// Bumps the generation so any in-flight fire callback from the previous
    /// arm instance becomes stale, and resets status to `Scheduled` (an edit
    /// always carries a validated future deadline).
    pub fn update(
        &self,
        id: &TaskId,
        name: String,
        command: String,
        deadline: DateTime<Local>,
    ) -> Result<Task> {
        let mut tasks = self.lock();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

        task.name = name;
        task.command = command;
        task.deadline = deadline;
        task.status = TaskStatus::Scheduled;
        task.generation += 1;
        Ok(task.clone())
    }

    /// Remove a task. The caller must have cancelled its alarm first.
    pub fn remove(&self, id: &TaskId) -> Result<Task> {
        let mut tasks = self.lock();
        let index = tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        Ok(tasks.remove(index))
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.lock().iter().find(|task| &task.id == id).cloned()
    }

    /// Point-in-time copy of all tasks, in insertion order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True when no task is still waiting on its alarm.
    pub fn all_expired(&self) -> bool {
        self.lock()
            .iter()
            .all(|task| task.status == TaskStatus::Expired)
    }

    /// Transition a task to `Expired`, but only if it still exists, is still
    /// `Scheduled`, and the caller's arm generation is current. Used only by
    /// the alarm fire path; a stale or missing task is a quiet no-op.
    ///
    /// Returns `true` when the transition happened.
    pub fn expire(&self, id: &TaskId, generation: u64) -> bool {
        let mut tasks = self.lock();
        match tasks.iter_mut().find(|task| &task.id == id) {
            Some(task)
                if task.generation == generation && task.status == TaskStatus::Scheduled =>
            {
                task.status = TaskStatus::Expired;
                true
            }
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().expect("task store lock poisoned")
    }
}
