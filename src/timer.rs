//! One-shot alarm scheduling.
//!
//! Each armed task owns exactly one background sleep task. On elapse the
//! fire path re-validates the task against the store (existence, arm
//! generation, status) before running its command, which makes `cancel`
//! logically effective even when the underlying timer task has already been
//! woken: a stale callback sees a mismatched generation and does nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::runner::CommandRunner;
use crate::store::TaskStore;
use crate::task::{TaskId, TaskStatus};

struct Alarm {
    generation: u64,
    sleeper: JoinHandle<()>,
}

/// Owns the pending alarms: at most one per task id.
pub struct TimerScheduler {
    store: Arc<TaskStore>,
    runner: Arc<dyn CommandRunner>,
    clock: Arc<dyn Clock>,
    alarms: Arc<Mutex<HashMap<TaskId, Alarm>>>,
    handle: Handle,
}

impl TimerScheduler {
    pub fn new(
        store: Arc<TaskStore>,
        runner: Arc<dyn CommandRunner>,
        clock: Arc<dyn Clock>,
        handle: Handle,
    ) -> Self {
        Self {
            store,
            runner,
            clock,
            alarms: Arc::new(Mutex::new(HashMap::new())),
            handle,
        }
    }

    /// Arm a one-shot alarm for `deadline - now`. Returns immediately; the
    /// countdown runs on a background task.
    ///
    /// Callers must cancel any previous alarm for the id first. An
    /// accidental double-arm is tolerated by aborting the older alarm.
    pub fn arm(&self, id: TaskId, deadline: DateTime<Local>, generation: u64) {
        let delay = (deadline - self.clock.now())
            .to_std()
            .unwrap_or(StdDuration::ZERO);

        let store = Arc::clone(&self.store);
        let runner = Arc::clone(&self.runner);
        let alarms = Arc::clone(&self.alarms);
        let fire_id = id.clone();

        let sleeper = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(store, runner, alarms, fire_id, generation).await;
        });

        debug!(%id, generation, ?delay, "alarm armed");
        let mut alarms = self.lock();
        if let Some(previous) = alarms.insert(id.clone(), Alarm { generation, sleeper }) {
            if !previous.sleeper.is_finished() {
                warn!(%id, "replacing a live alarm; callers should cancel before re-arming");
            }
            previous.sleeper.abort();
        }
    }

    /// Stop the pending alarm for an id, if any. A missing or already-fired
    /// alarm is not an error.
    ///
    /// The abort is best-effort; the generation check in the fire path is
    /// what guarantees a woken-but-stale callback never acts.
    pub fn cancel(&self, id: &TaskId) {
        if let Some(alarm) = self.lock().remove(id) {
            alarm.sleeper.abort();
            debug!(%id, generation = alarm.generation, "alarm cancelled");
        }
    }

    /// `cancel` followed by `arm`; used when a task is edited.
    pub fn rearm(&self, id: TaskId, deadline: DateTime<Local>, generation: u64) {
        self.cancel(&id);
        self.arm(id, deadline, generation);
    }

    /// Abort every pending alarm. In-flight command executions are not
    /// waited on.
    pub fn cancel_all(&self) {
        let mut alarms = self.lock();
        for (id, alarm) in alarms.drain() {
            alarm.sleeper.abort();
            debug!(%id, "alarm cancelled at shutdown");
        }
    }

    /// Number of pending alarm handles.
    pub fn armed_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, Alarm>> {
        self.alarms.lock().expect("alarm table lock poisoned")
    }
}

/// Alarm elapse path. Validates the task, runs its command, then marks it
/// expired. Every early return here is a deliberate no-op for a task that
/// was deleted or rearmed after this alarm was started.
async fn fire(
    store: Arc<TaskStore>,
    runner: Arc<dyn CommandRunner>,
    alarms: Arc<Mutex<HashMap<TaskId, Alarm>>>,
    id: TaskId,
    generation: u64,
) {
    let Some(task) = store.get(&id) else {
        debug!(%id, "alarm fired for a deleted task; ignoring");
        return;
    };
    if task.generation != generation || task.status != TaskStatus::Scheduled {
        debug!(%id, generation, current = task.generation, "stale alarm; ignoring");
        return;
    }

    let command = task.command.clone();
    let run_id = id.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let result = runner.run(&command);
        (command, result)
    })
    .await;

    // Exit status never blocks the Expired transition (fire-and-forget).
    match outcome {
        Ok((command, Ok(result))) if result.success() => {
            debug!(%run_id, %command, "command succeeded");
        }
        Ok((command, Ok(result))) => {
            warn!(%run_id, %command, ?result, "command failed");
        }
        Ok((command, Err(err))) => {
            warn!(%run_id, %command, %err, "command could not be started");
        }
        Err(err) => {
            warn!(%run_id, %err, "command execution task panicked");
        }
    }

    store.expire(&id, generation);

    // Drop our own handle entry unless a rearm already replaced it.
    let mut alarms = alarms.lock().expect("alarm table lock poisoned");
    if alarms
        .get(&id)
        .is_some_and(|alarm| alarm.generation == generation)
    {
        alarms.remove(&id);
    }
}
