//! Scheduler facade.
//!
//! The boundary a view layer talks to: add, edit, delete, list, close. Each
//! mutation resolves its deadline first (so a rejected deadline leaves no
//! partial state), then updates the store, then arms or cancels the alarm.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::deadline::{self, DeadlineSpec, RELATIVE_ZERO};
use crate::error::Result;
use crate::runner::{CommandRunner, ShellRunner};
use crate::store::TaskStore;
use crate::task::{display_name, TaskId, TaskRow};
use crate::ticker::{self, CountdownTicker, TickObserver};
use crate::timer::TimerScheduler;

pub struct Scheduler {
    config: Config,
    clock: Arc<dyn Clock>,
    store: Arc<TaskStore>,
    timers: TimerScheduler,
    ticker: Mutex<Option<CountdownTicker>>,
    handle: Handle,
}

impl Scheduler {
    /// Production scheduler: system clock, shell runner from config.
    pub fn new(config: Config, handle: Handle) -> Self {
        let shell = config.shell.clone();
        Self::with_parts(
            config,
            Arc::new(SystemClock),
            Arc::new(ShellRunner::new(shell)),
            handle,
        )
    }

    /// Scheduler with injected clock and runner.
    pub fn with_parts(
        config: Config,
        clock: Arc<dyn Clock>,
        runner: Arc<dyn CommandRunner>,
        handle: Handle,
    ) -> Self {
        let store = Arc::new(TaskStore::new());
        let timers = TimerScheduler::new(
            Arc::clone(&store),
            runner,
            Arc::clone(&clock),
            handle.clone(),
        );
        Self {
            config,
            clock,
            store,
            timers,
            ticker: Mutex::new(None),
            handle,
        }
    }

    /// Create a task and arm its alarm. Rejects deadlines not strictly in
    /// the future without creating anything.
    pub fn add_task(&self, name: &str, command: &str, spec: &DeadlineSpec) -> Result<TaskId> {
        let now = self.clock.now();
        let deadline = deadline::resolve(spec, now, &self.config.datetime_format)?;
        let name = display_name(name, &self.config.default_task_name);

        let task = self.store.create(name, command.to_string(), deadline);
        self.timers.arm(task.id.clone(), deadline, task.generation);
        info!(id = %task.id, name = %task.name, deadline = %deadline, "task added");
        Ok(task.id)
    }

    /// Replace a task's name, command, and deadline, superseding its alarm.
    /// An expired task edited with a future deadline returns to scheduled.
    pub fn edit_task(
        &self,
        id: &TaskId,
        name: &str,
        command: &str,
        spec: &DeadlineSpec,
    ) -> Result<()> {
        let now = self.clock.now();
        let deadline = deadline::resolve(spec, now, &self.config.datetime_format)?;
        let name = display_name(name, &self.config.default_task_name);

        let updated = self.store.update(id, name, command.to_string(), deadline)?;
        self.timers.rearm(id.clone(), deadline, updated.generation);
        info!(%id, deadline = %deadline, "task rescheduled");
        Ok(())
    }

    /// Cancel the task's alarm, then remove the record. No alarm ever fires
    /// for a deleted id.
    pub fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.timers.cancel(id);
        let task = self.store.remove(id)?;
        info!(%id, name = %task.name, "task deleted");
        Ok(())
    }

    /// Display rows for every task, in creation order, with countdowns
    /// computed at call time.
    pub fn list_tasks(&self) -> Vec<TaskRow> {
        ticker::rows(
            &self.store.snapshot(),
            self.clock.now(),
            &self.config.datetime_format,
        )
    }

    /// Start the countdown refresh loop, replacing any previous one.
    pub fn watch(&self, observer: TickObserver) {
        let ticker = CountdownTicker::spawn(
            &self.handle,
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.tick(),
            self.config.datetime_format.clone(),
            observer,
        );
        let mut slot = self.ticker.lock().expect("ticker lock poisoned");
        if let Some(previous) = slot.replace(ticker) {
            previous.stop();
        }
    }

    /// Pre-fill value for an absolute deadline input: now, in the
    /// configured format.
    pub fn suggest_absolute_deadline(&self) -> String {
        deadline::suggest_absolute(self.clock.now(), &self.config.datetime_format)
    }

    /// Pre-fill value for a relative deadline input.
    pub fn suggest_relative_deadline(&self) -> &'static str {
        RELATIVE_ZERO
    }

    /// True once every task has fired (or none exist).
    pub fn all_expired(&self) -> bool {
        self.store.all_expired()
    }

    pub fn task_count(&self) -> usize {
        self.store.len()
    }

    /// Cancel every pending alarm and stop the ticker. In-flight command
    /// executions are neither awaited nor terminated.
    pub fn close(&self) {
        if let Some(ticker) = self
            .ticker
            .lock()
            .expect("ticker lock poisoned")
            .take()
        {
            ticker.stop();
        }
        self.timers.cancel_all();
        info!("scheduler closed");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.close();
    }
}
