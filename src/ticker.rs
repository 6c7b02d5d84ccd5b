//! Countdown refresh.
//!
//! The ticker periodically recomputes each task's distance to its deadline
//! from a store snapshot and hands the formatted rows to an observer. It has
//! no scheduling authority: it never arms, cancels, or deletes anything, so
//! a display refresh can never interfere with alarm correctness.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::clock::Clock;
use crate::deadline::format_deadline;
use crate::store::TaskStore;
use crate::task::{Task, TaskRow};

/// Observer invoked with the freshly computed rows on every tick.
pub type TickObserver = Arc<dyn Fn(Vec<TaskRow>) + Send + Sync>;

/// Format the distance to a deadline as `H:MM:SS` (or `N days, H:MM:SS`).
///
/// The sign is never shown: once a task is past its deadline the value is
/// the overrun magnitude. Sub-second precision is truncated.
pub fn format_countdown(deadline: DateTime<Local>, now: DateTime<Local>) -> String {
    let delta = if deadline > now {
        deadline - now
    } else {
        now - deadline
    };
    format_magnitude(delta)
}

fn format_magnitude(delta: Duration) -> String {
    let total_secs = delta.num_seconds();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        let unit = if days == 1 { "day" } else { "days" };
        format!("{days} {unit}, {hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

/// Project a snapshot into display rows, in snapshot (insertion) order.
pub fn rows(snapshot: &[Task], now: DateTime<Local>, datetime_format: &str) -> Vec<TaskRow> {
    snapshot
        .iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            name: task.name.clone(),
            command: task.command.clone(),
            deadline: format_deadline(task.deadline, datetime_format),
            countdown: format_countdown(task.deadline, now),
            status: task.status,
        })
        .collect()
}

/// Fixed-period refresh loop over the task store.
pub struct CountdownTicker {
    refresher: JoinHandle<()>,
}

impl CountdownTicker {
    /// Start ticking. The next tick is scheduled after each observer call
    /// returns, so the period drifts by the observer's own cost; that is
    /// accepted for a display refresh.
    pub fn spawn(
        handle: &Handle,
        store: Arc<TaskStore>,
        clock: Arc<dyn Clock>,
        period: StdDuration,
        datetime_format: String,
        observer: TickObserver,
    ) -> Self {
        let refresher = handle.spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let now = clock.now();
                let rows = rows(&store.snapshot(), now, &datetime_format);
                trace!(tasks = rows.len(), "tick");
                observer(rows);
            }
        });
        Self { refresher }
    }

    /// Stop the refresh loop. Pending alarms are unaffected.
    pub fn stop(&self) {
        self.refresher.abort();
    }
}
