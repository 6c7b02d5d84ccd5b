#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone};

use sked::clock::ManualClock;
use sked::config::Config;
use sked::deadline::DeadlineSpec;
use sked::runner::RecordingRunner;
use sked::scheduler::Scheduler;

/// Scheduler wired to a manual clock and a recording runner, plus handles
/// to both so tests can drive time and inspect executions.
pub struct TestScheduler {
    pub scheduler: Scheduler,
    pub clock: Arc<ManualClock>,
    pub runner: Arc<RecordingRunner>,
}

pub fn start_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 7, 4, 12, 0, 0).unwrap()
}

/// Build a test scheduler on the current tokio runtime. Call from inside a
/// `#[tokio::test(start_paused = true)]` body.
pub fn scheduler() -> TestScheduler {
    scheduler_with_config(Config::default())
}

pub fn scheduler_with_config(config: Config) -> TestScheduler {
    let clock = Arc::new(ManualClock::new(start_time()));
    let runner = Arc::new(RecordingRunner::new());
    let scheduler = Scheduler::with_parts(
        config,
        Arc::clone(&clock) as Arc<dyn sked::clock::Clock>,
        Arc::clone(&runner) as Arc<dyn sked::runner::CommandRunner>,
        tokio::runtime::Handle::current(),
    );
    TestScheduler {
        scheduler,
        clock,
        runner,
    }
}

pub fn relative(hours: f64, minutes: f64, seconds: f64) -> DeadlineSpec {
    DeadlineSpec::Relative {
        hours,
        minutes,
        seconds,
    }
}

/// Advance both clocks by whole seconds, then let woken alarm tasks and
/// their blocking command runs settle.
pub async fn advance_secs(fixture: &TestScheduler, secs: u64) {
    // Let freshly spawned alarm/ticker tasks register their timers at the
    // current paused instant before it moves, so deadlines don't slip.
    settle().await;
    fixture.clock.advance(Duration::seconds(secs as i64));
    tokio::time::advance(std::time::Duration::from_secs(secs)).await;
    settle().await;
}

/// Yield long enough for fired alarms to finish their spawn_blocking runs.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
}
