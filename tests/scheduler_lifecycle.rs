//! End-to-end lifecycle tests against the scheduler facade, driven by a
//! manual clock and paused tokio time.

mod support;

use sked::clock::Clock;
use sked::deadline::{format_deadline, DeadlineSpec, DEFAULT_DATETIME_FORMAT};
use sked::error::Error;
use sked::task::{TaskId, TaskStatus};

use chrono::Duration;
use support::{advance_secs, relative, scheduler, settle};

#[tokio::test(start_paused = true)]
async fn created_task_is_scheduled_and_fires_exactly_once() {
    let fx = scheduler();
    let id = fx
        .scheduler
        .add_task("A", "echo fired", &relative(0.0, 0.0, 2.0))
        .unwrap();

    let rows = fx.scheduler.list_tasks();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].status, TaskStatus::Scheduled);

    // 1s in: one second remaining, still scheduled, nothing run.
    advance_secs(&fx, 1).await;
    let rows = fx.scheduler.list_tasks();
    assert_eq!(rows[0].countdown, "0:00:01");
    assert_eq!(rows[0].status, TaskStatus::Scheduled);
    assert_eq!(fx.runner.run_count(), 0);

    // Past the deadline: exactly one run, expired.
    advance_secs(&fx, 2).await;
    assert_eq!(fx.runner.commands(), vec!["echo fired"]);
    assert_eq!(fx.scheduler.list_tasks()[0].status, TaskStatus::Expired);

    // Further elapses never re-run an already-fired alarm.
    advance_secs(&fx, 30).await;
    assert_eq!(fx.runner.run_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_countdown_shows_overrun_magnitude() {
    let fx = scheduler();
    fx.scheduler
        .add_task("A", "true", &relative(0.0, 0.0, 1.0))
        .unwrap();

    advance_secs(&fx, 4).await;
    let rows = fx.scheduler.list_tasks();
    assert_eq!(rows[0].status, TaskStatus::Expired);
    assert_eq!(rows[0].countdown, "0:00:03");
}

#[tokio::test(start_paused = true)]
async fn past_absolute_deadline_rejects_without_creating() {
    let fx = scheduler();
    let past = fx.clock.now() - Duration::seconds(1);
    let spec = DeadlineSpec::Absolute(format_deadline(past, DEFAULT_DATETIME_FORMAT));

    let err = fx.scheduler.add_task("A", "true", &spec).unwrap_err();
    assert!(matches!(err, Error::PastDeadline { .. }));
    assert!(fx.scheduler.list_tasks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_equal_to_now_is_rejected() {
    let fx = scheduler();
    let spec = DeadlineSpec::Absolute(format_deadline(
        fx.clock.now(),
        DEFAULT_DATETIME_FORMAT,
    ));
    let err = fx.scheduler.add_task("A", "true", &spec).unwrap_err();
    assert!(matches!(err, Error::PastDeadline { .. }));
}

#[tokio::test(start_paused = true)]
async fn edit_supersedes_the_original_alarm() {
    let fx = scheduler();
    let id = fx
        .scheduler
        .add_task("A", "echo old", &relative(0.0, 0.0, 2.0))
        .unwrap();

    advance_secs(&fx, 1).await;
    fx.scheduler
        .edit_task(&id, "A", "echo new", &relative(0.0, 0.0, 5.0))
        .unwrap();

    // Past the original deadline: the superseded alarm must not fire.
    advance_secs(&fx, 3).await;
    assert_eq!(fx.runner.run_count(), 0);
    assert_eq!(fx.scheduler.list_tasks()[0].status, TaskStatus::Scheduled);

    // The updated command runs exactly once at the new time.
    advance_secs(&fx, 3).await;
    assert_eq!(fx.runner.commands(), vec!["echo new"]);
    assert_eq!(fx.scheduler.list_tasks()[0].status, TaskStatus::Expired);
}

#[tokio::test(start_paused = true)]
async fn editing_an_expired_task_rearms_it() {
    let fx = scheduler();
    let id = fx
        .scheduler
        .add_task("A", "echo first", &relative(0.0, 0.0, 1.0))
        .unwrap();

    advance_secs(&fx, 2).await;
    assert_eq!(fx.scheduler.list_tasks()[0].status, TaskStatus::Expired);

    fx.scheduler
        .edit_task(&id, "A", "echo second", &relative(0.0, 0.0, 2.0))
        .unwrap();
    assert_eq!(fx.scheduler.list_tasks()[0].status, TaskStatus::Scheduled);

    advance_secs(&fx, 3).await;
    assert_eq!(fx.runner.commands(), vec!["echo first", "echo second"]);
    assert_eq!(fx.scheduler.list_tasks()[0].status, TaskStatus::Expired);
}

#[tokio::test(start_paused = true)]
async fn edit_with_past_deadline_changes_nothing() {
    let fx = scheduler();
    let id = fx
        .scheduler
        .add_task("A", "echo keep", &relative(0.0, 0.0, 2.0))
        .unwrap();

    let err = fx
        .scheduler
        .edit_task(&id, "B", "echo drop", &relative(0.0, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, Error::PastDeadline { .. }));

    // Original task is untouched and still fires with its own command.
    let rows = fx.scheduler.list_tasks();
    assert_eq!(rows[0].name, "A");
    assert_eq!(rows[0].command, "echo keep");

    advance_secs(&fx, 3).await;
    assert_eq!(fx.runner.commands(), vec!["echo keep"]);
}

#[tokio::test(start_paused = true)]
async fn deleted_task_never_fires() {
    let fx = scheduler();
    let id = fx
        .scheduler
        .add_task("A", "echo nope", &relative(0.0, 0.0, 1.0))
        .unwrap();
    fx.scheduler.delete_task(&id).unwrap();
    assert!(fx.scheduler.list_tasks().is_empty());

    advance_secs(&fx, 5).await;
    assert_eq!(fx.runner.run_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_ids_are_not_found() {
    let fx = scheduler();
    let ghost = TaskId::new();

    let err = fx.scheduler.delete_task(&ghost).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(_)));

    let err = fx
        .scheduler
        .edit_task(&ghost, "A", "true", &relative(0.0, 0.0, 5.0))
        .unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn empty_name_gets_the_default_label() {
    let fx = scheduler();
    fx.scheduler
        .add_task("  ", "true", &relative(0.0, 0.0, 5.0))
        .unwrap();
    assert_eq!(fx.scheduler.list_tasks()[0].name, "Unnamed");
}

#[tokio::test(start_paused = true)]
async fn close_cancels_every_pending_alarm() {
    let fx = scheduler();
    for name in ["a", "b", "c"] {
        fx.scheduler
            .add_task(name, "true", &relative(0.0, 0.0, 2.0))
            .unwrap();
    }
    fx.scheduler.close();

    advance_secs(&fx, 10).await;
    assert_eq!(fx.runner.run_count(), 0);
    // Records survive close; only the alarms are gone.
    assert_eq!(fx.scheduler.task_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn tasks_list_in_creation_order() {
    let fx = scheduler();
    for name in ["first", "second", "third"] {
        fx.scheduler
            .add_task(name, "true", &relative(0.0, 1.0, 0.0))
            .unwrap();
    }
    let names: Vec<String> = fx
        .scheduler
        .list_tasks()
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_firings_expire_independently() {
    let fx = scheduler();
    let mut ids = Vec::new();
    for i in 1..=3 {
        let id = fx
            .scheduler
            .add_task(
                &format!("t{i}"),
                &format!("echo {i}"),
                &relative(0.0, 0.0, 1.0),
            )
            .unwrap();
        ids.push(id);
    }

    advance_secs(&fx, 2).await;
    settle().await;

    let mut commands = fx.runner.commands();
    commands.sort();
    assert_eq!(commands, vec!["echo 1", "echo 2", "echo 3"]);
    assert!(fx.scheduler.all_expired());
}

#[tokio::test(start_paused = true)]
async fn suggestions_match_the_configured_format() {
    let fx = scheduler();
    let suggested = fx.scheduler.suggest_absolute_deadline();
    assert_eq!(
        suggested,
        format_deadline(fx.clock.now(), DEFAULT_DATETIME_FORMAT)
    );
    assert_eq!(fx.scheduler.suggest_relative_deadline(), "00:00:00");
}
