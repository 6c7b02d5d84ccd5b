//! sked - One-Shot Deadline Task Scheduler
//!
//! This library provides the core functionality for the sked CLI tool:
//! named tasks, each bound to a shell command and a deadline, with the
//! command run exactly once at that deadline.
//!
//! # Core Concepts
//!
//! - **Tasks**: name + shell command + deadline, `scheduled` until fired
//! - **Deadlines**: absolute timestamps or relative offsets, always strictly
//!   in the future when accepted
//! - **Alarms**: one suspendable one-shot countdown per scheduled task
//! - **Countdown Ticker**: periodic display refresh with no scheduling
//!   authority
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `clock`: time source abstraction (system or synthetic)
//! - `config`: configuration loading from `sked.toml`
//! - `deadline`: absolute/relative deadline resolution and formatting
//! - `error`: error types and result aliases
//! - `output`: human and JSON output for the CLI
//! - `runner`: shell command execution
//! - `scheduler`: the facade a view layer calls
//! - `store`: synchronized, insertion-ordered task storage
//! - `ticker`: periodic countdown recomputation
//! - `timer`: one-shot alarm lifecycle (arm / cancel / rearm / fire)

pub mod cli;
pub mod clock;
pub mod config;
pub mod deadline;
pub mod error;
pub mod output;
pub mod runner;
pub mod scheduler;
pub mod store;
pub mod task;
pub mod ticker;
pub mod timer;

pub use error::{Error, Result};
pub use scheduler::Scheduler;
