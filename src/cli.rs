//! Command-line interface for sked
//!
//! A thin view over [`Scheduler`]: batch mode schedules `--task` definitions
//! and waits for every alarm to fire; interactive mode maps stdin commands
//! (`add`, `edit`, `del`, `list`, `now`, `quit`) onto the scheduler API.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use clap::Parser;
use serde::Serialize;

use crate::config::Config;
use crate::deadline::DeadlineSpec;
use crate::error::{Error, Result};
use crate::output::{self, OutputOptions};
use crate::scheduler::Scheduler;
use crate::task::TaskId;
use crate::ticker::TickObserver;

const POLL_INTERVAL: StdDuration = StdDuration::from_millis(50);

/// sked - one-shot deadline task scheduler
///
/// Define named tasks, each bound to a shell command and a deadline, and run
/// each command exactly once at its deadline.
#[derive(Parser, Debug)]
#[command(name = "sked")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Task definition: NAME::COMMAND::DEADLINE, where DEADLINE is
    /// `@<timestamp>` (absolute) or `+H:M:S` (relative). Repeatable.
    #[arg(long = "task", value_name = "NAME::COMMAND::DEADLINE")]
    pub tasks: Vec<String>,

    /// Print the countdown table on every refresh tick
    #[arg(long)]
    pub watch: bool,

    /// Read add/edit/del/list commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Path to the configuration file (defaults to ./sked.toml)
    #[arg(long, env = "SKED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Serialize)]
struct AddedTask<'a> {
    id: &'a TaskId,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if self.tasks.is_empty() && !self.interactive {
            return Err(Error::InvalidArgument(
                "nothing to do: pass --task or --interactive".to_string(),
            ));
        }

        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let scheduler = Scheduler::new(config, runtime.handle().clone());

        for raw in &self.tasks {
            let (name, command, spec) = parse_task_spec(raw)?;
            let id = scheduler.add_task(&name, &command, &spec)?;
            emit_added(options, &id)?;
        }

        if self.watch {
            scheduler.watch(watch_observer(options));
        }

        if self.interactive {
            repl(&scheduler, options)?;
        } else {
            // Batch mode: the process lives until every task has fired.
            while !scheduler.all_expired() {
                std::thread::sleep(POLL_INTERVAL);
            }
            emit_list(options, &scheduler)?;
        }

        scheduler.close();
        Ok(())
    }
}

/// Split `NAME::COMMAND::DEADLINE`. The name may be empty (the scheduler
/// substitutes its default label); the command is taken verbatim.
fn parse_task_spec(raw: &str) -> Result<(String, String, DeadlineSpec)> {
    let parts: Vec<&str> = raw.splitn(3, "::").collect();
    if parts.len() != 3 {
        return Err(Error::InvalidArgument(format!(
            "expected NAME::COMMAND::DEADLINE, got '{raw}'"
        )));
    }
    let spec = DeadlineSpec::parse(parts[2])?;
    Ok((parts[0].to_string(), parts[1].to_string(), spec))
}

fn watch_observer(options: OutputOptions) -> TickObserver {
    Arc::new(move |rows| {
        if options.json {
            if let Ok(line) = serde_json::to_string(&rows) {
                println!("{line}");
            }
        } else if !options.quiet {
            println!("{}", output::format_rows(&rows));
        }
    })
}

fn emit_added(options: OutputOptions, id: &TaskId) -> Result<()> {
    output::emit_success(
        options,
        "add",
        &AddedTask { id },
        &format!("task {id} scheduled"),
    )
}

fn emit_list(options: OutputOptions, scheduler: &Scheduler) -> Result<()> {
    let rows = scheduler.list_tasks();
    if options.json {
        return output::emit_success(options, "list", &rows, "");
    }
    if !options.quiet {
        println!("{}", output::format_rows(&rows));
    }
    Ok(())
}

/// Interactive loop. Every failed command is reported and the loop keeps
/// going; only `quit` or end of input stops it.
fn repl(scheduler: &Scheduler, options: OutputOptions) -> Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match dispatch(scheduler, line.trim(), options) {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => {
                output::emit_error("interactive", &err, options.json)?;
            }
        }
    }
    Ok(())
}

/// Handle one interactive command. Returns `true` on `quit`.
fn dispatch(scheduler: &Scheduler, line: &str, options: OutputOptions) -> Result<bool> {
    if line.is_empty() {
        return Ok(false);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "quit" | "exit" => return Ok(true),
        "list" => emit_list(options, scheduler)?,
        "now" => {
            let suggestion = scheduler.suggest_absolute_deadline();
            output::emit_success(
                options,
                "now",
                &serde_json::json!({ "absolute": suggestion }),
                &suggestion,
            )?;
        }
        "add" => {
            let (name, command, spec) = parse_task_spec(rest)?;
            let id = scheduler.add_task(&name, &command, &spec)?;
            emit_added(options, &id)?;
        }
        "edit" => {
            let (id_raw, spec_raw) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                Error::InvalidArgument(
                    "usage: edit <id> NAME::COMMAND::DEADLINE".to_string(),
                )
            })?;
            let id = TaskId::from(id_raw);
            let (name, command, spec) = parse_task_spec(spec_raw.trim())?;
            scheduler.edit_task(&id, &name, &command, &spec)?;
            output::emit_success(
                options,
                "edit",
                &AddedTask { id: &id },
                &format!("task {id} rescheduled"),
            )?;
        }
        "del" => {
            if rest.is_empty() {
                return Err(Error::InvalidArgument("usage: del <id>".to_string()));
            }
            let id = TaskId::from(rest);
            scheduler.delete_task(&id)?;
            output::emit_success(
                options,
                "del",
                &AddedTask { id: &id },
                &format!("task {id} deleted"),
            )?;
        }
        other => {
            return Err(Error::InvalidArgument(format!(
                "unknown command '{other}' (expected add, edit, del, list, now, quit)"
            )));
        }
    }

    Ok(false)
}
