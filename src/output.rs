//! Shared output formatting for the sked CLI.

use serde::Serialize;

use crate::error::{JsonError, Result};
use crate::task::TaskRow;

pub const SCHEMA_VERSION: &str = "sked.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Emit a success payload: a JSON envelope in `--json` mode, otherwise the
/// given human text (unless quiet).
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: &str,
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
        };
        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    if !options.quiet && !human.is_empty() {
        println!("{human}");
    }
    Ok(())
}

/// Emit an error, matching the success envelope shape in `--json` mode.
pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: JsonError,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
        };
        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    Ok(())
}

/// Render task rows as an aligned table (name, command, eta, deadline,
/// status), one task per line.
pub fn format_rows(rows: &[TaskRow]) -> String {
    if rows.is_empty() {
        return "no tasks".to_string();
    }

    let mut widths = [4usize, 7, 3, 8]; // NAME, COMMAND, ETA, DEADLINE
    for row in rows {
        widths[0] = widths[0].max(row.name.len());
        widths[1] = widths[1].max(row.command.len());
        widths[2] = widths[2].max(row.countdown.len());
        widths[3] = widths[3].max(row.deadline.len());
    }

    let mut out = format!(
        "{:w0$}  {:w1$}  {:>w2$}  {:>w3$}  {}  {}",
        "NAME",
        "COMMAND",
        "ETA",
        "DEADLINE",
        "STATUS",
        "ID",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    );
    for row in rows {
        out.push('\n');
        out.push_str(&format!(
            "{:w0$}  {:w1$}  {:>w2$}  {:>w3$}  {}  {}",
            row.name,
            row.command,
            row.countdown,
            row.deadline,
            row.status,
            row.id,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        ));
    }
    out
}
