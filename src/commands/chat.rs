//! Implementation of the `cowork chat` command.
//!
//! Line-oriented loop: every line is a message from one user, so the agent
//! session carries over between lines until `/new`.

use super::route::format_decision;
use crate::cli::ChatArgs;
use cowork_bridge::bridge::{CommandRunner, ExecuteOptions, ExecutionBridge};
use cowork_bridge::dispatch::{Dispatcher, Reply};
use cowork_bridge::error::{CoworkError, Result};
use cowork_bridge::routing::Router;
use std::io::{BufRead, Write};

pub fn cmd_chat<R: CommandRunner>(
    router: Router,
    bridge: ExecutionBridge<R>,
    args: ChatArgs,
) -> Result<()> {
    let dispatcher = Dispatcher::new(router, bridge)
        .restricted(args.safe)
        .options(ExecuteOptions {
            working_dir: args.cwd,
            ..Default::default()
        });

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    chat_loop(&dispatcher, &args.user, args.route, stdin.lock(), stdout.lock())
}

fn chat_loop<R, I, O>(
    dispatcher: &Dispatcher<R>,
    user: &str,
    route: bool,
    input: I,
    mut output: O,
) -> Result<()>
where
    R: CommandRunner,
    I: BufRead,
    O: Write,
{
    for line in input.lines() {
        let line = line.map_err(io_error)?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        match message {
            "/quit" | "/exit" => break,
            "/new" => {
                let text = if dispatcher.bridge().clear_session(user) {
                    "Session cleared."
                } else {
                    "No active session."
                };
                writeln!(output, "{}", text).map_err(io_error)?;
            }
            "/sessions" => {
                let mut sessions: Vec<_> = dispatcher.bridge().list_sessions().into_iter().collect();
                sessions.sort_by(|a, b| a.0.cmp(&b.0));
                if sessions.is_empty() {
                    writeln!(output, "No active sessions.").map_err(io_error)?;
                }
                for (id, info) in sessions {
                    writeln!(
                        output,
                        "{}: {} ({} messages, last active {})",
                        id,
                        info.session_id,
                        info.message_count,
                        info.last_activity.to_rfc3339()
                    )
                    .map_err(io_error)?;
                }
            }
            _ => {
                let reply = if route {
                    match dispatcher.handle(message, user) {
                        Reply::Direct(decision) => {
                            format!("[direct] {}", format_decision(message, &decision))
                        }
                        Reply::Delegated { result, .. } => result.reply_text(),
                    }
                } else {
                    dispatcher.execute(message, user).reply_text()
                };
                writeln!(output, "{}", reply).map_err(io_error)?;
            }
        }
        output.flush().map_err(io_error)?;
    }
    Ok(())
}

fn io_error(e: std::io::Error) -> CoworkError {
    CoworkError::UserError(format!("I/O error: {}", e))
}
