//! Implementation of the `cowork run` command.

use crate::cli::RunArgs;
use cowork_bridge::bridge::{CommandRunner, ExecuteOptions, ExecutionBridge};
use cowork_bridge::error::Result;

/// Execute one prompt and print the agent's response.
///
/// A failed run is returned as `CoworkError::ExecutionFailed` so the process
/// exits with the execution-failure code.
pub fn cmd_run<R: CommandRunner>(bridge: &ExecutionBridge<R>, args: RunArgs) -> Result<()> {
    let prompt = args.prompt.join(" ");
    let options = ExecuteOptions {
        new_session: true,
        working_dir: args.cwd,
        allowed_tools: (!args.tools.is_empty()).then_some(args.tools),
        system_prompt: args.system_prompt,
        timeout_seconds: args.timeout,
    };

    let result = if args.safe {
        bridge.execute_restricted(&prompt, &args.user, &options)
    } else {
        bridge.execute(&prompt, &args.user, &options)
    };

    let response = result.into_result()?;
    println!("{}", response);
    Ok(())
}
