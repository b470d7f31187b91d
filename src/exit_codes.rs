//! Exit code constants for the cowork CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config or rule file)
//! - 2: Execution failure (agent exited non-zero, timed out, or could not start)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable config, or an invalid routing rule file.
pub const USER_ERROR: i32 = 1;

/// The delegated agent run did not succeed.
pub const EXECUTION_FAILURE: i32 = 2;
