//! Running external tools (sudo, mount, rsync) with inherited stdio

use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// Run `program` with `args`, streaming its output to ours
///
/// A non-zero exit status is an error.
pub fn run_command(program: &str, args: &[String]) -> Result<()> {
    debug!(program, ?args, "Running command");
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|err| Error::CommandSpawn {
            program: program.to_string(),
            err,
        })?;

    if !status.success() {
        return Err(Error::CommandFailed {
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}
