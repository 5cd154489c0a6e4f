//! Shared helper for running discovery commands.

use std::io;
use std::process::{Output, Stdio};

use tokio::process::Command;

use crate::error::{Error, Result};

/// Run `program` with `args` and capture its output.
///
/// A non-zero exit status is not an error here: `lsof` and friends use it to
/// mean "nothing found", so callers inspect the status themselves.
pub(crate) async fn run(program: &str, args: &[&str]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(Error::from)
}

/// Whether `err` means the program itself could not be found.
pub(crate) fn is_missing_tool(err: &Error) -> bool {
    matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::NotFound)
}
