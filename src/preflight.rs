//! Preconditions checked before the printer is touched.

use std::ffi::OsString;

use crate::error::CaptureError;

/// Set by sshd for every remote login.
pub const REMOTE_SESSION_ENV: &str = "SSH_CLIENT";

/// Subcommand that only inspects the machine and may run remotely.
const REMOTE_SAFE_COMMAND: &str = "list-cameras";

/// Whether the raw command line (program name first) asks for a run that
/// is allowed from a remote shell.
pub fn allowed_remotely(args: &[OsString]) -> bool {
    args.iter().skip(1).any(|arg| arg == REMOTE_SAFE_COMMAND)
}

/// Refuse to run from a remote shell.
///
/// `lookup` reads an environment variable; the process environment in
/// production, a closure in tests. An empty value counts as unset.
pub fn ensure_local_session<F>(lookup: F) -> Result<(), CaptureError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(REMOTE_SESSION_ENV) {
        Some(value) if !value.is_empty() => {
            log::debug!("{}={}", REMOTE_SESSION_ENV, value);
            Err(CaptureError::RemoteSession)
        }
        _ => Ok(()),
    }
}
