//! Supervision of the child processes spawned on behalf of test cases

use std::io;
use std::process::{Child, Command as StdCommand, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Deadline `timeout` from now, or `None` when it is too far away to represent
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Put the command in a process group of its own so that it and everything
/// it forks can be killed together
pub fn isolate(command: &mut StdCommand) -> &mut StdCommand {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command
}

/// Wait for `child` to exit.
///
/// Returns `None` if `deadline` passes first; the child is left running.
pub fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill a child spawned with [`isolate`] together with its whole process
/// group, then reap it.
pub fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        // The group id equals the pid of its leader.
        let pgid = child.id() as libc::pid_t;
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    // The child may already be gone; only the reap matters.
    let _ = child.kill();
    if let Err(e) = child.wait() {
        tracing::warn!(pid = child.id(), error = %e, "cannot reap child process");
    }
}
