//! Stack traces of test programs that crash and dump core
//!
//! When a test program dies because of a signal and leaves a core file
//! behind, GDB is run on the core and its backtrace is appended to the
//! program's stderr, so that it reaches whoever reads the test output.

use crate::process;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use std::time::Duration;

/// GDB binary to use: looked up in `PATH` unless absolute
pub const BUILTIN_GDB: &str = "gdb";

/// Time GDB may take to produce a backtrace
pub const GDB_TIMEOUT: Duration = Duration::from_secs(60);

/// Whether the process died of a signal and dumped core
pub fn crashed_with_core(status: ExitStatus) -> bool {
    status.signal().is_some() && status.core_dumped()
}

/// Look for an executable called `name` in the directories of `search_path`
pub fn find_in_path(name: &Path, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| {
            fs::metadata(candidate)
                .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        })
}

/// Locate the GDB binary named by `builtin`
pub fn find_gdb(builtin: &Path) -> Option<PathBuf> {
    if builtin.as_os_str().is_empty() {
        tracing::warn!("the path to GDB is empty; cannot gather stack traces");
        return None;
    }
    if builtin.is_absolute() {
        return builtin.exists().then(|| builtin.to_path_buf());
    }
    std::env::var_os("PATH").and_then(|path| find_in_path(builtin, &path))
}

/// Find the core file left by `program`, which ran as `pid` inside `work_dir`
pub fn find_core(program: &Path, pid: u32, work_dir: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(name) = program.file_name() {
        let mut core_name = name.to_os_string();
        core_name.push(".core");
        candidates.push(work_dir.join(&core_name));
        if program.is_absolute() {
            if let Some(parent) = program.parent() {
                candidates.push(parent.join(&core_name));
            }
        }
    }
    candidates.push(work_dir.join("core"));
    candidates.push(work_dir.join(format!("core.{}", pid)));
    candidates.push(Path::new("/cores").join(format!("core.{}", pid)));

    let found = candidates.into_iter().find(|c| c.exists());
    tracing::debug!(?found, "looked for core file");
    found
}

/// Raise the soft core size limit of the spawned process to its hard limit
pub fn unlimit_core_size(command: &mut StdCommand) -> &mut StdCommand {
    // Only async-signal-safe calls happen between fork and exec.  Failures
    // are ignored: the test still runs, just without a core.
    unsafe {
        command.pre_exec(|| {
            let mut rl = libc::rlimit {
                rlim_cur: 0,
                rlim_max: 0,
            };
            if libc::getrlimit(libc::RLIMIT_CORE, &mut rl) == 0 && rl.rlim_max != 0 {
                rl.rlim_cur = rl.rlim_max;
                libc::setrlimit(libc::RLIMIT_CORE, &rl);
            }
            Ok(())
        })
    }
}

/// Write a backtrace of the crashed `program` to `output`.
///
/// Explanations are written instead when GDB or the core file are missing.
pub fn dump_stacktrace(
    gdb: &Path,
    program: &Path,
    pid: u32,
    status: ExitStatus,
    work_dir: &Path,
    output: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        output,
        "Process with PID {} exited with signal {} and dumped core; attempting to gather stack trace",
        pid,
        status.signal().unwrap_or(0)
    )?;

    let Some(gdb_path) = find_gdb(gdb) else {
        return writeln!(output, "Cannot find GDB binary; builtin was '{}'", gdb.display());
    };
    let Some(core) = find_core(program, pid, work_dir) else {
        return writeln!(output, "Cannot find any core file");
    };

    let gdb_out = work_dir.join("gdb.out");
    let gdb_err = work_dir.join("gdb.err");
    let mut command = StdCommand::new(&gdb_path);
    command
        .args(["-batch", "-q", "-ex", "backtrace"])
        .arg(program)
        .arg(&core)
        .current_dir(work_dir)
        .env_remove("TERM")
        .stdin(Stdio::null())
        .stdout(File::create(&gdb_out)?)
        .stderr(File::create(&gdb_err)?);
    let mut child = process::isolate(&mut command).spawn()?;

    let status = match process::wait_until(&mut child, process::deadline_after(GDB_TIMEOUT)) {
        Ok(status) => status,
        Err(e) => {
            process::terminate(&mut child);
            return Err(e);
        }
    };
    if status.is_none() {
        process::terminate(&mut child);
    }

    dump_file_into(&gdb_out, output, "gdb stdout: ")?;
    dump_file_into(&gdb_err, output, "gdb stderr: ")?;
    match status {
        Some(s) if s.success() => writeln!(output, "GDB exited successfully"),
        Some(_) => writeln!(output, "GDB failed; see output above for details"),
        None => writeln!(output, "GDB timed out after {:?}", GDB_TIMEOUT),
    }
}

/// Append a backtrace to `output_file` if `status` says the process dumped
/// core
pub fn dump_stacktrace_if_available(
    program: &Path,
    pid: u32,
    status: ExitStatus,
    work_dir: &Path,
    output_file: &Path,
) -> io::Result<()> {
    if !crashed_with_core(status) {
        return Ok(());
    }
    let mut output = OpenOptions::new().append(true).create(true).open(output_file)?;
    dump_stacktrace(
        Path::new(BUILTIN_GDB),
        program,
        pid,
        status,
        work_dir,
        &mut output,
    )
}

fn dump_file_into(file: &Path, output: &mut impl Write, prefix: &str) -> io::Result<()> {
    match File::open(file) {
        Ok(input) => {
            for line in BufReader::new(input).lines() {
                writeln!(output, "{}{}", prefix, line?)?;
            }
            Ok(())
        }
        Err(_) => writeln!(output, "Failed to open {}", file.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Status of a process killed by SIGSEGV that dumped core
    fn segv_with_core() -> ExitStatus {
        ExitStatus::from_raw(libc::SIGSEGV | 0x80)
    }

    fn write_executable(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    fn test_crashed_with_core() {
        assert!(crashed_with_core(segv_with_core()));
        assert!(!crashed_with_core(ExitStatus::from_raw(libc::SIGSEGV)));
        assert!(!crashed_with_core(ExitStatus::from_raw(0)));
    }

    #[test]
    fn test_find_in_path() {
        let dir1 = TempDir::new().unwrap();
        let dir2 = TempDir::new().unwrap();
        write_executable(&dir2.path().join("my-gdb"), "exit 0");
        fs::write(dir1.path().join("my-gdb"), "not executable").unwrap();

        let search = std::env::join_paths([dir1.path(), dir2.path()]).unwrap();
        assert_eq!(
            Some(dir2.path().join("my-gdb")),
            find_in_path(Path::new("my-gdb"), &search)
        );
        assert_eq!(None, find_in_path(Path::new("other"), &search));
    }

    #[test]
    fn test_find_gdb_absolute() {
        let dir = TempDir::new().unwrap();
        let gdb = dir.path().join("gdb");
        assert_eq!(None, find_gdb(&gdb));
        write_executable(&gdb, "exit 0");
        assert_eq!(Some(gdb.clone()), find_gdb(&gdb));
        assert_eq!(None, find_gdb(Path::new("")));
    }

    #[test]
    fn test_find_core_candidates() {
        let work_dir = TempDir::new().unwrap();
        let program = Path::new("/nonexistent/dir/my-test");
        assert_eq!(None, find_core(program, 1234, work_dir.path()));

        fs::write(work_dir.path().join("core.1234"), "").unwrap();
        assert_eq!(
            Some(work_dir.path().join("core.1234")),
            find_core(program, 1234, work_dir.path())
        );

        fs::write(work_dir.path().join("my-test.core"), "").unwrap();
        assert_eq!(
            Some(work_dir.path().join("my-test.core")),
            find_core(program, 1234, work_dir.path())
        );
    }

    #[test]
    fn test_dump_stacktrace_runs_gdb() {
        let work_dir = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let gdb = tools.path().join("fake-gdb");
        write_executable(&gdb, "printf '%s\\n' \"$*\"\necho 'no symbols' >&2");
        let core = work_dir.path().join("core");
        fs::write(&core, "").unwrap();

        let mut output = Vec::new();
        dump_stacktrace(
            &gdb,
            Path::new("/bin/my-test"),
            42,
            segv_with_core(),
            work_dir.path(),
            &mut output,
        )
        .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("PID 42 exited with signal 11 and dumped core"));
        assert!(text.contains(&format!(
            "gdb stdout: -batch -q -ex backtrace /bin/my-test {}",
            core.display()
        )));
        assert!(text.contains("gdb stderr: no symbols"));
        assert!(text.ends_with("GDB exited successfully\n"));
    }

    #[test]
    fn test_dump_stacktrace_reports_gdb_failure() {
        let work_dir = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let gdb = tools.path().join("fake-gdb");
        write_executable(&gdb, "exit 1");
        fs::write(work_dir.path().join("core"), "").unwrap();

        let mut output = Vec::new();
        dump_stacktrace(&gdb, Path::new("prog"), 1, segv_with_core(), work_dir.path(), &mut output)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("GDB failed; see output above for details\n"));
    }

    #[test]
    fn test_dump_stacktrace_without_gdb_or_core() {
        let work_dir = TempDir::new().unwrap();

        let mut output = Vec::new();
        let missing = work_dir.path().join("no-gdb-here");
        dump_stacktrace(&missing, Path::new("prog"), 1, segv_with_core(), work_dir.path(), &mut output)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(&format!("Cannot find GDB binary; builtin was '{}'", missing.display())));

        let tools = TempDir::new().unwrap();
        let gdb = tools.path().join("fake-gdb");
        write_executable(&gdb, "exit 0");
        let mut output = Vec::new();
        dump_stacktrace(&gdb, Path::new("prog"), 1, segv_with_core(), work_dir.path(), &mut output)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("Cannot find any core file\n"));
    }

    #[test]
    fn test_dump_stacktrace_if_available_ignores_clean_exit() {
        let work_dir = TempDir::new().unwrap();
        let stderr = work_dir.path().join("stderr.txt");
        fs::write(&stderr, "original\n").unwrap();

        dump_stacktrace_if_available(
            Path::new("prog"),
            1,
            ExitStatus::from_raw(libc::SIGKILL),
            work_dir.path(),
            &stderr,
        )
        .unwrap();
        assert_eq!("original\n", fs::read_to_string(&stderr).unwrap());
    }
}
