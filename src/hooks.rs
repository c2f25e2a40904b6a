//! Callbacks to observe where a test case left its output

use std::fs;
use std::path::{Path, PathBuf};

/// Hooks to introspect the execution of a test case.
///
/// Test cases report the location of their captured stdout and stderr
/// through these calls.  The files usually live inside a temporary work
/// directory that is removed as soon as `execute` returns, so an
/// implementation that needs the contents must read them inside the callback.
///
/// Every execution gets its own hooks object, which is why the methods take
/// `&mut self` and no synchronization is needed.
pub trait TestCaseHooks {
    /// Called once the test case's stdout is ready for processing
    fn got_stdout(&mut self, _file: &Path) {}

    /// Called once the test case's stderr is ready for processing
    fn got_stderr(&mut self, _file: &Path) {}
}

/// Hooks that ignore every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl TestCaseHooks for NoopHooks {}

/// A captured output stream: where it was written and what it contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFile {
    /// Location reported by the test case
    pub path: PathBuf,
    /// File contents read at notification time, `None` if unreadable
    pub contents: Option<String>,
}

impl CapturedFile {
    fn read(path: &Path) -> Self {
        let contents = match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read captured output");
                None
            }
        };
        CapturedFile {
            path: path.to_path_buf(),
            contents,
        }
    }
}

/// Hooks that copy the output files into memory as soon as they are reported
#[derive(Debug, Default, Clone)]
pub struct OutputCapture {
    /// Stdout of the test case, once reported
    pub stdout: Option<CapturedFile>,
    /// Stderr of the test case, once reported
    pub stderr: Option<CapturedFile>,
}

impl OutputCapture {
    /// Create hooks that have not captured anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured stdout contents, empty if none were reported
    pub fn stdout_text(&self) -> &str {
        self.stdout
            .as_ref()
            .and_then(|f| f.contents.as_deref())
            .unwrap_or("")
    }

    /// Captured stderr contents, empty if none were reported
    pub fn stderr_text(&self) -> &str {
        self.stderr
            .as_ref()
            .and_then(|f| f.contents.as_deref())
            .unwrap_or("")
    }
}

impl TestCaseHooks for OutputCapture {
    fn got_stdout(&mut self, file: &Path) {
        self.stdout = Some(CapturedFile::read(file));
    }

    fn got_stderr(&mut self, file: &Path) {
        self.stderr = Some(CapturedFile::read(file));
    }
}
