//! Test programs implementing the plain interface
//!
//! A plain test program is a binary that contains exactly one test case.  It
//! passes if it exits with status 0 and fails with any other exit status.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hooks::TestCaseHooks;
use crate::process;
use crate::result::TestResult;
#[cfg(unix)]
use crate::stacktrace;
use crate::test_case::{Properties, PropertiesCache, TestCase};
use crate::test_program::{TestCases, TestProgram};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use std::time::Duration;

/// Name of the plain test interface
pub const INTERFACE_NAME: &str = "plain";

/// Name of the only test case of a plain test program
pub const TEST_CASE_NAME: &str = "main";

/// Time a plain test case may run before it is killed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A test program that implements the plain interface
#[derive(Debug, Clone)]
pub struct PlainTestProgram {
    binary: PathBuf,
    root: PathBuf,
    test_suite_name: String,
    timeout: Duration,
}

impl PlainTestProgram {
    /// Create a new plain test program
    pub fn new(
        binary: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        test_suite_name: impl Into<String>,
    ) -> Self {
        PlainTestProgram {
            binary: binary.into(),
            root: root.into(),
            test_suite_name: test_suite_name.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set how long the test case may run before it is killed
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long the test case may run before it is killed
    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }
}

impl TestProgram for PlainTestProgram {
    fn binary(&self) -> &Path {
        &self.binary
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn test_suite_name(&self) -> &str {
        &self.test_suite_name
    }

    fn load_test_cases(&self) -> Result<TestCases<'_>> {
        let path = self.absolute_path();
        let metadata = fs::metadata(&path)
            .map_err(|e| Error::discovery(&path, format!("Cannot stat test program: {}", e)))?;
        if !metadata.is_file() {
            return Err(Error::discovery(&path, "Test program is not a regular file"));
        }

        let test_case: Box<dyn TestCase + '_> = Box::new(PlainTestCase::new(self));
        Ok(vec![test_case])
    }
}

/// The single test case of a [`PlainTestProgram`]
#[derive(Debug)]
pub struct PlainTestCase<'a> {
    program: &'a PlainTestProgram,
    properties: PropertiesCache,
}

impl<'a> PlainTestCase<'a> {
    /// Create the test case of `program`
    pub fn new(program: &'a PlainTestProgram) -> Self {
        PlainTestCase {
            program,
            properties: PropertiesCache::new(),
        }
    }

    /// Spawn the binary inside `work_dir` and wait for it to finish
    fn run_binary(&self, work_dir: &Path, stdout_path: &Path, stderr_path: &Path) -> Result<TestResult> {
        let binary = std::path::absolute(self.program.absolute_path())?;
        let stdout = File::create(stdout_path)?;
        let stderr = File::create(stderr_path)?;

        let mut command = StdCommand::new(&binary);
        command
            .current_dir(work_dir)
            .env("HOME", work_dir)
            .env("TMPDIR", work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        process::isolate(&mut command);
        #[cfg(unix)]
        stacktrace::unlimit_core_size(&mut command);

        let mut child = command.spawn()?;
        tracing::debug!(binary = %binary.display(), pid = child.id(), "spawned test program");

        let timeout = self.program.timeout;
        let status = match process::wait_until(&mut child, process::deadline_after(timeout)) {
            Ok(Some(status)) => status,
            Ok(None) => {
                process::terminate(&mut child);
                tracing::warn!(?timeout, "test program timed out");
                return Ok(TestResult::broken(format!(
                    "Test case timed out after {:?}",
                    timeout
                )));
            }
            Err(e) => {
                process::terminate(&mut child);
                return Err(e.into());
            }
        };

        #[cfg(unix)]
        {
            let pid = child.id();
            if let Err(e) =
                stacktrace::dump_stacktrace_if_available(&binary, pid, status, work_dir, stderr_path)
            {
                tracing::warn!(error = %e, "cannot gather stack trace");
            }
        }

        Ok(classify_exit(status))
    }
}

/// Map the exit status of a plain test program to a result
fn classify_exit(status: ExitStatus) -> TestResult {
    if let Some(code) = status.code() {
        return if code == 0 {
            TestResult::passed()
        } else {
            TestResult::failed(format!("Returned non-success exit status {}", code))
        };
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return TestResult::broken(format!("Received signal {}", signal));
        }
    }

    TestResult::broken(format!("Terminated abnormally: {}", status))
}

impl TestCase for PlainTestCase<'_> {
    fn interface_name(&self) -> &str {
        INTERFACE_NAME
    }

    fn test_program(&self) -> &dyn TestProgram {
        self.program
    }

    fn name(&self) -> &str {
        TEST_CASE_NAME
    }

    fn get_all_properties(&self) -> Properties {
        self.properties.get_or_init(|| {
            let mut properties = Properties::new();
            properties.insert(
                "timeout".to_string(),
                self.program.timeout.as_secs_f64().to_string(),
            );
            properties
        })
    }

    fn execute(
        &self,
        config: &Config,
        hooks: &mut dyn TestCaseHooks,
        stdout_path: Option<&Path>,
        stderr_path: Option<&Path>,
    ) -> TestResult {
        tracing::debug!(
            architecture = config.architecture(),
            platform = config.platform(),
            "executing plain test case"
        );

        let work_dir = match tempfile::Builder::new()
            .prefix("testcase-engine.")
            .tempdir()
        {
            Ok(dir) => dir,
            Err(e) => {
                return TestResult::broken(format!("Failed to create work directory: {}", e))
            }
        };

        let stdout_path = stdout_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| work_dir.path().join("stdout.txt"));
        let stderr_path = stderr_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| work_dir.path().join("stderr.txt"));

        let result = self
            .run_binary(work_dir.path(), &stdout_path, &stderr_path)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "cannot run test program");
                TestResult::broken(format!("Failed to execute test program: {}", e))
            });

        // Report before the work directory, and possibly the files, go away.
        if stdout_path.exists() {
            hooks.got_stdout(&stdout_path);
        }
        if stderr_path.exists() {
            hooks.got_stderr(&stderr_path);
        }
        drop(work_dir);

        result
    }
}
