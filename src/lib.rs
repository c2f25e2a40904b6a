//! # testcase-engine
//!
//! The execution core of a test runner.
//!
//! This crate defines how a test case is identified, how it is run while its
//! output is observed, how its outcome is classified, and how the environment
//! of a run is captured so later runs can detect drift:
//!
//! - [`TestProgram`] and [`TestCase`] describe what to run.  Test interfaces
//!   implement these traits; [`plain`] is the interface for binaries that
//!   signal success through their exit status.
//! - [`TestCaseExt::run`] executes a test case against a shared [`Config`]
//!   and reports output locations through [`TestCaseHooks`].
//! - [`TestResult`] is the outcome of one execution.
//! - [`Context`] is a snapshot of the working directory and environment.
//!
//! # Examples
//!
//! ```no_run
//! use testcase_engine::plain::PlainTestProgram;
//! use testcase_engine::{Config, OutputCapture, TestCaseExt, TestProgram};
//!
//! let config = Config::with_host_defaults();
//! let program = PlainTestProgram::new("integration_test", "tests", "my-suite");
//! for test_case in program.load_test_cases().unwrap() {
//!     let mut hooks = OutputCapture::new();
//!     let result = test_case.run(&config, &mut hooks);
//!     println!("{}: {}", test_case.name(), result);
//!     print!("{}", hooks.stdout_text());
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod plain;
pub mod process;
pub mod result;
#[cfg(unix)]
pub mod stacktrace;
pub mod test_case;
pub mod test_program;

pub use config::{Config, TestSuitesMap};
pub use context::{Context, EnvMap};
pub use error::{Error, Result};
pub use hooks::{CapturedFile, NoopHooks, OutputCapture, TestCaseHooks};
pub use result::{ResultType, TestResult};
pub use test_case::{Properties, PropertiesCache, TestCase, TestCaseExt};
pub use test_program::{TestCases, TestProgram};
