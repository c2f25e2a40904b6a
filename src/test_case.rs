//! Test cases and the protocol to run them

use crate::config::Config;
use crate::hooks::TestCaseHooks;
use crate::result::TestResult;
use crate::test_program::TestProgram;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Metadata property name to value mapping
pub type Properties = BTreeMap<String, String>;

/// A single test case of a test program.
///
/// This is the customization point for test interfaces: each one provides
/// its own way of describing and executing a test case.  Callers do not use
/// [`execute`](TestCase::execute) directly; they go through
/// [`TestCaseExt::run`], which is implemented for every test case.
pub trait TestCase {
    /// Name of the test interface this test case implements
    fn interface_name(&self) -> &str;

    /// The program this test case belongs to
    fn test_program(&self) -> &dyn TestProgram;

    /// Name of the test case, unique within its test program
    fn name(&self) -> &str;

    /// Compute all metadata properties of the test case.
    ///
    /// Property names are free form and depend on the test interface.  The
    /// returned mapping must be the same on every call.
    fn get_all_properties(&self) -> Properties;

    /// Execute the test case.
    ///
    /// `stdout_path` and `stderr_path` are suggested files for the output of
    /// the test; an implementation may pick its own locations when they are
    /// `None`.  Wherever the output ends up, it must be reported through
    /// `hooks`, whatever the outcome of the test.
    ///
    /// `config` is the exact instance given to [`TestCaseExt::run`].
    ///
    /// Problems running the test are reported as a broken or failed result,
    /// not by panicking.
    fn execute(
        &self,
        config: &Config,
        hooks: &mut dyn TestCaseHooks,
        stdout_path: Option<&Path>,
        stderr_path: Option<&Path>,
    ) -> TestResult;
}

/// Operations available on every test case.
///
/// Implemented for all [`TestCase`]s, including trait objects, and cannot be
/// overridden.
pub trait TestCaseExt: TestCase {
    /// All metadata properties of the test case
    fn all_properties(&self) -> Properties {
        self.get_all_properties()
    }

    /// Run the test case and return its result.
    ///
    /// The test case chooses where its output goes and reports the chosen
    /// locations through `hooks`.
    fn run(&self, config: &Config, hooks: &mut dyn TestCaseHooks) -> TestResult {
        let _span = tracing::debug_span!(
            "run",
            program = %self.test_program().binary().display(),
            test_case = self.name()
        )
        .entered();

        let result = self.execute(config, hooks, None, None);
        tracing::debug!(%result, "test case completed");
        result
    }

    /// Run the test case with its output sent to the given files.
    ///
    /// Meant for interactive debugging, where something like `/dev/stdout`
    /// and `/dev/stderr` are sensible targets.  Use [`run`](TestCaseExt::run)
    /// for normal execution.
    fn debug(
        &self,
        config: &Config,
        hooks: &mut dyn TestCaseHooks,
        stdout_path: &Path,
        stderr_path: &Path,
    ) -> TestResult {
        let _span = tracing::debug_span!(
            "debug",
            program = %self.test_program().binary().display(),
            test_case = self.name()
        )
        .entered();

        let result = self.execute(config, hooks, Some(stdout_path), Some(stderr_path));
        tracing::debug!(%result, "test case completed");
        result
    }
}

impl<T: TestCase + ?Sized> TestCaseExt for T {}

/// Memoizes the properties of a test case after their first computation.
///
/// Safe to use from several threads: concurrent first accesses compute the
/// value only once.
#[derive(Debug, Default)]
pub struct PropertiesCache(OnceLock<Properties>);

impl PropertiesCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached properties, computing them with `init` if needed
    pub fn get_or_init(&self, init: impl FnOnce() -> Properties) -> Properties {
        self.0.get_or_init(init).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_properties_cache_computes_once() {
        let cache = PropertiesCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            let mut properties = Properties::new();
            properties.insert("timeout".to_string(), "300".to_string());
            properties
        };

        let first = cache.get_or_init(compute);
        let second = cache.get_or_init(compute);
        assert_eq!(first, second);
        assert_eq!(Some(&"300".to_string()), first.get("timeout"));
        assert_eq!(1, calls.get());
    }
}
