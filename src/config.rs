//! Run-time configuration shared by every test case of a run

use crate::test_case::Properties;
use std::collections::BTreeMap;

/// Variables of every configured test suite, indexed by suite name
pub type TestSuitesMap = BTreeMap<String, Properties>;

/// Run-time configuration for a test run
///
/// A single `Config` is built before a run starts and handed by reference to
/// every test case.  Test cases must treat it as read-only, and some
/// strategies compare the reference they receive against the instance they
/// expect, so callers must not clone it on the way down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    architecture: String,
    platform: String,
    unprivileged_user: Option<String>,
    test_suites: TestSuitesMap,
}

impl Config {
    /// Create a new configuration for the given machine
    pub fn new(architecture: impl Into<String>, platform: impl Into<String>) -> Self {
        Config {
            architecture: architecture.into(),
            platform: platform.into(),
            unprivileged_user: None,
            test_suites: TestSuitesMap::new(),
        }
    }

    /// Create a configuration describing the host this crate was built for
    pub fn with_host_defaults() -> Self {
        Self::new(std::env::consts::ARCH, std::env::consts::OS)
    }

    /// Set the user to drop privileges to when a test requires it
    pub fn unprivileged_user(mut self, user: impl Into<String>) -> Self {
        self.unprivileged_user = Some(user.into());
        self
    }

    /// Set a variable for a specific test suite
    pub fn test_suite_var(
        mut self,
        suite: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.test_suites
            .entry(suite.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    /// Replace all test suite variables at once
    pub fn test_suites_map(mut self, test_suites: TestSuitesMap) -> Self {
        self.test_suites = test_suites;
        self
    }

    /// Name of the machine architecture
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Name of the machine platform
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Unprivileged user, if configured
    pub fn get_unprivileged_user(&self) -> Option<&str> {
        self.unprivileged_user.as_deref()
    }

    /// Variables of all test suites
    pub fn test_suites(&self) -> &TestSuitesMap {
        &self.test_suites
    }

    /// Variables of a single test suite
    pub fn test_suite(&self, name: &str) -> Option<&Properties> {
        self.test_suites.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::new("mock-architecture", "mock-platform")
            .unprivileged_user("nobody")
            .test_suite_var("suite1", "a", "1")
            .test_suite_var("suite1", "b", "2")
            .test_suite_var("suite2", "a", "3");

        assert_eq!("mock-architecture", config.architecture());
        assert_eq!("mock-platform", config.platform());
        assert_eq!(Some("nobody"), config.get_unprivileged_user());
        assert_eq!(2, config.test_suites().len());

        let suite1 = config.test_suite("suite1").unwrap();
        assert_eq!(Some(&"1".to_string()), suite1.get("a"));
        assert_eq!(Some(&"2".to_string()), suite1.get("b"));
        assert!(config.test_suite("missing").is_none());
    }

    #[test]
    fn test_host_defaults() {
        let config = Config::with_host_defaults();
        assert_eq!(std::env::consts::ARCH, config.architecture());
        assert_eq!(std::env::consts::OS, config.platform());
        assert!(config.get_unprivileged_user().is_none());
        assert!(config.test_suites().is_empty());
    }
}
