//! Outcome of a single test case execution

use std::fmt;

/// Classification of a test case outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// The test case ran and all its checks succeeded
    Passed,
    /// The test case ran and at least one check did not hold
    Failed,
    /// The test case decided not to run
    Skipped,
    /// The test case could not be run, or its outcome could not be determined
    Broken,
    /// The test case failed in a way it declared in advance
    ExpectedFailure,
}

impl ResultType {
    /// Canonical lowercase name of the result type
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Passed => "passed",
            ResultType::Failed => "failed",
            ResultType::Skipped => "skipped",
            ResultType::Broken => "broken",
            ResultType::ExpectedFailure => "expected_failure",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a test case: a type plus an optional reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    result_type: ResultType,
    reason: Option<String>,
}

impl TestResult {
    /// Create a new result
    pub fn new(result_type: ResultType, reason: impl Into<String>) -> Self {
        TestResult {
            result_type,
            reason: Some(reason.into()),
        }
    }

    /// Create a result that carries no reason
    pub fn without_reason(result_type: ResultType) -> Self {
        TestResult {
            result_type,
            reason: None,
        }
    }

    /// A passed result
    pub fn passed() -> Self {
        Self::without_reason(ResultType::Passed)
    }

    /// A failed result
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::new(ResultType::Failed, reason)
    }

    /// A skipped result
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::new(ResultType::Skipped, reason)
    }

    /// A broken result
    pub fn broken(reason: impl Into<String>) -> Self {
        Self::new(ResultType::Broken, reason)
    }

    /// An expected failure
    pub fn expected_failure(reason: impl Into<String>) -> Self {
        Self::new(ResultType::ExpectedFailure, reason)
    }

    /// Classification of the outcome
    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    /// Explanation of the outcome, if any
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Whether the result should count as a success of the run.
    ///
    /// Skipped tests and expected failures do not make a run fail.
    pub fn good(&self) -> bool {
        matches!(
            self.result_type,
            ResultType::Passed | ResultType::Skipped | ResultType::ExpectedFailure
        )
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", self.result_type, reason),
            None => write!(f, "{}", self.result_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(ResultType::Passed, TestResult::passed().result_type());
        assert_eq!(None, TestResult::passed().reason());

        let result = TestResult::broken("Crashed");
        assert_eq!(ResultType::Broken, result.result_type());
        assert_eq!(Some("Crashed"), result.reason());
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(
            TestResult::new(ResultType::Skipped, "A test result"),
            TestResult::skipped("A test result")
        );
        assert_ne!(TestResult::skipped("a"), TestResult::skipped("b"));
        assert_ne!(TestResult::skipped("a"), TestResult::failed("a"));
        assert_ne!(
            TestResult::without_reason(ResultType::Failed),
            TestResult::failed("")
        );
    }

    #[test]
    fn test_good() {
        assert!(TestResult::passed().good());
        assert!(TestResult::skipped("no network").good());
        assert!(TestResult::expected_failure("known bug").good());
        assert!(!TestResult::failed("assertion").good());
        assert!(!TestResult::broken("crashed").good());
    }

    #[test]
    fn test_display() {
        assert_eq!("passed", TestResult::passed().to_string());
        assert_eq!(
            "expected_failure: known bug",
            TestResult::expected_failure("known bug").to_string()
        );
        assert_eq!("broken: Received signal 9", TestResult::broken("Received signal 9").to_string());
    }
}
