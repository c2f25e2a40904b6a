//! Test programs: the discoverable units that contain test cases

use crate::error::Result;
use crate::test_case::TestCase;
use std::path::{Path, PathBuf};

/// Ordered collection of the test cases of a program.
///
/// The cases borrow the program they were loaded from, so the program must
/// outlive them.
pub type TestCases<'a> = Vec<Box<dyn TestCase + 'a>>;

/// A test program, such as a compiled test binary.
///
/// The identity of a program (binary, root and suite name) is fixed at
/// construction.  How its test cases are found depends on the test interface
/// the program implements, so that is left to each implementation of
/// [`load_test_cases`](TestProgram::load_test_cases).
pub trait TestProgram {
    /// Path to the binary, relative to [`root`](TestProgram::root)
    fn binary(&self) -> &Path;

    /// Root directory of the test suite the program belongs to
    fn root(&self) -> &Path;

    /// Name of the test suite the program belongs to
    fn test_suite_name(&self) -> &str;

    /// Path to the binary, including the test suite root
    fn absolute_path(&self) -> PathBuf {
        self.root().join(self.binary())
    }

    /// Load the test cases of this program, in discovery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be inspected or its metadata is
    /// malformed.  A program that legitimately contains no test cases returns
    /// an empty list instead.
    ///
    /// Test case names are expected to be unique within the program; this is
    /// up to the implementation and is not checked by callers.
    fn load_test_cases(&self) -> Result<TestCases<'_>>;
}
