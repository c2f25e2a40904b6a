//! Snapshots of the environment a test run executes under

use crate::error::Result;
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable name to value mapping, kept as raw OS strings
pub type EnvMap = BTreeMap<OsString, OsString>;

/// Working directory and environment variables captured at a point in time.
///
/// A `Context` is meant to be stored next to the results of a run so that a
/// later run can tell whether the environment has drifted.  Equality is
/// structural over both fields.  Variables are kept exactly as the OS reports
/// them, so values that are not valid Unicode still compare byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    cwd: PathBuf,
    env: EnvMap,
}

impl Context {
    /// Create a context from explicit values
    pub fn new<K, V>(cwd: impl Into<PathBuf>, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Context {
            cwd: cwd.into(),
            env: env.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Capture the working directory and environment of this process.
    ///
    /// # Panics
    ///
    /// Panics if the working directory cannot be queried.  The engine cannot
    /// do anything meaningful without it.
    pub fn current() -> Self {
        Self::try_current()
            .unwrap_or_else(|e| panic!("cannot capture the current context: {}", e))
    }

    /// Capture the working directory and environment of this process, without
    /// panicking.
    pub fn try_current() -> Result<Self> {
        let cwd = env::current_dir()?;
        let env = env::vars_os().collect();
        Ok(Context { cwd, env })
    }

    /// The captured working directory
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The captured environment variables
    pub fn env(&self) -> &EnvMap {
        &self.env
    }
}
