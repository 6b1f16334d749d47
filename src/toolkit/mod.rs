//! External tool invocation.
//!
//! The cryptographic work is delegated to an external X.509/RSA toolkit. This
//! module runs it as a subprocess: every invocation is spawned, its output
//! fully captured, and the child awaited before the next step begins. Success
//! is decided solely by the exit status.

pub mod openssl;

use crate::error::{CertiffixError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// One external command: a program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run.
    pub program: OsString,
    /// Arguments, in order.
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The value following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Everything written to standard output.
    pub stdout: Vec<u8>,
    /// Everything written to standard error.
    pub stderr: Vec<u8>,
}

/// Runs invocations to completion.
///
/// Implementations return `Ok` only for a zero exit status; anything else is
/// an [`CertiffixError::ExternalToolFailure`] carrying the captured stderr.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run `invocation` and wait for it to exit.
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Runs invocations as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl Runner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        debug!(" >>> {}", invocation);

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CertiffixError::ExternalToolFailure {
                command: invocation.to_string(),
                status: "failed to start".to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CertiffixError::ExternalToolFailure {
                command: invocation.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory stand-in for the external toolkit.

    use super::*;
    use std::fs;
    use std::sync::Mutex;

    /// Records invocations and writes a placeholder file at each `-out` path.
    #[derive(Default)]
    pub(crate) struct FakeRunner {
        pub(crate) calls: Mutex<Vec<Invocation>>,
        pub(crate) extfiles: Mutex<Vec<String>>,
        pub(crate) fail_on: Option<&'static str>,
    }

    impl FakeRunner {
        /// Fail the first invocation whose subcommand is `subcommand`.
        pub(crate) fn failing_on(subcommand: &'static str) -> Self {
            Self {
                fail_on: Some(subcommand),
                ..Self::default()
            }
        }

        /// The subcommands run so far, in order.
        pub(crate) fn subcommands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.args[0].to_string_lossy().into_owned())
                .collect()
        }
    }

    #[async_trait]
    impl Runner for FakeRunner {
        async fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
            self.calls.lock().unwrap().push(invocation.clone());

            if self.fail_on.is_some_and(|s| invocation.args[0] == s) {
                return Err(CertiffixError::ExternalToolFailure {
                    command: invocation.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "simulated failure".to_string(),
                });
            }

            if let Some(ext) = invocation.value_of("-extfile") {
                let contents = fs::read_to_string(ext).unwrap_or_default();
                self.extfiles.lock().unwrap().push(contents);
            }
            if let Some(out) = invocation.value_of("-out") {
                fs::write(out, "-----BEGIN FAKE-----\n")
                    .map_err(|e| CertiffixError::file_io(out, e))?;
            }

            Ok(ToolOutput::default())
        }
    }
}
