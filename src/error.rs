//! Error types for the certiffix library.
//!
//! This module defines all error types used throughout the library.
//! None of these errors are recovered internally: every workflow aborts on the
//! first failure and hands the error back to its caller.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The two pieces of CA material a leaf issuance depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaMaterial {
    /// The CA's public certificate (`*.ca.pem`).
    PublicCertificate,
    /// The CA's private signing key (`*.ca.key`).
    PrivateKey,
}

impl fmt::Display for CaMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaMaterial::PublicCertificate => write!(f, "public CA signing certificate"),
            CaMaterial::PrivateKey => write!(f, "private CA signing key"),
        }
    }
}

/// The main error type for certiffix operations.
#[derive(Error, Debug)]
pub enum CertiffixError {
    /// A value referenced by a template (or required by every request) is not set
    #[error("Required value '{0}' is missing")]
    MissingRequiredField(String),

    /// A CA root with the same identifier already exists
    #[error("CA root certificate '{}' already exists", .0.display())]
    DuplicateCa(PathBuf),

    /// The signing CA's certificate or key is missing
    #[error("{} '{}' not found", .0, .1.display())]
    CaNotFound(CaMaterial, PathBuf),

    /// Leaf issuance was requested but the CA store is empty
    #[error(
        "No CA root certificate available in '{}'. Generate one first with: certiffix --ca",
        .0.display()
    )]
    NoCaAvailable(PathBuf),

    /// The external cryptographic toolkit exited unsuccessfully
    #[error("Command '{command}' failed ({status}): {stderr}")]
    ExternalToolFailure {
        /// The full command line that was run.
        command: String,
        /// Exit status description (or the spawn error).
        status: String,
        /// Captured standard error output.
        stderr: String,
    },

    /// Reading or writing a temporary artifact or trust store file failed
    #[error("File I/O error on '{}': {source}", path.display())]
    FileIo {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Interactive input could not be read (or was cancelled)
    #[error("Prompt error: {0}")]
    Prompt(#[from] std::io::Error),

    /// A user supplied value could not be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CertiffixError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CertiffixError::FileIo {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for certiffix operations.
pub type Result<T> = std::result::Result<T, CertiffixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CertiffixError::MissingRequiredField("organization".to_string());
        assert_eq!(err.to_string(), "Required value 'organization' is missing");
    }

    #[test]
    fn test_ca_not_found_distinguishes_material() {
        let cert = CertiffixError::CaNotFound(
            CaMaterial::PublicCertificate,
            PathBuf::from("/tmp/root_test.ca.pem"),
        );
        let key = CertiffixError::CaNotFound(
            CaMaterial::PrivateKey,
            PathBuf::from("/tmp/root_test.ca.key"),
        );

        assert_eq!(
            cert.to_string(),
            "public CA signing certificate '/tmp/root_test.ca.pem' not found"
        );
        assert_eq!(
            key.to_string(),
            "private CA signing key '/tmp/root_test.ca.key' not found"
        );
    }

    #[test]
    fn test_external_tool_failure_carries_stderr() {
        let err = CertiffixError::ExternalToolFailure {
            command: "openssl genpkey".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "unknown option".to_string(),
        };
        assert!(err.to_string().contains("unknown option"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CertiffixError>();
    }
}
