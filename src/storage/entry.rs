//! Trust store entries.
//!
//! This module names the stores and file roles of the trust store and the
//! (private key, public certificate) pairs kept in them.

use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;

/// Which part of the trust store an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    /// Self-signed CA roots (`ca/`, keys and certificates side by side).
    CaRoot,
    /// CA-signed leaf certificates (`private/` keys, `public/` certificates).
    Leaf,
}

/// The role of a file within an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The RSA private key.
    PrivateKey,
    /// The PEM encoded X.509 certificate.
    PublicCert,
}

impl Store {
    /// File name suffix for a role in this store.
    pub fn suffix(self, role: Role) -> &'static str {
        match (self, role) {
            (Store::CaRoot, Role::PrivateKey) => ".ca.key",
            (Store::CaRoot, Role::PublicCert) => ".ca.pem",
            (Store::Leaf, Role::PrivateKey) => ".key",
            (Store::Leaf, Role::PublicCert) => ".pem",
        }
    }

    /// File name for an identifier in this store.
    pub fn file_name(self, identifier: &str, role: Role) -> String {
        format!("{}{}", identifier, self.suffix(role))
    }
}

/// A (private key, public certificate) pair keyed by its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStoreEntry {
    /// The mangled identifier.
    pub identifier: String,
    /// Path of the private key.
    pub private_key: PathBuf,
    /// Path of the public certificate.
    pub public_cert: PathBuf,
}

impl TrustStoreEntry {
    /// Whether the private key file exists.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_file()
    }

    /// Whether the public certificate file exists.
    pub fn has_public_cert(&self) -> bool {
        self.public_cert.is_file()
    }

    /// Last modification time of the public certificate, if readable.
    pub fn issued_at(&self) -> Option<DateTime<Local>> {
        fs::metadata(&self.public_cert)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from)
    }
}
