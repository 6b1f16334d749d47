//! Certiffix: development TLS certificates from a local CA.
//!
//! This library issues certificates for local development. It can:
//!
//! - Create self-signed CA roots in a local trust store
//! - Issue leaf certificates signed by one of those roots, with DNS and IP
//!   subject alternative names and wildcard support
//! - Keep keys and certificates in an owner-only directory tree
//!
//! # Architecture
//!
//! Data flows one way: a resolved [`cert::request::CertificateRequest`] is
//! rendered by the [`template`] engine into openssl configuration files, the
//! [`cert`] workflows drive the external toolkit through [`toolkit`], and the
//! results land in the [`storage`] layout. The cryptography itself is done by
//! the `openssl` binary. Every operation returns a [`Result`]; nothing in the
//! library exits the process.
//!
//! # Example
//!
//! ```rust,no_run
//! use certiffix::cert::ca::create_root_ca;
//! use certiffix::cert::entity::create_end_entity_cert;
//! use certiffix::cert::request::{CertificateRequest, Subject};
//! use certiffix::storage::layout::{TrustStore, TrustStoreConfig};
//! use certiffix::toolkit::{openssl::OpenSsl, ProcessRunner};
//!
//! # async fn example() -> certiffix::Result<()> {
//! let store = TrustStore::open(TrustStoreConfig::new("/tmp/certiffix"));
//! let openssl = OpenSsl::new(ProcessRunner);
//!
//! let subject = Subject {
//!     country: Some("US".to_string()),
//!     state: Some("CA".to_string()),
//!     county: Some("Marin".to_string()),
//!     organization: Some("Acme".to_string()),
//!     unit: Some("Dev".to_string()),
//!     email: Some("dev@acme.test".to_string()),
//!     common_name: Some("root.test".to_string()),
//! };
//! let ca = create_root_ca(&store, &openssl, &CertificateRequest::new(subject.clone(), false)?).await?;
//!
//! let leaf = CertificateRequest::new(
//!     Subject { common_name: Some("*.svc.test".to_string()), ..subject },
//!     false,
//! )?
//! .with_ips(vec!["127.0.0.1".parse().unwrap()])
//! .with_ca(&ca.public_cert);
//! create_end_entity_cert(&store, &openssl, &leaf).await?;
//! # Ok(())
//! # }
//! ```

pub mod cert;
pub mod error;
pub mod resolve;
pub mod storage;
pub mod template;
pub mod toolkit;

// Re-export commonly used types
pub use error::{CertiffixError, Result};
