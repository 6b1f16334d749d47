//! Certificate issuance module.
//!
//! This module sequences the external toolkit calls for the two workflows:
//! self-signed CA roots and CA-signed leaf certificates.

pub mod artifact;
pub mod ca;
pub mod entity;
pub mod request;
