//! Trust store module.
//!
//! This module owns the on-disk layout of CA roots and leaf certificates.

pub mod entry;
pub mod layout;
