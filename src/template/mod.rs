//! Configuration templating.
//!
//! Renders the openssl configuration files that carry certificate subject
//! fields and subject-alternative-name extensions.

pub mod configs;
pub mod context;
pub mod engine;
pub mod mangle;
