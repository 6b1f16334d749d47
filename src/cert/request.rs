//! Certificate requests.
//!
//! A [`CertificateRequest`] is the fully-resolved parameter set for one
//! issuance. It is built from a [`Subject`] and validated before any template
//! is rendered.

use crate::error::{CertiffixError, Result};
use crate::template::mangle::mangle;
use std::net::IpAddr;
use std::path::PathBuf;

/// Default certificate validity in days.
pub const DEFAULT_VALIDITY_DAYS: u32 = 398;

/// Prefix marking a wildcard common name.
pub const WILDCARD_PREFIX: &str = "*.";

/// Subject distinguished-name fields.
///
/// Every field is optional at this level; `organization` and `common_name`
/// are enforced by [`CertificateRequest::validate`], the rest by the template
/// that references them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    /// Country code (C).
    pub country: Option<String>,
    /// State or province (ST).
    pub state: Option<String>,
    /// County or locality (L).
    pub county: Option<String>,
    /// Organization (O).
    pub organization: Option<String>,
    /// Organizational unit (OU).
    pub unit: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Common name (CN), usually a domain name.
    pub common_name: Option<String>,
}

/// The resolved parameters for one CA or leaf issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Subject fields.
    pub subject: Subject,
    /// DNS names; the first entry is the canonical identity.
    pub dns: Vec<String>,
    /// IP addresses for the subject-alternative-name extension.
    pub ip: Vec<IpAddr>,
    /// Validity period in days.
    pub days: u32,
    /// Public certificate of the signing CA (leaf issuance only).
    pub ca: Option<PathBuf>,
}

impl CertificateRequest {
    /// Build a request from a subject, applying wildcard rewriting.
    ///
    /// A common name starting with `*.` (or `wildcard == true`) yields the DNS
    /// list `[base, *.base]` and a common name of `base`.
    ///
    /// # Example
    ///
    /// ```
    /// use certiffix::cert::request::{CertificateRequest, Subject};
    ///
    /// let subject = Subject {
    ///     organization: Some("Acme".to_string()),
    ///     common_name: Some("*.example.com".to_string()),
    ///     ..Subject::default()
    /// };
    /// let request = CertificateRequest::new(subject, false).unwrap();
    /// assert_eq!(request.dns, vec!["example.com", "*.example.com"]);
    /// ```
    pub fn new(mut subject: Subject, wildcard: bool) -> Result<Self> {
        let common_name = subject
            .common_name
            .as_deref()
            .ok_or_else(|| CertiffixError::MissingRequiredField("commonName".to_string()))?;

        let (common_name, dns) = rewrite_wildcard(common_name, wildcard);
        subject.common_name = Some(common_name);

        let request = Self {
            subject,
            dns,
            ip: Vec::new(),
            days: DEFAULT_VALIDITY_DAYS,
            ca: None,
        };
        request.validate()?;

        Ok(request)
    }

    /// Set the IP addresses.
    pub fn with_ips(mut self, ip: Vec<IpAddr>) -> Self {
        self.ip = ip;
        self
    }

    /// Set the validity period.
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// Set the signing CA's public certificate.
    pub fn with_ca(mut self, ca: impl Into<PathBuf>) -> Self {
        self.ca = Some(ca.into());
        self
    }

    /// Check the invariants every issuance relies on.
    pub fn validate(&self) -> Result<()> {
        if is_blank(self.subject.organization.as_deref()) {
            return Err(CertiffixError::MissingRequiredField(
                "organization".to_string(),
            ));
        }
        if is_blank(self.subject.common_name.as_deref()) {
            return Err(CertiffixError::MissingRequiredField("commonName".to_string()));
        }
        if self.dns.is_empty() {
            return Err(CertiffixError::MissingRequiredField("dns".to_string()));
        }
        if self.days == 0 {
            return Err(CertiffixError::InvalidInput(
                "validity period must be at least one day".to_string(),
            ));
        }
        Ok(())
    }

    /// The canonical identity: the first DNS name.
    pub fn primary_name(&self) -> Result<&str> {
        self.dns
            .first()
            .map(String::as_str)
            .ok_or_else(|| CertiffixError::MissingRequiredField("dns".to_string()))
    }

    /// The storage identifier derived from the primary DNS name.
    pub fn identifier(&self) -> Result<String> {
        let primary = self.primary_name()?;
        let identifier = mangle(primary);
        if identifier.is_empty() {
            return Err(CertiffixError::InvalidInput(format!(
                "'{}' does not produce a usable storage name",
                primary
            )));
        }
        Ok(identifier)
    }
}

/// Strip a wildcard marker and build the DNS list.
///
/// Returns the canonical common name and the DNS names it covers.
pub fn rewrite_wildcard(common_name: &str, wildcard: bool) -> (String, Vec<String>) {
    let (base, wildcard) = match common_name.strip_prefix(WILDCARD_PREFIX) {
        Some(base) => (base, true),
        None => (common_name, wildcard),
    };

    let mut dns = vec![base.to_string()];
    if wildcard {
        dns.push(format!("{}{}", WILDCARD_PREFIX, base));
    }

    (base.to_string(), dns)
}

/// Whether a common name carries the wildcard marker.
pub fn is_wildcard(common_name: &str) -> bool {
    common_name.starts_with(WILDCARD_PREFIX)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
