//! Template context.
//!
//! The case-normalized, string-typed view of a [`CertificateRequest`] that the
//! template engine substitutes from.

use crate::cert::request::CertificateRequest;
use crate::error::Result;
use crate::template::mangle::mangle;
use std::collections::BTreeMap;

/// A single substitution value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// Rendered verbatim.
    Text(String),
    /// Rendered as one `KEY.N = item` line per element.
    List(Vec<String>),
}

impl TemplateValue {
    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        TemplateValue::Text(value.into())
    }

    /// Build a list value.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TemplateValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Lower-case keyed values available to template placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, TemplateValue>,
}

impl TemplateContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value. Keys are stored lower-cased.
    pub fn insert(&mut self, key: &str, value: TemplateValue) {
        self.values.insert(key.to_lowercase(), value);
    }

    /// Look up a value by its lower-case key.
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.values.get(key)
    }

    /// Build the context for one issuance.
    ///
    /// The request is validated first, so a context built here always carries
    /// `organization`, `commonname` and the derived `master_name` section label.
    /// Unset optional subject fields are left out; a template that references
    /// them fails at expansion time.
    pub fn from_request(request: &CertificateRequest) -> Result<Self> {
        request.validate()?;

        let subject = &request.subject;
        let mut context = Self::new();

        let optional = [
            ("country", &subject.country),
            ("state", &subject.state),
            ("county", &subject.county),
            ("organization", &subject.organization),
            ("unit", &subject.unit),
            ("email", &subject.email),
            ("commonname", &subject.common_name),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                context.insert(key, TemplateValue::text(value.as_str()));
            }
        }

        let organization = subject.organization.as_deref().unwrap_or_default();
        let common_name = subject.common_name.as_deref().unwrap_or_default();
        context.insert(
            "master_name",
            TemplateValue::text(mangle(&format!("{}:{}", organization, common_name))),
        );

        context.insert("dns", TemplateValue::list(request.dns.iter().cloned()));
        context.insert(
            "ip",
            TemplateValue::list(request.ip.iter().map(|ip| ip.to_string())),
        );
        context.insert("days", TemplateValue::text(request.days.to_string()));

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::request::Subject;
    use crate::error::CertiffixError;

    fn subject() -> Subject {
        Subject {
            country: Some("US".to_string()),
            state: Some("CA".to_string()),
            county: Some("Alameda".to_string()),
            organization: Some("Acme Corp".to_string()),
            unit: Some("Dev".to_string()),
            email: Some("dev@acme.test".to_string()),
            common_name: Some("svc.test".to_string()),
        }
    }

    #[test]
    fn test_from_request_master_name() {
        let request = CertificateRequest::new(subject(), false).unwrap();
        let context = TemplateContext::from_request(&request).unwrap();

        assert_eq!(
            context.get("master_name"),
            Some(&TemplateValue::text("acme_corp_svc_test"))
        );
        assert_eq!(
            context.get("commonname"),
            Some(&TemplateValue::text("svc.test"))
        );
    }

    #[test]
    fn test_from_request_lists() {
        let mut request = CertificateRequest::new(subject(), true).unwrap();
        request.ip = vec!["127.0.0.1".parse().unwrap(), "::1".parse().unwrap()];
        let context = TemplateContext::from_request(&request).unwrap();

        assert_eq!(
            context.get("dns"),
            Some(&TemplateValue::list(["svc.test", "*.svc.test"]))
        );
        assert_eq!(
            context.get("ip"),
            Some(&TemplateValue::list(["127.0.0.1", "::1"]))
        );
    }

    #[test]
    fn test_from_request_skips_unset_fields() {
        let mut subject = subject();
        subject.unit = None;
        let request = CertificateRequest::new(subject, false).unwrap();
        let context = TemplateContext::from_request(&request).unwrap();

        assert!(context.get("unit").is_none());
        assert!(context.get("country").is_some());
    }

    #[test]
    fn test_from_request_rejects_missing_organization() {
        let mut request = CertificateRequest::new(subject(), false).unwrap();
        request.subject.organization = None;

        match TemplateContext::from_request(&request) {
            Err(CertiffixError::MissingRequiredField(field)) => assert_eq!(field, "organization"),
            _ => panic!("Expected MissingRequiredField"),
        }
    }

    #[test]
    fn test_insert_lowercases_key() {
        let mut context = TemplateContext::new();
        context.insert("CommonName", TemplateValue::text("x"));
        assert!(context.get("commonname").is_some());
    }
}
