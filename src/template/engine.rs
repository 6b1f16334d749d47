//! Placeholder expansion.
//!
//! Templates reference values with upper-case bracketed tokens such as
//! `{COMMONNAME}`. Each token is looked up, lower-cased, in a
//! [`TemplateContext`]. List values expand into numbered `KEY.N = value` lines,
//! which is how multi-valued sections like `[alt_names]` are filled.

use crate::error::{CertiffixError, Result};
use crate::template::context::{TemplateContext, TemplateValue};
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Z_]+)\}").expect("Invalid regex"));

/// Keys that every expansion requires, whether or not the template uses them.
pub const REQUIRED_KEYS: [&str; 2] = ["organization", "commonname"];

/// Expand all placeholders in `template` against `context`.
///
/// Fails with [`CertiffixError::MissingRequiredField`] when the context lacks
/// `organization` or `commonname`, or when the template references a key the
/// context does not define.
///
/// # Example
///
/// ```
/// use certiffix::template::context::{TemplateContext, TemplateValue};
/// use certiffix::template::engine::expand;
///
/// let mut context = TemplateContext::new();
/// context.insert("organization", TemplateValue::text("Acme"));
/// context.insert("commonname", TemplateValue::text("svc.test"));
/// context.insert("dns", TemplateValue::list(["svc.test", "*.svc.test"]));
///
/// let out = expand("CN = {COMMONNAME}\n{DNS}", &context).unwrap();
/// assert_eq!(out, "CN = svc.test\nDNS.1 = svc.test\nDNS.2 = *.svc.test\n");
/// ```
pub fn expand(template: &str, context: &TemplateContext) -> Result<String> {
    for key in REQUIRED_KEYS {
        if context.get(key).is_none() {
            return Err(CertiffixError::MissingRequiredField(key.to_string()));
        }
    }

    let mut output = String::with_capacity(template.len());
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let key = name.as_str().to_lowercase();
        let value = context
            .get(&key)
            .ok_or_else(|| CertiffixError::MissingRequiredField(key.clone()))?;

        output.push_str(&template[last..whole.start()]);
        render_value(&mut output, &key, value);
        last = whole.end();
    }

    output.push_str(&template[last..]);
    Ok(output)
}

fn render_value(output: &mut String, key: &str, value: &TemplateValue) {
    match value {
        TemplateValue::Text(text) => output.push_str(text),
        TemplateValue::List(items) => {
            let label = key.to_uppercase();
            for (index, item) in items.iter().enumerate() {
                output.push_str(&format!("{}.{} = {}\n", label, index + 1, item));
            }
        }
    }
}
