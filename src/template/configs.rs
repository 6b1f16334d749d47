//! The openssl configuration templates.

use crate::error::Result;
use crate::template::context::TemplateContext;
use crate::template::engine::expand;

/// Request configuration with the subject distinguished name.
///
/// Used for both the self-signed CA root and leaf signing requests.
pub const DISTINGUISHED_NAME_TEMPLATE: &str = "
[req]
prompt = no
distinguished_name = {MASTER_NAME}

[{MASTER_NAME}]
C = {COUNTRY}
ST = {STATE}
L = {COUNTY}
O = {ORGANIZATION}
OU = {UNIT}
emailAddress = {EMAIL}
CN = {COMMONNAME}
";

/// Extension configuration applied when the CA signs a leaf request.
pub const EXTENSIONS_TEMPLATE: &str = "
authorityKeyIdentifier=keyid,issuer
basicConstraints=CA:FALSE
keyUsage = digitalSignature, nonRepudiation, keyEncipherment, dataEncipherment
subjectAltName = @alt_names

[alt_names]
{DNS}
{IP}
";

/// Render the distinguished-name configuration.
pub fn distinguished_name_config(context: &TemplateContext) -> Result<String> {
    expand(DISTINGUISHED_NAME_TEMPLATE, context)
}

/// Render the leaf extensions configuration.
pub fn extensions_config(context: &TemplateContext) -> Result<String> {
    expand(EXTENSIONS_TEMPLATE, context)
}
