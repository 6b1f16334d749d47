//! Root CA workflow.
//!
//! This module issues self-signed CA root certificates into the CA store.

use crate::cert::artifact::{random_token, TempArtifact};
use crate::cert::request::CertificateRequest;
use crate::error::{CertiffixError, Result};
use crate::storage::entry::{Store, TrustStoreEntry};
use crate::storage::layout::TrustStore;
use crate::template::configs::distinguished_name_config;
use crate::template::context::TemplateContext;
use crate::toolkit::openssl::OpenSsl;
use crate::toolkit::Runner;
use tracing::info;

/// Create a self-signed CA root for the request's primary DNS name.
///
/// Writes `<id>.ca.key` and `<id>.ca.pem` into the CA store. An existing CA
/// certificate with the same identifier is never replaced: the call fails with
/// [`CertiffixError::DuplicateCa`] before anything is written.
///
/// # Example
///
/// ```rust,no_run
/// use certiffix::cert::ca::create_root_ca;
/// use certiffix::cert::request::{CertificateRequest, Subject};
/// use certiffix::storage::layout::{TrustStore, TrustStoreConfig};
/// use certiffix::toolkit::{openssl::OpenSsl, ProcessRunner};
///
/// # async fn example() -> certiffix::error::Result<()> {
/// let store = TrustStore::open(TrustStoreConfig::new("/tmp/certiffix"));
/// let subject = Subject {
///     organization: Some("Acme".to_string()),
///     common_name: Some("root.test".to_string()),
///     ..Subject::default()
/// };
/// let request = CertificateRequest::new(subject, false)?;
/// let entry = create_root_ca(&store, &OpenSsl::new(ProcessRunner), &request).await?;
/// println!("{}", entry.public_cert.display());
/// # Ok(())
/// # }
/// ```
pub async fn create_root_ca<R: Runner>(
    store: &TrustStore,
    openssl: &OpenSsl<R>,
    request: &CertificateRequest,
) -> Result<TrustStoreEntry> {
    let identifier = request.identifier()?;
    let entry = store.entry(Store::CaRoot, &identifier);

    // Never replace an existing root
    if entry.public_cert.exists() {
        return Err(CertiffixError::DuplicateCa(entry.public_cert));
    }

    // Render subject config
    let context = TemplateContext::from_request(request)?;
    let config = TempArtifact::create(
        &store.config().temp_dir,
        &random_token(),
        "ca-config.conf",
        &distinguished_name_config(&context)?,
    )?;

    // Generate key
    info!("Generating CA root private key for '{}'", identifier);
    openssl.generate_rsa_key(&entry.private_key).await?;

    // Self-sign
    info!("Self-signing CA root certificate for '{}'", identifier);
    openssl
        .self_signed_certificate(
            config.path(),
            &entry.private_key,
            request.days,
            &entry.public_cert,
        )
        .await?;

    // Clean up
    config.remove()?;

    Ok(entry)
}
