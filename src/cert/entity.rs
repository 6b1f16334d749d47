//! Leaf certificate workflow.
//!
//! This module issues CA-signed end-entity certificates into the leaf stores.

use crate::cert::artifact::{random_token, TempArtifact};
use crate::cert::request::CertificateRequest;
use crate::error::{CaMaterial, CertiffixError, Result};
use crate::storage::entry::{Store, TrustStoreEntry};
use crate::storage::layout::{ca_private_key_for, TrustStore};
use crate::template::configs::{distinguished_name_config, extensions_config};
use crate::template::context::TemplateContext;
use crate::toolkit::openssl::{OpenSsl, SigningRequest};
use crate::toolkit::Runner;
use std::path::PathBuf;
use tracing::info;

/// Issue a leaf certificate signed by the request's CA.
///
/// The CA's public certificate and its private key (same path with `.ca.key`
/// in place of `.ca.pem`) must both exist. A previous leaf with the same
/// identifier is overwritten.
///
/// Writes `private/<id>.key` and `public/<id>.pem`. The rendered configs and
/// the signing request are removed before returning.
pub async fn create_end_entity_cert<R: Runner>(
    store: &TrustStore,
    openssl: &OpenSsl<R>,
    request: &CertificateRequest,
) -> Result<TrustStoreEntry> {
    // Check signing CA
    let (ca_cert, ca_key) = signing_ca(request)?;

    let identifier = request.identifier()?;
    let entry = store.entry(Store::Leaf, &identifier);

    // Render configs
    let context = TemplateContext::from_request(request)?;
    let config_text = distinguished_name_config(&context)?;
    let extensions_text = extensions_config(&context)?;

    let temp_dir = &store.config().temp_dir;
    let token = random_token();
    let config = TempArtifact::create(temp_dir, &token, "config.conf", &config_text)?;
    let extensions = TempArtifact::create(temp_dir, &token, "config-ext.conf", &extensions_text)?;
    let signing_request = TempArtifact::reserve(temp_dir, &token, "csr.pem")?;

    // Generate key
    info!("Generating private key for '{}'", identifier);
    openssl.generate_rsa_key(&entry.private_key).await?;

    // Create CSR
    info!("Creating signing request for '{}'", identifier);
    openssl
        .signing_request(config.path(), &entry.private_key, signing_request.path())
        .await?;

    // Sign with CA
    info!("Signing '{}' with {}", identifier, ca_cert.display());
    let signing = SigningRequest {
        request: signing_request.path(),
        ca_cert: &ca_cert,
        ca_key: &ca_key,
        extensions: extensions.path(),
        days: request.days,
    };
    openssl.sign_request(&signing, &entry.public_cert).await?;

    // Clean up
    config.remove()?;
    extensions.remove()?;
    signing_request.remove()?;

    Ok(entry)
}

/// Locate the signing CA's certificate and key, checking both exist.
fn signing_ca(request: &CertificateRequest) -> Result<(PathBuf, PathBuf)> {
    let ca_cert = request.ca.clone().ok_or_else(|| {
        CertiffixError::InvalidInput("no signing CA root certificate selected".to_string())
    })?;
    let ca_key = ca_private_key_for(&ca_cert);

    if !ca_cert.is_file() {
        return Err(CertiffixError::CaNotFound(
            CaMaterial::PublicCertificate,
            ca_cert,
        ));
    }
    if !ca_key.is_file() {
        return Err(CertiffixError::CaNotFound(CaMaterial::PrivateKey, ca_key));
    }

    Ok((ca_cert, ca_key))
}
