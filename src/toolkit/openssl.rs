//! The openssl argument contract.
//!
//! Four operations cover both workflows: RSA key generation, self-signed
//! certificate generation, signing request generation, and CA signing.

use crate::error::Result;
use crate::toolkit::{Invocation, Runner};
use std::ffi::OsString;
use std::path::Path;

/// Default program name of the toolkit.
pub const DEFAULT_PROGRAM: &str = "openssl";

/// RSA modulus size for every generated key.
pub const RSA_KEY_BITS: u32 = 4096;

/// The openssl toolkit driven through a [`Runner`].
#[derive(Debug, Clone)]
pub struct OpenSsl<R> {
    program: OsString,
    runner: R,
}

impl<R: Runner> OpenSsl<R> {
    /// Use `runner` to invoke the default `openssl` program.
    pub fn new(runner: R) -> Self {
        Self::with_program(DEFAULT_PROGRAM, runner)
    }

    /// Use `runner` to invoke a specific toolkit binary.
    pub fn with_program(program: impl Into<OsString>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    /// The runner invocations are sent to.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Generate an RSA private key at `out`.
    pub async fn generate_rsa_key(&self, out: &Path) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["genpkey", "-algorithm", "RSA", "-out"])
            .arg(out)
            .args(["-pkeyopt".to_string(), format!("rsa_keygen_bits:{}", RSA_KEY_BITS)]);
        self.runner.run(&invocation).await?;
        Ok(())
    }

    /// Generate a self-signed SHA-256 certificate at `out`.
    pub async fn self_signed_certificate(
        &self,
        config: &Path,
        key: &Path,
        days: u32,
        out: &Path,
    ) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["req", "-x509", "-new", "-config"])
            .arg(config)
            .arg("-key")
            .arg(key)
            .args(["-sha256".to_string(), "-days".to_string(), days.to_string()])
            .arg("-out")
            .arg(out);
        self.runner.run(&invocation).await?;
        Ok(())
    }

    /// Generate a certificate signing request at `out`.
    pub async fn signing_request(&self, config: &Path, key: &Path, out: &Path) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["req", "-new", "-config"])
            .arg(config)
            .arg("-key")
            .arg(key)
            .arg("-out")
            .arg(out);
        self.runner.run(&invocation).await?;
        Ok(())
    }

    /// Have the CA sign `request`, applying `extensions`, writing to `out`.
    ///
    /// The CA serial file is created next to the CA certificate when missing.
    pub async fn sign_request(&self, signing: &SigningRequest<'_>, out: &Path) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["x509", "-req", "-in"])
            .arg(signing.request)
            .arg("-CA")
            .arg(signing.ca_cert)
            .arg("-CAkey")
            .arg(signing.ca_key)
            .args(["-CAcreateserial", "-out"])
            .arg(out)
            .args(["-days".to_string(), signing.days.to_string()])
            .arg("-extfile")
            .arg(signing.extensions);
        self.runner.run(&invocation).await?;
        Ok(())
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(self.program.clone())
    }
}

/// Inputs of a CA signing operation.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// The certificate signing request file.
    pub request: &'a Path,
    /// The signing CA's public certificate.
    pub ca_cert: &'a Path,
    /// The signing CA's private key.
    pub ca_key: &'a Path,
    /// The extensions configuration file.
    pub extensions: &'a Path,
    /// Validity period in days.
    pub days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::ToolOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Runner for Recorder {
        async fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
            self.calls.lock().unwrap().push(invocation.to_string());
            Ok(ToolOutput::default())
        }
    }

    #[tokio::test]
    async fn test_generate_rsa_key_arguments() {
        let openssl = OpenSsl::new(Recorder::default());
        openssl
            .generate_rsa_key(Path::new("/store/ca/root_test.ca.key"))
            .await
            .unwrap();

        let calls = openssl.runner().calls.lock().unwrap();
        assert_eq!(
            calls[0],
            "openssl genpkey -algorithm RSA -out /store/ca/root_test.ca.key -pkeyopt rsa_keygen_bits:4096"
        );
    }

    #[tokio::test]
    async fn test_self_signed_certificate_arguments() {
        let openssl = OpenSsl::new(Recorder::default());
        openssl
            .self_signed_certificate(
                Path::new("/tmp/c.conf"),
                Path::new("/store/ca/r.ca.key"),
                3650,
                Path::new("/store/ca/r.ca.pem"),
            )
            .await
            .unwrap();

        let calls = openssl.runner().calls.lock().unwrap();
        assert_eq!(
            calls[0],
            "openssl req -x509 -new -config /tmp/c.conf -key /store/ca/r.ca.key -sha256 -days 3650 -out /store/ca/r.ca.pem"
        );
    }

    #[tokio::test]
    async fn test_signing_request_arguments() {
        let openssl = OpenSsl::new(Recorder::default());
        openssl
            .signing_request(
                Path::new("/tmp/c.conf"),
                Path::new("/store/private/s.key"),
                Path::new("/tmp/csr.pem"),
            )
            .await
            .unwrap();

        let calls = openssl.runner().calls.lock().unwrap();
        assert_eq!(
            calls[0],
            "openssl req -new -config /tmp/c.conf -key /store/private/s.key -out /tmp/csr.pem"
        );
    }

    #[tokio::test]
    async fn test_sign_request_arguments() {
        let openssl = OpenSsl::with_program("/usr/local/bin/openssl", Recorder::default());
        let signing = SigningRequest {
            request: Path::new("/tmp/csr.pem"),
            ca_cert: Path::new("/store/ca/r.ca.pem"),
            ca_key: Path::new("/store/ca/r.ca.key"),
            extensions: Path::new("/tmp/ext.conf"),
            days: 398,
        };
        openssl
            .sign_request(&signing, Path::new("/store/public/s.pem"))
            .await
            .unwrap();

        let calls = openssl.runner().calls.lock().unwrap();
        assert_eq!(
            calls[0],
            "/usr/local/bin/openssl x509 -req -in /tmp/csr.pem -CA /store/ca/r.ca.pem -CAkey /store/ca/r.ca.key -CAcreateserial -out /store/public/s.pem -days 398 -extfile /tmp/ext.conf"
        );
    }
}
