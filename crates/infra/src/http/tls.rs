//! TLS material shared by both transport strategies.
//!
//! Peer verification is disabled unless TLS auth is configured with
//! `verify_peer`; in that case only the configured CA bundle is trusted.

use std::path::Path;

use lapi_domain::{Result, TransportError, TransportOptions};
use reqwest::{Certificate, Identity};

/// Client identity, trust anchor and verification mode for one client.
pub(crate) struct TlsMaterial {
    pub identity: Option<Identity>,
    pub ca_certificate: Option<Certificate>,
    pub accept_invalid_certs: bool,
}

impl TlsMaterial {
    /// Read certificate files referenced by `options`.
    ///
    /// # Errors
    /// `TransportError::Setup` when a file is unreadable or not valid PEM.
    pub fn load(options: &TransportOptions) -> Result<Self> {
        let Some(tls) = options.tls.as_ref().filter(|_| options.uses_tls_auth()) else {
            return Ok(Self { identity: None, ca_certificate: None, accept_invalid_certs: true });
        };

        let mut pem = read_pem(&tls.cert_path, "client certificate")?;
        pem.push(b'\n');
        pem.extend(read_pem(&tls.key_path, "client key")?);
        let identity = Identity::from_pem(&pem)
            .map_err(|e| TransportError::Setup(format!("invalid client certificate or key: {e}")))?;

        let ca_certificate = match (&tls.ca_cert_path, tls.verify_peer) {
            (Some(path), true) => {
                let ca = read_pem(path, "CA bundle")?;
                Some(
                    Certificate::from_pem(&ca)
                        .map_err(|e| TransportError::Setup(format!("invalid CA bundle: {e}")))?,
                )
            }
            _ => None,
        };

        Ok(Self {
            identity: Some(identity),
            accept_invalid_certs: !tls.verify_peer,
            ca_certificate,
        })
    }
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        TransportError::Setup(format!("cannot read {what} {}: {e}", path.display())).into()
    })
}

#[cfg(test)]
mod tests {
    use lapi_domain::{AuthType, LapiError, TlsOptions};

    use super::*;

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tls");

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(FIXTURES).join(name)
    }

    fn tls_options(verify_peer: bool, ca_cert_path: Option<std::path::PathBuf>) -> TransportOptions {
        TransportOptions {
            auth_type: AuthType::Tls,
            tls: Some(TlsOptions {
                cert_path: fixture("client.pem"),
                key_path: fixture("client-key.pem"),
                verify_peer,
                ca_cert_path,
            }),
            ..TransportOptions::default()
        }
    }

    #[test]
    fn tls_auth_with_verification_trusts_only_the_ca_bundle() {
        let material = TlsMaterial::load(&tls_options(true, Some(fixture("ca.pem")))).unwrap();

        assert!(material.identity.is_some());
        assert!(material.ca_certificate.is_some());
        assert!(!material.accept_invalid_certs);
    }

    #[test]
    fn tls_auth_without_verification_accepts_any_server() {
        let material = TlsMaterial::load(&tls_options(false, Some(fixture("ca.pem")))).unwrap();

        assert!(material.identity.is_some());
        assert!(material.ca_certificate.is_none());
        assert!(material.accept_invalid_certs);
    }

    #[test]
    fn tls_options_are_ignored_for_api_key_auth() {
        let options =
            TransportOptions { auth_type: AuthType::ApiKey, ..tls_options(true, Some(fixture("ca.pem"))) };
        let material = TlsMaterial::load(&options).unwrap();

        assert!(material.identity.is_none());
        assert!(material.accept_invalid_certs);
    }

    #[test]
    fn certificate_without_key_is_a_setup_error() {
        let mut options = tls_options(false, None);
        if let Some(tls) = options.tls.as_mut() {
            tls.key_path = fixture("ca.pem");
        }

        match TlsMaterial::load(&options) {
            Err(LapiError::Transport(TransportError::Setup(message))) => {
                assert!(message.contains("invalid client certificate or key"), "{message}");
            }
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn api_key_auth_skips_peer_verification() {
        let material = TlsMaterial::load(&TransportOptions::default()).unwrap();
        assert!(material.accept_invalid_certs);
        assert!(material.identity.is_none());
        assert!(material.ca_certificate.is_none());
    }

    #[test]
    fn unreadable_certificate_is_a_setup_error() {
        let options = TransportOptions {
            auth_type: AuthType::Tls,
            tls: Some(TlsOptions {
                cert_path: "/nonexistent/cert.pem".into(),
                key_path: "/nonexistent/key.pem".into(),
                verify_peer: false,
                ca_cert_path: None,
            }),
            ..TransportOptions::default()
        };

        match TlsMaterial::load(&options) {
            Err(LapiError::Transport(TransportError::Setup(message))) => {
                assert!(message.contains("client certificate"));
            }
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
