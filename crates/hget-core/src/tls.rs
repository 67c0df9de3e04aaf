//! TLS material loading and validation.
//!
//! libcurl reads the PEM files itself at request time; everything is checked
//! here first so that a bad certificate, key or CA bundle is reported when the
//! client is built instead of surfacing as an opaque handshake failure.

use crate::error::GetterError;
use crate::options::Options;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::RootCertStore;
use std::path::{Path, PathBuf};

/// Validated TLS settings for one transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TlsConfig {
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    /// Host the peer certificate is verified against: the request target's
    /// host without port. Empty until the client is bound to a target.
    pub server_name: String,
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// Key that identifies a transport configuration. No file IO.
    ///
    /// The server name comes from `target` when given, otherwise from the
    /// pre-bound locator.
    pub(crate) fn describe(
        opts: &Options,
        target: Option<&str>,
    ) -> Result<Option<TlsConfig>, GetterError> {
        if !opts.wants_tls_config() {
            return Ok(None);
        }
        let locator = opts.locator();
        match (&opts.cert_file, &opts.key_file) {
            (Some(_), None) => {
                return Err(GetterError::configuration(
                    locator,
                    "TLS client certificate given without a key file",
                ))
            }
            (None, Some(_)) => {
                return Err(GetterError::configuration(
                    locator,
                    "TLS key file given without a client certificate",
                ))
            }
            _ => {}
        }
        let server_name = match target.or(opts.url.as_deref()) {
            Some(u) => server_name(u)?,
            None => String::new(),
        };
        Ok(Some(TlsConfig {
            cert_file: opts.cert_file.clone(),
            key_file: opts.key_file.clone(),
            ca_file: opts.ca_file.clone(),
            server_name,
            insecure_skip_verify: opts.insecure_skip_verify_tls,
        }))
    }

    /// Reads and checks the configured files.
    ///
    /// Nothing loaded here is handed to the transport. libcurl re-reads the
    /// same paths (`ssl_cert`, `ssl_key`, `cainfo`) on every handshake, so the
    /// parsed identity and root store only serve to reject bad material early.
    pub(crate) fn load(&self, locator: &str) -> Result<(), GetterError> {
        if let (Some(cert), Some(key)) = (&self.cert_file, &self.key_file) {
            load_client_identity(locator, cert, key)?;
        }
        if let Some(ca) = &self.ca_file {
            let roots = load_ca_pool(locator, ca)?;
            tracing::debug!("validated {} CA certificate(s) in {}", roots, ca.display());
        }
        Ok(())
    }

    /// Checks that `locator` is the host this configuration verifies.
    ///
    /// libcurl verifies the peer against the request URL's host, so a client
    /// bound to another server name must not be used for it.
    pub(crate) fn check_server_name(&self, locator: &str) -> Result<(), GetterError> {
        if self.server_name.is_empty() {
            return Ok(());
        }
        let host = server_name(locator)?;
        if !host.eq_ignore_ascii_case(&self.server_name) {
            return Err(GetterError::configuration(
                locator,
                format!(
                    "TLS client is bound to server name {:?}, not {:?}",
                    self.server_name, host
                ),
            ));
        }
        Ok(())
    }
}

/// Host of `locator` with any port (and IPv6 brackets) removed.
pub fn server_name(locator: &str) -> Result<String, GetterError> {
    let url = url::Url::parse(locator)
        .map_err(|e| GetterError::configuration(locator, e.to_string()))?;
    let host = url.host_str().unwrap_or("");
    Ok(host.trim_start_matches('[').trim_end_matches(']').to_string())
}

/// Loads the certificate chain and private key and checks that they belong together.
fn load_client_identity(locator: &str, cert: &Path, key: &Path) -> Result<(), GetterError> {
    let certs = load_certs(locator, cert)?;
    let key_der = PrivateKeyDer::from_pem_file(key)
        .map_err(|e| GetterError::credential(locator, key, e))?;
    let signing_key = rustls::crypto::ring::sign::any_supported_type(&key_der)
        .map_err(|e| GetterError::credential(locator, key, e))?;
    CertifiedKey::new(certs, signing_key)
        .keys_match()
        .map_err(|e| {
            GetterError::credential(
                locator,
                cert,
                format!("certificate does not match key {}: {}", key.display(), e),
            )
        })
}

/// Parses a CA bundle into a throwaway trust pool and returns how many roots
/// it accepted. The pool itself is dropped; libcurl reads the bundle via
/// `cainfo`.
fn load_ca_pool(locator: &str, ca: &Path) -> Result<usize, GetterError> {
    let certs = load_certs(locator, ca)?;
    let mut pool = RootCertStore::empty();
    let (added, ignored) = pool.add_parsable_certificates(certs);
    if added == 0 {
        return Err(GetterError::credential(
            locator,
            ca,
            format!("no valid CA certificate ({} unparsable)", ignored),
        ));
    }
    Ok(added)
}

fn load_certs(locator: &str, path: &Path) -> Result<Vec<CertificateDer<'static>>, GetterError> {
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| GetterError::credential(locator, path, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GetterError::credential(locator, path, e))?;
    if certs.is_empty() {
        return Err(GetterError::credential(locator, path, "no certificates found"));
    }
    Ok(certs)
}
