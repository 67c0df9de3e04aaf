//! Getter options: a record of request/transport settings and the functional
//! options that mutate it.
//!
//! Options are applied strictly in order on a private copy of a baseline
//! record; a later option overrides an earlier one on the same field.

use crate::error::GetterError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Settings consumed by a getter for one fetch.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Pre-bound target locator (validated URL).
    pub url: Option<String>,
    /// Basic auth username. `Some("")` is an explicit empty username, distinct from unset.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Overrides the default `User-Agent`.
    pub user_agent: Option<String>,
    /// Value of the `Accept` header, if any.
    pub accept_header: Option<String>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    pub insecure_skip_verify_tls: bool,
    /// Per-request timeout; zero means the transport default.
    pub timeout: Duration,
    /// Keep Basic credentials when a redirect leads to another host.
    pub pass_credentials_all: bool,
}

impl Options {
    /// True when any TLS material or the skip-verify flag is configured.
    pub fn wants_tls_config(&self) -> bool {
        self.cert_file.is_some()
            || self.key_file.is_some()
            || self.ca_file.is_some()
            || self.insecure_skip_verify_tls
    }

    /// Locator used in error messages: the pre-bound URL or empty.
    pub(crate) fn locator(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("accept_header", &self.accept_header)
            .field("cert_file", &self.cert_file)
            .field("key_file", &self.key_file)
            .field("ca_file", &self.ca_file)
            .field("insecure_skip_verify_tls", &self.insecure_skip_verify_tls)
            .field("timeout", &self.timeout)
            .field("pass_credentials_all", &self.pass_credentials_all)
            .finish()
    }
}

type ApplyFn = dyn Fn(&mut Options) -> Result<(), GetterError> + Send + Sync;

/// One configuration mutation. Cheap to clone; safe to share across threads.
#[derive(Clone)]
pub struct GetterOption(Arc<ApplyFn>);

impl GetterOption {
    /// Wraps a custom mutation.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Options) -> Result<(), GetterError> + Send + Sync + 'static,
    {
        GetterOption(Arc::new(f))
    }

    pub fn apply(&self, opts: &mut Options) -> Result<(), GetterError> {
        (self.0)(opts)
    }
}

impl fmt::Debug for GetterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GetterOption(..)")
    }
}

/// Clones `base` and applies `options` in order. `base` is never touched.
pub fn apply_options(base: &Options, options: &[GetterOption]) -> Result<Options, GetterError> {
    let mut opts = base.clone();
    for opt in options {
        opt.apply(&mut opts)?;
    }
    Ok(opts)
}

/// Pre-binds the target locator. Fails if `url` does not parse as an absolute URL.
pub fn with_url(url: impl Into<String>) -> GetterOption {
    let url = url.into();
    GetterOption::new(move |opts| {
        url::Url::parse(&url).map_err(|e| GetterError::configuration(&url, e.to_string()))?;
        opts.url = Some(url.clone());
        Ok(())
    })
}

/// Stores Basic auth credentials. Empty strings are explicit values.
pub fn with_basic_auth(username: impl Into<String>, password: impl Into<String>) -> GetterOption {
    let username = username.into();
    let password = password.into();
    GetterOption::new(move |opts| {
        opts.username = Some(username.clone());
        opts.password = Some(password.clone());
        Ok(())
    })
}

pub fn with_user_agent(user_agent: impl Into<String>) -> GetterOption {
    let user_agent = user_agent.into();
    GetterOption::new(move |opts| {
        opts.user_agent = Some(user_agent.clone());
        Ok(())
    })
}

pub fn with_accept_header(accept: impl Into<String>) -> GetterOption {
    let accept = accept.into();
    GetterOption::new(move |opts| {
        opts.accept_header = Some(accept.clone());
        Ok(())
    })
}

/// Stores client certificate, key and CA bundle paths. Files are read later,
/// when the transport is built. Empty paths mean "not set".
pub fn with_tls_client_config(
    cert_file: impl AsRef<Path>,
    key_file: impl AsRef<Path>,
    ca_file: impl AsRef<Path>,
) -> GetterOption {
    let cert_file = non_empty_path(cert_file.as_ref());
    let key_file = non_empty_path(key_file.as_ref());
    let ca_file = non_empty_path(ca_file.as_ref());
    GetterOption::new(move |opts| {
        opts.cert_file = cert_file.clone();
        opts.key_file = key_file.clone();
        opts.ca_file = ca_file.clone();
        Ok(())
    })
}

/// Sets only the client certificate and key, leaving the CA bundle alone.
pub fn with_client_certificate(
    cert_file: impl AsRef<Path>,
    key_file: impl AsRef<Path>,
) -> GetterOption {
    let cert_file = non_empty_path(cert_file.as_ref());
    let key_file = non_empty_path(key_file.as_ref());
    GetterOption::new(move |opts| {
        opts.cert_file = cert_file.clone();
        opts.key_file = key_file.clone();
        Ok(())
    })
}

/// Sets only the CA bundle, leaving any client certificate alone.
pub fn with_ca_file(ca_file: impl AsRef<Path>) -> GetterOption {
    let ca_file = non_empty_path(ca_file.as_ref());
    GetterOption::new(move |opts| {
        opts.ca_file = ca_file.clone();
        Ok(())
    })
}

pub fn with_insecure_skip_verify_tls(insecure: bool) -> GetterOption {
    GetterOption::new(move |opts| {
        opts.insecure_skip_verify_tls = insecure;
        Ok(())
    })
}

pub fn with_timeout(timeout: Duration) -> GetterOption {
    GetterOption::new(move |opts| {
        opts.timeout = timeout;
        Ok(())
    })
}

pub fn with_pass_credentials_all(pass: bool) -> GetterOption {
    GetterOption::new(move |opts| {
        opts.pass_credentials_all = pass;
        Ok(())
    })
}

fn non_empty_path(p: &Path) -> Option<PathBuf> {
    if p.as_os_str().is_empty() {
        None
    } else {
        Some(p.to_path_buf())
    }
}
