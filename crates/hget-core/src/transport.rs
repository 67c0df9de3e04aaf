//! HTTP client construction and request execution over libcurl.
//!
//! A [`HttpClient`] owns its (immutable) TLS configuration and a small pool of
//! idle curl easy handles. Handles keep libcurl's connection cache, so reusing
//! them gives connection pooling; each request checks one out, resets it,
//! applies its settings and returns it afterwards. The pool is behind a mutex,
//! which makes one client safe to share between threads.

use crate::error::GetterError;
use crate::options::Options;
use crate::tls::TlsConfig;
use curl::easy::{Auth, Easy, List};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

/// Idle handles kept per client.
const MAX_IDLE_HANDLES: usize = 8;
/// Redirect hops followed before giving up.
const MAX_REDIRECTIONS: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

static DEFAULT_CLIENT: OnceLock<Arc<HttpClient>> = OnceLock::new();

/// A configured network client.
pub struct HttpClient {
    tls: Option<TlsConfig>,
    idle: Mutex<Vec<Easy>>,
}

/// Fully resolved GET request.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub url: String,
    pub scheme: String,
    pub user_agent: String,
    pub accept: Option<String>,
    /// Basic credentials to attach, already filtered by origin.
    pub credentials: Option<(String, String)>,
    pub pass_credentials_all: bool,
    /// Zero keeps libcurl's default.
    pub timeout: Duration,
}

#[derive(Debug)]
pub(crate) struct Response {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpClient {
    fn new(tls: Option<TlsConfig>) -> Self {
        Self {
            tls,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide client without custom TLS settings.
    pub fn shared_default() -> Arc<HttpClient> {
        Arc::clone(DEFAULT_CLIENT.get_or_init(|| Arc::new(HttpClient::new(None))))
    }

    pub fn tls(&self) -> Option<&TlsConfig> {
        self.tls.as_ref()
    }

    /// True if this client was built for `opts`' transport settings and,
    /// when given, verifies `target`'s host.
    pub(crate) fn matches(&self, opts: &Options, target: Option<&str>) -> bool {
        match TlsConfig::describe(opts, target) {
            Ok(tls) => tls == self.tls,
            Err(_) => false,
        }
    }

    pub(crate) fn execute(&self, req: &Request) -> Result<Response, GetterError> {
        let mut easy = self.checkout();
        let result = self.perform(&mut easy, req);
        self.checkin(easy);
        result
    }

    fn perform(&self, easy: &mut Easy, req: &Request) -> Result<Response, GetterError> {
        let setopt = |e: curl::Error| GetterError::configuration(&req.url, e.to_string());
        if let Some(tls) = &self.tls {
            tls.check_server_name(&req.url)?;
        }

        easy.url(&req.url).map_err(setopt)?;
        easy.get(true).map_err(setopt)?;
        easy.follow_location(true).map_err(setopt)?;
        easy.max_redirections(MAX_REDIRECTIONS).map_err(setopt)?;
        easy.connect_timeout(CONNECT_TIMEOUT).map_err(setopt)?;
        if !req.timeout.is_zero() {
            easy.timeout(req.timeout).map_err(setopt)?;
        }
        easy.useragent(&req.user_agent).map_err(setopt)?;

        if let Some(accept) = &req.accept {
            let mut list = List::new();
            list.append(&format!("Accept: {}", accept.trim()))
                .map_err(setopt)?;
            easy.http_headers(list).map_err(setopt)?;
        }

        if let Some((username, password)) = &req.credentials {
            let mut auth = Auth::new();
            auth.basic(true);
            easy.http_auth(&auth).map_err(setopt)?;
            easy.username(username).map_err(setopt)?;
            easy.password(password).map_err(setopt)?;
            // libcurl drops credentials on cross-host redirects unless told otherwise.
            easy.unrestricted_auth(req.pass_credentials_all)
                .map_err(setopt)?;
        }

        if let Some(tls) = &self.tls {
            if let (Some(cert), Some(key)) = (&tls.cert_file, &tls.key_file) {
                easy.ssl_cert(cert).map_err(setopt)?;
                easy.ssl_key(key).map_err(setopt)?;
            }
            if let Some(ca) = &tls.ca_file {
                easy.cainfo(ca).map_err(setopt)?;
            }
            easy.ssl_verify_peer(!tls.insecure_skip_verify)
                .map_err(setopt)?;
            easy.ssl_verify_host(!tls.insecure_skip_verify)
                .map_err(setopt)?;
        }

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(setopt)?;
            transfer
                .perform()
                .map_err(|e| classify_perform_error(req, self.tls.as_ref(), e))?;
        }

        let status = easy.response_code().map_err(|e| GetterError::Network {
            scheme: req.scheme.clone(),
            locator: req.url.clone(),
            source: e,
        })?;
        Ok(Response { status, body })
    }

    fn checkout(&self) -> Easy {
        let pooled = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match pooled {
            Some(mut easy) => {
                easy.reset();
                easy
            }
            None => Easy::new(),
        }
    }

    fn checkin(&self, easy: Easy) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_HANDLES {
            idle.push(easy);
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("tls", &self.tls).finish()
    }
}

/// Returns the shared default client when `opts` has no TLS settings,
/// otherwise validates the TLS material and builds a dedicated client whose
/// server name is the pre-bound locator's host. Performs no network IO.
pub fn build_client(opts: &Options) -> Result<Arc<HttpClient>, GetterError> {
    build_client_with(opts, None)
}

/// Like [`build_client`], but verifies `target`'s host instead of the
/// pre-bound locator's.
pub fn build_client_for(opts: &Options, target: &str) -> Result<Arc<HttpClient>, GetterError> {
    build_client_with(opts, Some(target))
}

fn build_client_with(opts: &Options, target: Option<&str>) -> Result<Arc<HttpClient>, GetterError> {
    match TlsConfig::describe(opts, target)? {
        None => Ok(HttpClient::shared_default()),
        Some(tls) => {
            tls.load(target.unwrap_or(opts.locator()))?;
            tracing::debug!(
                "built TLS client for server name {:?} (insecure={})",
                tls.server_name,
                tls.insecure_skip_verify
            );
            Ok(Arc::new(HttpClient::new(Some(tls))))
        }
    }
}

/// Local certificate/CA problems are credential errors; the rest is network.
fn classify_perform_error(req: &Request, tls: Option<&TlsConfig>, e: curl::Error) -> GetterError {
    if e.is_ssl_certproblem() || e.is_ssl_cacert_badfile() {
        let path = tls
            .and_then(|t| {
                if e.is_ssl_cacert_badfile() {
                    t.ca_file.clone()
                } else {
                    t.cert_file.clone()
                }
            })
            .unwrap_or_default();
        return GetterError::credential(&req.url, &path, e);
    }
    GetterError::Network {
        scheme: req.scheme.clone(),
        locator: req.url.clone(),
        source: e,
    }
}
