//! HTTP(S) getter.

use crate::error::GetterError;
use crate::getter::{Buffer, Getter};
use crate::options::{apply_options, GetterOption, Options};
use crate::transport::{build_client, build_client_for, HttpClient, Request};
use crate::user_agent::default_user_agent;
use std::sync::Arc;
use url::Url;

/// Fetches over HTTP and HTTPS with the configured transport.
#[derive(Debug)]
pub struct HttpGetter {
    opts: Options,
    client: Arc<HttpClient>,
}

impl HttpGetter {
    /// Applies `options` to an empty record and builds the client for it.
    pub fn new(options: &[GetterOption]) -> Result<Self, GetterError> {
        let opts = apply_options(&Options::default(), options)?;
        let client = build_client(&opts)?;
        Ok(Self { opts, client })
    }

    /// Registry constructor.
    pub fn provide(options: &[GetterOption]) -> Result<Box<dyn Getter>, GetterError> {
        Ok(Box::new(HttpGetter::new(options)?))
    }

    /// Baseline options every call starts from.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// The client to fetch `target` with: the baseline client when its TLS
    /// settings and server name fit, otherwise a fresh one bound to `target`.
    fn client_for(&self, opts: &Options, target: &Url) -> Result<Arc<HttpClient>, GetterError> {
        if self.client.matches(opts, Some(target.as_str())) {
            Ok(Arc::clone(&self.client))
        } else {
            build_client_for(opts, target.as_str())
        }
    }
}

impl Getter for HttpGetter {
    fn get(&self, href: &str, options: &[GetterOption]) -> Result<Buffer, GetterError> {
        let opts = apply_options(&self.opts, options)?;
        let target = resolve_target(href, &opts)?;
        let client = self.client_for(&opts, &target)?;

        let req = Request {
            url: target.to_string(),
            scheme: target.scheme().to_string(),
            user_agent: opts.user_agent.clone().unwrap_or_else(default_user_agent),
            accept: opts.accept_header.clone(),
            credentials: credentials_for(&opts, &target),
            pass_credentials_all: opts.pass_credentials_all,
            timeout: opts.timeout,
        };

        tracing::debug!("GET {} (auth={})", req.url, req.credentials.is_some());
        let resp = client.execute(&req)?;
        if !(200..300).contains(&resp.status) {
            tracing::debug!("GET {} returned HTTP {}", req.url, resp.status);
            return Err(GetterError::Fetch {
                scheme: req.scheme,
                locator: req.url,
                status: resp.status,
                body: String::from_utf8_lossy(&resp.body).into_owned(),
            });
        }
        tracing::debug!("GET {} returned {} bytes", req.url, resp.body.len());
        Ok(Buffer::new(resp.body))
    }
}

/// `href` if given, otherwise the pre-bound locator.
fn resolve_target(href: &str, opts: &Options) -> Result<Url, GetterError> {
    let raw = if href.is_empty() {
        opts.url
            .as_deref()
            .ok_or_else(|| GetterError::configuration("", "no locator given"))?
    } else {
        href
    };
    let url = Url::parse(raw).map_err(|e| GetterError::configuration(raw, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GetterError::configuration(
            raw,
            format!("HTTP getter cannot fetch {:?} locators", other),
        )),
    }
}

/// Basic credentials to send to `target`, if any.
///
/// A username (even empty) enables Basic auth. When a locator was pre-bound,
/// credentials only go to that origin unless `pass_credentials_all` is set.
fn credentials_for(opts: &Options, target: &Url) -> Option<(String, String)> {
    let username = opts.username.as_ref()?;
    if !opts.pass_credentials_all {
        if let Some(bound) = opts.url.as_deref().and_then(|u| Url::parse(u).ok()) {
            if !same_origin(&bound, target) {
                tracing::warn!(
                    "withholding credentials for {}: bound to {}",
                    target,
                    bound.origin().ascii_serialization()
                );
                return None;
            }
        }
    }
    Some((username.clone(), opts.password.clone().unwrap_or_default()))
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
