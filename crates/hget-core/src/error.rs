//! Error type shared by options, transport construction, getters and the registry.

use std::path::{Path, PathBuf};

/// Failure of any getter operation.
///
/// Each variant carries enough context (locator, scheme or TLS file path, and
/// the underlying cause) to tell a credential misconfiguration apart from a
/// network outage without inspecting internals.
#[derive(Debug, thiserror::Error)]
pub enum GetterError {
    /// Malformed locator or an incomplete/conflicting option set.
    #[error("invalid configuration for {}: {reason}", display_locator(.locator))]
    Configuration { locator: String, reason: String },

    /// TLS client certificate, key or CA bundle unreadable or invalid.
    #[error("TLS credentials for {} unusable ({}): {reason}", display_locator(.locator), .path.display())]
    Credential {
        locator: String,
        path: PathBuf,
        reason: String,
    },

    /// No registered getter claims the scheme.
    #[error("scheme {scheme:?} not supported")]
    UnsupportedScheme { scheme: String },

    /// Connection, handshake or timeout failure reported by the transport.
    #[error("{scheme} request to {locator} failed: {source}")]
    Network {
        scheme: String,
        locator: String,
        #[source]
        source: curl::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("failed to fetch {locator} ({scheme}): HTTP {status}{}", display_body(.body))]
    Fetch {
        scheme: String,
        locator: String,
        status: u32,
        body: String,
    },
}

impl GetterError {
    pub(crate) fn configuration(locator: &str, reason: impl Into<String>) -> Self {
        GetterError::Configuration {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn credential(locator: &str, path: &Path, reason: impl ToString) -> Self {
        GetterError::Credential {
            locator: locator.to_string(),
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status of a `Fetch` error.
    pub fn status(&self) -> Option<u32> {
        match self {
            GetterError::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn display_locator(locator: &str) -> &str {
    if locator.is_empty() {
        "<unset locator>"
    } else {
        locator
    }
}

fn display_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}
