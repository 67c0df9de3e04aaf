//! Scheme registry: maps scheme names to getter constructors.
//!
//! Built once with [`Providers::all`] and never mutated afterwards; lookups
//! only read, so a `Providers` value can be shared between threads freely.

use crate::error::GetterError;
use crate::file::FileGetter;
use crate::getter::{Buffer, Getter};
use crate::http::HttpGetter;
use crate::options::GetterOption;
use crate::settings::Settings;

/// Builds a getter from an ordered option list.
pub type Constructor = fn(&[GetterOption]) -> Result<Box<dyn Getter>, GetterError>;

/// Schemes claimed by one getter variant plus its constructor.
#[derive(Clone)]
pub struct Provider {
    pub schemes: Vec<&'static str>,
    pub new: Constructor,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("schemes", &self.schemes).finish()
    }
}

impl Provider {
    pub fn provides(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    }
}

fn http_provider() -> Provider {
    Provider {
        schemes: vec!["http", "https"],
        new: HttpGetter::provide,
    }
}

fn file_provider() -> Provider {
    Provider {
        schemes: vec!["file"],
        new: FileGetter::provide,
    }
}

/// The registered providers and the default options derived from settings.
#[derive(Debug, Clone)]
pub struct Providers {
    providers: Vec<Provider>,
    defaults: Vec<GetterOption>,
}

impl Providers {
    /// Static providers merged with those enabled by `settings`.
    pub fn all(settings: &Settings) -> Self {
        let mut providers = vec![http_provider()];
        if settings.file_scheme_enabled() {
            providers.push(file_provider());
        }
        let defaults = settings.default_options();
        tracing::debug!(
            "registered schemes {:?} with {} default option(s)",
            providers.iter().flat_map(|p| p.schemes.iter()).collect::<Vec<_>>(),
            defaults.len()
        );
        Self {
            providers,
            defaults,
        }
    }

    /// Adds extra providers before the registry is shared. Earlier entries win
    /// on scheme conflicts.
    pub fn with_providers(mut self, extra: impl IntoIterator<Item = Provider>) -> Self {
        self.providers.extend(extra);
        self
    }

    /// Constructs the getter claiming `scheme`, preconfigured with the defaults.
    pub fn by_scheme(&self, scheme: &str) -> Result<Box<dyn Getter>, GetterError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.provides(scheme))
            .ok_or_else(|| GetterError::UnsupportedScheme {
                scheme: scheme.to_string(),
            })?;
        (provider.new)(&self.defaults)
    }

    /// Resolves the getter for `locator`'s scheme and fetches it.
    pub fn get(&self, locator: &str, options: &[GetterOption]) -> Result<Buffer, GetterError> {
        let url = url::Url::parse(locator)
            .map_err(|e| GetterError::configuration(locator, e.to_string()))?;
        self.by_scheme(url.scheme())?.get(locator, options)
    }

    /// Registered scheme names in registration order.
    pub fn schemes(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .flat_map(|p| p.schemes.iter().copied())
            .collect()
    }
}
