//! Scheme-dispatched getters: fetch the raw bytes behind a URL.
//!
//! A [`Providers`] registry is built once from [`Settings`] and maps scheme
//! names to getter constructors. Getters take an ordered list of
//! [`GetterOption`]s that configure the request and its transport (Basic auth,
//! user agent, TLS client certificates, CA bundle, timeouts).

pub mod error;
pub mod file;
pub mod getter;
pub mod http;
pub mod logging;
pub mod options;
pub mod registry;
pub mod settings;
pub mod tls;
pub mod transport;
pub mod user_agent;

pub use error::GetterError;
pub use getter::{Buffer, Getter};
pub use options::{
    apply_options, with_accept_header, with_basic_auth, with_ca_file, with_client_certificate,
    with_insecure_skip_verify_tls, with_pass_credentials_all, with_timeout,
    with_tls_client_config, with_url, with_user_agent, GetterOption, Options,
};
pub use registry::{Provider, Providers};
pub use settings::Settings;
