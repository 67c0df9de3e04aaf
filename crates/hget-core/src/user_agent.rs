//! Default `User-Agent` header.

/// Product name sent in the default `User-Agent`.
pub const PRODUCT_NAME: &str = "Hget";

/// Crate version as built.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// `"<ProductName>/<version>"`, with any leading `v` removed from the version.
pub fn default_user_agent() -> String {
    format_user_agent(PRODUCT_NAME, version())
}

fn format_user_agent(product: &str, version: &str) -> String {
    format!("{}/{}", product, version.trim_start_matches('v'))
}
