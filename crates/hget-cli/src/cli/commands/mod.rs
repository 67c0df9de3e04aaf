//! CLI command handlers.

mod get;
mod schemes;

pub use get::run_get;
pub use schemes::run_schemes;
