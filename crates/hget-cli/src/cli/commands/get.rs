//! `hget get <url>` – fetch a locator and write its body.

use crate::cli::GetOpts;
use anyhow::{Context, Result};
use hget_core::Providers;
use std::io::Write;
use std::path::Path;

pub fn run_get(
    providers: &Providers,
    url: &str,
    output: Option<&Path>,
    opts: &GetOpts,
) -> Result<()> {
    let mut options = vec![hget_core::with_url(url)];
    options.extend(opts.to_options());

    let body = providers.get(url, &options)?;
    tracing::info!("fetched {} bytes from {}", body.len(), url);

    match output {
        Some(path) => std::fs::write(path, body.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
