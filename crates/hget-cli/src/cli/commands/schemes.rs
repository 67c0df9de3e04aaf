//! `hget schemes` – list registered schemes.

use anyhow::Result;
use hget_core::Providers;

pub fn run_schemes(providers: &Providers) -> Result<()> {
    for scheme in providers.schemes() {
        println!("{scheme}");
    }
    Ok(())
}
