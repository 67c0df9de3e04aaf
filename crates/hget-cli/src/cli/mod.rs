//! CLI for the hget getters.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hget_core::{settings, GetterOption, Providers};
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_get, run_schemes};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hget")]
#[command(about = "Fetch the raw bytes behind a URL", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/hget/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL and write its body to stdout or a file.
    Get {
        /// Locator to fetch (http, https, or file when enabled).
        url: String,

        /// Write the body here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        opts: GetOpts,
    },

    /// List the registered schemes.
    Schemes,
}

/// Per-call getter options.
#[derive(Debug, Default, Args)]
pub struct GetOpts {
    /// Basic auth username (an empty value still sends credentials).
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long, requires = "username")]
    pub password: Option<String>,
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
    /// Value of the Accept header.
    #[arg(long, value_name = "MIME")]
    pub accept: Option<String>,
    /// Client certificate (PEM) for mutual TLS.
    #[arg(long, value_name = "FILE", requires = "key_file")]
    pub cert_file: Option<PathBuf>,
    #[arg(long, value_name = "FILE", requires = "cert_file")]
    pub key_file: Option<PathBuf>,
    /// CA bundle (PEM) used to verify the server. A configured client
    /// certificate is kept.
    #[arg(long, value_name = "FILE")]
    pub ca_file: Option<PathBuf>,
    #[arg(long)]
    pub insecure_skip_tls_verify: bool,
    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Keep credentials when redirected to another host.
    #[arg(long)]
    pub pass_credentials: bool,
}

impl GetOpts {
    /// Options in a fixed order; only flags given on the command line are included.
    pub fn to_options(&self) -> Vec<GetterOption> {
        let mut opts = Vec::new();
        if let Some(username) = &self.username {
            opts.push(hget_core::with_basic_auth(
                username.clone(),
                self.password.clone().unwrap_or_default(),
            ));
        }
        if let Some(ua) = &self.user_agent {
            opts.push(hget_core::with_user_agent(ua.clone()));
        }
        if let Some(accept) = &self.accept {
            opts.push(hget_core::with_accept_header(accept.clone()));
        }
        // Each flag overrides only its own part of the configured TLS material.
        if let (Some(cert), Some(key)) = (&self.cert_file, &self.key_file) {
            opts.push(hget_core::with_client_certificate(cert, key));
        }
        if let Some(ca) = &self.ca_file {
            opts.push(hget_core::with_ca_file(ca));
        }
        if self.insecure_skip_tls_verify {
            opts.push(hget_core::with_insecure_skip_verify_tls(true));
        }
        if let Some(secs) = self.timeout {
            opts.push(hget_core::with_timeout(Duration::from_secs(secs)));
        }
        if self.pass_credentials {
            opts.push(hget_core::with_pass_credentials_all(true));
        }
        opts
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let settings = match &cli.config {
            Some(path) => settings::load_from(path)?,
            None => settings::load_or_init()?,
        };
        tracing::debug!("loaded settings: {:?}", settings);
        let providers = Providers::all(&settings);

        match cli.command {
            CliCommand::Get { url, output, opts } => {
                run_get(&providers, &url, output.as_deref(), &opts)?
            }
            CliCommand::Schemes => run_schemes(&providers)?,
        }

        Ok(())
    }
}
