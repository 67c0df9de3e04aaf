use crate::options::{
    with_basic_auth, with_insecure_skip_verify_tls, with_pass_credentials_all,
    with_tls_client_config, with_timeout, with_user_agent, GetterOption,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment-level settings loaded from `~/.config/hget/config.toml`.
///
/// Populated fields become the default options every getter handed out by
/// the registry starts from; per-call options compose on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default CA bundle for verifying servers.
    #[serde(default)]
    pub ca_file: Option<PathBuf>,
    /// Client certificate for mutual TLS (requires `key_file`).
    #[serde(default)]
    pub cert_file: Option<PathBuf>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    /// Repository username; an empty string still enables Basic auth.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
    /// Request timeout in seconds (None or 0 = transport default).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub pass_credentials_all: bool,
    /// Register the `file` scheme.
    #[serde(default)]
    pub enable_file_scheme: bool,
}

impl Settings {
    /// Default CA bundle path, if configured.
    pub fn ca_file(&self) -> Option<&Path> {
        self.ca_file.as_deref()
    }

    /// Whether the optional `file` scheme should be registered.
    pub fn file_scheme_enabled(&self) -> bool {
        self.enable_file_scheme
    }

    /// Options derived from the populated fields, in a fixed order.
    pub fn default_options(&self) -> Vec<GetterOption> {
        let mut opts = Vec::new();
        if self.cert_file.is_some() || self.key_file.is_some() || self.ca_file.is_some() {
            opts.push(with_tls_client_config(
                self.cert_file.clone().unwrap_or_default(),
                self.key_file.clone().unwrap_or_default(),
                self.ca_file.clone().unwrap_or_default(),
            ));
        }
        if self.insecure_skip_tls_verify {
            opts.push(with_insecure_skip_verify_tls(true));
        }
        if let Some(username) = &self.username {
            opts.push(with_basic_auth(
                username.clone(),
                self.password.clone().unwrap_or_default(),
            ));
        }
        if let Some(ua) = &self.user_agent {
            opts.push(with_user_agent(ua.clone()));
        }
        if let Some(secs) = self.timeout_secs {
            opts.push(with_timeout(Duration::from_secs(secs)));
        }
        if self.pass_credentials_all {
            opts.push(with_pass_credentials_all(true));
        }
        opts
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load settings from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Settings> {
    let path = config_path()?;
    if !path.exists() {
        let default_settings = Settings::default();
        let toml = toml::to_string_pretty(&default_settings)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_settings);
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<Settings> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{apply_options, Options};

    #[test]
    fn default_settings_have_no_options() {
        let s = Settings::default();
        assert!(s.default_options().is_empty());
        assert!(s.ca_file().is_none());
        assert!(!s.file_scheme_enabled());
    }

    #[test]
    fn settings_toml_roundtrip() {
        let s = Settings {
            ca_file: Some(PathBuf::from("/etc/hget/ca.pem")),
            username: Some("admin".to_string()),
            timeout_secs: Some(30),
            enable_file_scheme: true,
            ..Settings::default()
        };
        let toml = toml::to_string_pretty(&s).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn settings_toml_custom_values() {
        let toml = r#"
            ca_file = "/etc/ssl/repo-ca.pem"
            username = ""
            password = "secret"
            insecure_skip_tls_verify = true
            timeout_secs = 10
        "#;
        let s: Settings = toml::from_str(toml).unwrap();
        assert_eq!(s.ca_file(), Some(Path::new("/etc/ssl/repo-ca.pem")));
        assert!(s.insecure_skip_tls_verify);
        assert!(!s.pass_credentials_all);

        let opts = apply_options(&Options::default(), &s.default_options()).unwrap();
        assert_eq!(opts.ca_file, Some(PathBuf::from("/etc/ssl/repo-ca.pem")));
        assert!(opts.cert_file.is_none());
        assert_eq!(opts.username.as_deref(), Some(""));
        assert_eq!(opts.password.as_deref(), Some("secret"));
        assert!(opts.insecure_skip_verify_tls);
        assert_eq!(opts.timeout, Duration::from_secs(10));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "user_agent = \"ci-bot/1.0\"\nenable_file_scheme = true\n").unwrap();
        let s = load_from(&path).unwrap();
        assert_eq!(s.user_agent.as_deref(), Some("ci-bot/1.0"));
        assert!(s.file_scheme_enabled());
    }

    #[test]
    fn load_from_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }
}
