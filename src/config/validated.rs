//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use url::Url;

use crate::model::ServerVersion;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Base URL of the configuration API
    pub url: Url,

    /// Server version; selects attribute availability and defaults
    pub version: ServerVersion,

    /// HTTP headers sent with every request
    pub headers: HeaderMap,

    /// Per-request timeout
    pub timeout: Duration,

    /// Explicit state file; `None` keeps state next to each desired model
    pub state_file: Option<PathBuf>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ url: {}, version: {}, timeout: {}s, headers: {}, state_file: {} }}",
            self.url,
            self.version,
            self.timeout.as_secs(),
            self.headers.len(),
            self.state_file
                .as_ref()
                .map_or_else(|| "(per model)".to_string(), |p| p.display().to_string()),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`url`, `version`)
    /// - URL or version is invalid
    /// - Timeout is zero
    /// - Header format is invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: Self::resolve_url(cli, toml)?,
            version: Self::resolve_version(cli, toml)?,
            headers: Self::resolve_headers(cli, toml)?,
            timeout: Self::resolve_timeout(cli, toml)?,
            state_file: Self::resolve_state_file(cli, toml),
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.url.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(field::URL, "Use --url or set server.url in config file")
            })?;

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        Ok(url)
    }

    fn resolve_version(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<ServerVersion, ConfigError> {
        let version_str = cli
            .server_version
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.version.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::VERSION,
                    "Use --server-version or set server.version in config file",
                )
            })?;

        let version: ServerVersion = version_str.trim().parse()?;
        if !version.is_supported() {
            return Err(ConfigError::UnsupportedVersion {
                version: version.to_string(),
                supported: ServerVersion::SUPPORTED
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        Ok(version)
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        // TOML first so CLI can override
        if let Some(toml) = toml {
            for (name, value) in &toml.server.headers {
                headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
            }
        }

        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            headers.insert(parse_header_name(&name)?, parse_header_value(&name, &value)?);
        }

        let bearer = cli
            .bearer
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.bearer.as_deref()));

        if let Some(token) = bearer {
            let mut value = parse_header_value("Authorization", &format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.server.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_state_file(cli: &Cli, toml: Option<&TomlConfig>) -> Option<PathBuf> {
        cli.state_file
            .clone()
            .or_else(|| toml.and_then(|t| t.state.file.as_ref().map(PathBuf::from)))
    }

    /// State file for a desired model: the configured one, or the model's
    /// default.
    #[must_use]
    pub fn state_file_for(&self, model: &Path) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| defaults::state_file(model))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    s.split_once('=')
        .or_else(|| s.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| ConfigError::InvalidHeader {
            value: s.to_string(),
        })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
