//! Tests for validated configuration.

use std::time::Duration;

use crate::model::ServerVersion;

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};

/// Helper to create CLI args from a slice; `variants` is appended as the subcommand.
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["dsconfig-sync"];
    full_args.extend(args);
    full_args.push("variants");
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

const REQUIRED: [&str; 4] = [
    "--url",
    "https://ds.example.com:1443",
    "--server-version",
    "10.0.0.0",
];

mod required_fields {
    use super::*;

    #[test]
    fn missing_url_returns_error() {
        let cli = cli(&["--server-version", "10.0.0.0"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { field: "url", .. })
        ));
    }

    #[test]
    fn missing_version_returns_error() {
        let cli = cli(&["--url", "https://ds.example.com"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: "version",
                ..
            })
        ));
    }

    #[test]
    fn required_fields_from_cli() {
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), None).unwrap();

        assert_eq!(config.url.as_str(), "https://ds.example.com:1443/");
        assert_eq!(config.version, ServerVersion::V10_0);
    }

    #[test]
    fn required_fields_from_toml() {
        let toml = toml(
            r#"
            [server]
            url = "https://ds.example.com"
            version = "9.3"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.url.as_str(), "https://ds.example.com/");
        assert_eq!(config.version, ServerVersion::V9_3);
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = toml(
            r#"
            [server]
            url = "https://toml.example.com"
            version = "9.1.0.0"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), Some(&toml)).unwrap();

        assert_eq!(config.url.host_str(), Some("ds.example.com"));
        assert_eq!(config.version, ServerVersion::V10_0);
    }
}

mod validation {
    use super::*;

    #[test]
    fn invalid_url_is_rejected() {
        let cli = cli(&["--url", "not a url", "--server-version", "10.0.0.0"]);

        assert!(matches!(
            ValidatedConfig::from_raw(&cli, None),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn non_hierarchical_url_is_rejected() {
        let cli = cli(&["--url", "mailto:admin@example.com", "--server-version", "10.0.0.0"]);

        assert!(matches!(
            ValidatedConfig::from_raw(&cli, None),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn malformed_version_is_rejected() {
        let cli = cli(&["--url", "https://ds.example.com", "--server-version", "ten"]);

        assert!(matches!(
            ValidatedConfig::from_raw(&cli, None),
            Err(ConfigError::InvalidVersion(_))
        ));
    }

    #[test]
    fn unsupported_version_lists_supported_ones() {
        let cli = cli(&["--url", "https://ds.example.com", "--server-version", "8.3.0.0"]);

        let err = ValidatedConfig::from_raw(&cli, None).unwrap_err();

        assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));
        assert!(err.to_string().contains("10.1.0.0"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--timeout", "0"]);

        assert!(matches!(
            ValidatedConfig::from_raw(&cli(&args), None),
            Err(ConfigError::InvalidDuration { field: "timeout", .. })
        ));
    }
}

mod timeout {
    use super::*;

    #[test]
    fn defaults_to_thirty_seconds() {
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), None).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn toml_value_is_used() {
        let toml = toml("[server]\ntimeout = 5");
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), Some(&toml)).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn cli_value_wins() {
        let toml = toml("[server]\ntimeout = 5");
        let mut args = REQUIRED.to_vec();
        args.extend(["--timeout", "7"]);

        let config = ValidatedConfig::from_raw(&cli(&args), Some(&toml)).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(7));
    }
}

mod headers {
    use super::*;

    #[test]
    fn both_header_formats_are_accepted() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--header", "X-One=1", "--header", "X-Two: 2"]);

        let config = ValidatedConfig::from_raw(&cli(&args), None).unwrap();

        assert_eq!(config.headers.get("x-one").unwrap(), "1");
        assert_eq!(config.headers.get("x-two").unwrap(), "2");
    }

    #[test]
    fn malformed_header_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--header", "no-separator"]);

        assert!(matches!(
            ValidatedConfig::from_raw(&cli(&args), None),
            Err(ConfigError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--header", "bad name=1"]);

        assert!(matches!(
            ValidatedConfig::from_raw(&cli(&args), None),
            Err(ConfigError::InvalidHeaderName { .. })
        ));
    }

    #[test]
    fn cli_header_replaces_toml_header() {
        let toml = toml("[server.headers]\nX-Source = \"toml\"\nX-Other = \"kept\"");
        let mut args = REQUIRED.to_vec();
        args.extend(["--header", "X-Source=cli"]);

        let config = ValidatedConfig::from_raw(&cli(&args), Some(&toml)).unwrap();

        assert_eq!(config.headers.get("x-source").unwrap(), "cli");
        assert_eq!(config.headers.get("x-other").unwrap(), "kept");
    }

    #[test]
    fn bearer_sets_sensitive_authorization() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--bearer", "t0ken"]);

        let config = ValidatedConfig::from_raw(&cli(&args), None).unwrap();
        let auth = config.headers.get(http::header::AUTHORIZATION).unwrap();

        assert_eq!(auth, "Bearer t0ken");
        assert!(auth.is_sensitive());
    }

    #[test]
    fn bearer_overrides_authorization_header() {
        let toml = toml("[server]\nbearer = \"from-toml\"\n[server.headers]\nAuthorization = \"Basic abc\"");

        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), Some(&toml)).unwrap();

        assert_eq!(
            config.headers.get(http::header::AUTHORIZATION).unwrap(),
            "Bearer from-toml"
        );
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[server]\nurl = \"https://ds.example.com\"\nversion = \"10.1.0.0\"\n",
        )
        .unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let config = ValidatedConfig::load(&cli(&["--config", path_arg.as_str()])).unwrap();

        assert_eq!(config.version, ServerVersion::V10_1);
    }

    #[test]
    fn load_without_config_uses_cli_only() {
        let config = ValidatedConfig::load(&cli(&REQUIRED)).unwrap();
        assert_eq!(config.version, ServerVersion::V10_0);
    }

    #[test]
    fn display_omits_header_values() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--bearer", "t0ken"]);

        let config = ValidatedConfig::from_raw(&cli(&args), None).unwrap();
        let shown = config.to_string();

        assert!(shown.contains("version: 10.0.0.0"));
        assert!(shown.contains("headers: 1"));
        assert!(!shown.contains("t0ken"));
    }

    #[test]
    fn write_default_config_creates_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dsconfig-sync.toml");

        write_default_config(&path).unwrap();

        assert!(TomlConfig::load(&path).is_ok());
    }

    #[test]
    fn write_default_config_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.toml");

        assert!(matches!(
            write_default_config(&path),
            Err(ConfigError::FileWrite { .. })
        ));
    }
}

mod state_file {
    use std::path::{Path, PathBuf};

    use super::*;

    #[test]
    fn defaults_to_path_next_to_model() {
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), None).unwrap();

        assert_eq!(config.state_file, None);
        assert_eq!(
            config.state_file_for(Path::new("deploy/site.toml")),
            PathBuf::from("deploy/site.state.json")
        );
    }

    #[test]
    fn toml_value_is_used() {
        let toml = toml("[state]\nfile = \"/var/lib/dsconfig-sync/state.json\"");

        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), Some(&toml)).unwrap();

        assert_eq!(
            config.state_file_for(Path::new("site.toml")),
            PathBuf::from("/var/lib/dsconfig-sync/state.json")
        );
    }

    #[test]
    fn cli_value_wins() {
        let toml = toml("[state]\nfile = \"from-toml.json\"");
        let mut args = REQUIRED.to_vec();
        args.extend(["--state-file", "from-cli.json"]);

        let config = ValidatedConfig::from_raw(&cli(&args), Some(&toml)).unwrap();

        assert_eq!(config.state_file, Some(PathBuf::from("from-cli.json")));
    }
}
