//! Configuration assembly for the command line
//!
//! Layers, lowest priority first: built-in defaults, the TOML file (the
//! `--config-file` argument, else `<config dir>/codehound/config.toml` when it
//! exists), `CODEHOUND_*` environment variables, then command-line flags.

use anyhow::Context;
use codehound_config::ApplicationConfig;
use codehound_config::source::{ConfigurationLoader, EnvironmentSource, TomlFileSource};
use codehound_config::validation::Validate;
use std::path::{Path, PathBuf};

/// Values given as command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub token: Option<String>,
    pub max_requests: Option<usize>,
    pub log_dir: Option<PathBuf>,
}

impl CliOverrides {
    fn apply(self, config: &mut ApplicationConfig) {
        if let Some(token) = self.token {
            config.github.token = Some(token);
        }
        if let Some(max_requests) = self.max_requests {
            config.search.max_concurrency = max_requests;
        }
        if let Some(log_dir) = self.log_dir {
            config.telemetry.log_dir = Some(log_dir);
        }
    }
}

/// Load and validate the effective configuration
///
/// # Errors
/// Returns an error if the configuration file cannot be read or parsed, or
/// if the final configuration is invalid
pub fn load(
    config_file: Option<&Path>,
    overrides: CliOverrides,
) -> anyhow::Result<ApplicationConfig> {
    let mut loader = ConfigurationLoader::new().add_source(Box::new(EnvironmentSource));

    if let Some(path) = config_file.map(Path::to_path_buf).or_else(default_config_file) {
        loader = loader.add_source(Box::new(TomlFileSource::new(&path)));
    }

    let mut config = loader.load().context("Failed to load configuration")?;
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// Per-user configuration file, if one exists
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("codehound").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_flags_override_file_values() {
        let file = config_file("[search]\nmax_concurrency = 3\n\n[github]\ntoken = \"from-file\"\n");

        let config = load(
            Some(file.path()),
            CliOverrides {
                token: Some("from-flag".to_string()),
                max_requests: Some(8),
                log_dir: None,
            },
        )
        .unwrap();

        assert_eq!(config.github.token.as_deref(), Some("from-flag"));
        assert_eq!(config.search.max_concurrency, 8);
    }

    #[test]
    fn test_file_values_apply_without_flags() {
        let file = config_file("[search]\nmax_concurrency = 3\n");

        let config = load(Some(file.path()), CliOverrides::default()).unwrap();

        assert_eq!(config.search.max_concurrency, 3);
    }

    #[test]
    fn test_zero_max_requests_is_rejected() {
        let file = config_file("");
        let result = load(
            Some(file.path()),
            CliOverrides {
                max_requests: Some(0),
                ..CliOverrides::default()
            },
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load(
            Some(Path::new("/nonexistent/codehound.toml")),
            CliOverrides::default(),
        );
        assert!(result.is_err());
    }
}
