//! Configuration source loading and composition

use crate::validation::Validate;
use crate::{ApplicationConfig, ConfigResult};
use std::path::Path;

/// Trait for loading configuration from different sources
///
/// Each source layers its values on top of the configuration assembled by
/// lower-priority sources.
pub trait ConfigurationSource {
    /// Apply this source on top of `base`
    ///
    /// # Errors
    /// Returns configuration loading errors
    fn load(&self, base: ApplicationConfig) -> ConfigResult<ApplicationConfig>;

    /// Get the name of this configuration source
    fn name(&self) -> &str;

    /// Get the priority of this source (higher number = higher priority)
    fn priority(&self) -> u8;

    /// Whether a failure to load this source aborts loading entirely
    fn is_required(&self) -> bool {
        false
    }
}

/// Load configuration from environment variables
pub struct EnvironmentSource;

impl ConfigurationSource for EnvironmentSource {
    fn load(&self, base: ApplicationConfig) -> ConfigResult<ApplicationConfig> {
        Ok(base.with_env_overrides())
    }

    fn name(&self) -> &'static str {
        "environment"
    }

    fn priority(&self) -> u8 {
        100 // Highest priority - environment variables override everything
    }
}

/// Load configuration from TOML file
///
/// Only the keys present in the file replace values in the base
/// configuration, so a file may set a single field.
pub struct TomlFileSource {
    path: std::path::PathBuf,
}

impl TomlFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigurationSource for TomlFileSource {
    fn load(&self, base: ApplicationConfig) -> ConfigResult<ApplicationConfig> {
        let content = std::fs::read_to_string(&self.path)?;
        let overlay: toml::Table = toml::from_str(&content)?;

        let toml::Value::Table(mut merged) =
            toml::Value::try_from(&base).map_err(|e| crate::ConfigError::Generic {
                message: format!("Failed to serialize base configuration: {e}"),
            })?
        else {
            return Err(crate::ConfigError::Generic {
                message: "Base configuration did not serialize to a table".to_string(),
            });
        };
        merge_tables(&mut merged, overlay);

        Ok(toml::Value::Table(merged).try_into()?)
    }

    fn name(&self) -> &'static str {
        "toml_file"
    }

    fn priority(&self) -> u8 {
        50 // Medium priority - below env vars, above defaults
    }

    fn is_required(&self) -> bool {
        true
    }
}

/// Type alias for configuration sources
type ConfigSources = Vec<Box<dyn ConfigurationSource>>;

/// Configuration loader that combines multiple sources
pub struct ConfigurationLoader {
    sources: ConfigSources,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_source(mut self, source: Box<dyn ConfigurationSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Load configuration from all sources with priority ordering
    ///
    /// # Errors
    /// Returns loading errors from required sources, or validation errors
    pub fn load(&self) -> ConfigResult<ApplicationConfig> {
        let mut config = ApplicationConfig::default();

        // Sort sources by priority (lowest first, so highest priority overwrites)
        let mut sorted_sources = self.sources.iter().collect::<Vec<_>>();
        sorted_sources.sort_by_key(|source| source.priority());

        for source in sorted_sources {
            match source.load(config.clone()) {
                Ok(layered) => {
                    tracing::debug!("Loaded configuration from source: {}", source.name());
                    config = layered;
                }
                Err(e) if source.is_required() => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to load from source {}: {}", source.name(), e);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`, overlay values winning
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::FetchFailurePolicy;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_toml_source_overrides_only_present_keys() {
        let file = write_config(
            r#"
            [search]
            fetch_failure_policy = "abort"

            [github]
            per_page = 50
            "#,
        );

        let config = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::new(file.path())))
            .load()
            .unwrap();

        assert_eq!(config.search.fetch_failure_policy, FetchFailurePolicy::Abort);
        assert_eq!(config.github.per_page, 50);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.search.max_concurrency, 5);
    }

    #[test]
    fn test_missing_toml_file_is_an_error() {
        let result = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::new("/nonexistent/codehound.toml")))
            .load();

        assert!(matches!(result, Err(crate::ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let file = write_config(
            r#"
            [search]
            max_concurrency = 0
            "#,
        );

        let result = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::new(file.path())))
            .load();

        assert!(result.is_err());
    }

    #[test]
    fn test_environment_source_loading() {
        let config = ConfigurationLoader::new()
            .add_source(Box::new(EnvironmentSource))
            .load();

        assert!(config.is_ok());
    }

    #[test]
    fn test_merge_tables_is_recursive() {
        let mut base: toml::Table = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Table = toml::from_str("[a]\ny = 3").unwrap();

        merge_tables(&mut base, overlay);

        let a = base.get("a").and_then(toml::Value::as_table).unwrap();
        assert_eq!(a.get("x").and_then(toml::Value::as_integer), Some(1));
        assert_eq!(a.get("y").and_then(toml::Value::as_integer), Some(3));
    }
}
