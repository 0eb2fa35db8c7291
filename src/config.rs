//! Configuration management for urtica using the prefer crate.
//!
//! Settings come from, in increasing priority: built-in defaults, a config
//! file (`--config`, or `urtica.{toml,yaml,json}` discovered by prefer),
//! `URTICA_*` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogConfig;
use crate::extract::ExtractionConfig;
use crate::pipeline::PipelineConfig;
use crate::terms::TermsConfig;
use crate::text::NormalizerConfig;

/// Name prefer uses to discover config files.
pub const CONFIG_NAME: &str = "urtica";

/// Default data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "data";

const CATALOG_FILENAME: &str = "catalog.csv";
const STATEMENTS_FILENAME: &str = "statements.csv";
const LINES_FILENAME: &str = "statements.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Directory holding the catalog, statements and exports.
    pub data_dir: PathBuf,
    pub normalizer: NormalizerConfig,
    pub pipeline: PipelineConfig,
    pub extraction: ExtractionConfig,
    pub catalog: CatalogConfig,
    pub terms: TermsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            normalizer: NormalizerConfig::default(),
            pipeline: PipelineConfig::default(),
            extraction: ExtractionConfig::default(),
            catalog: CatalogConfig::default(),
            terms: TermsConfig::default(),
        }
    }
}

impl Settings {
    /// Default location of the document catalog.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILENAME)
    }

    /// Default location of the processed statements.
    pub fn statements_path(&self) -> PathBuf {
        self.data_dir.join(STATEMENTS_FILENAME)
    }

    /// Default location of the one-statement-per-line export.
    pub fn lines_path(&self) -> PathBuf {
        self.data_dir.join(LINES_FILENAME)
    }

    /// Apply `URTICA_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = lookup("URTICA_DATA_DIR").filter(|s| !s.is_empty()) {
            tracing::debug!("Using URTICA_DATA_DIR from environment: {}", data_dir);
            self.data_dir = PathBuf::from(shellexpand::tilde(&data_dir).as_ref());
        }

        if let Some(workers) = lookup("URTICA_WORKERS").filter(|s| !s.is_empty()) {
            match workers.trim().parse::<usize>() {
                Ok(n) if n > 0 => {
                    tracing::debug!("Using URTICA_WORKERS from environment: {}", n);
                    self.pipeline.workers = n;
                }
                _ => tracing::warn!("Ignoring invalid URTICA_WORKERS value: {}", workers),
            }
        }
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub terms: TermsConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    ///
    /// Falls back to defaults when no config file is found or the discovered
    /// file cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports TOML and YAML by extension; anything else is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config file contents in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        settings.normalizer = self.normalizer.clone();
        settings.pipeline = self.pipeline.clone();
        settings.extraction = self.extraction.clone();
        settings.catalog = self.catalog.clone();
        settings.terms = self.terms.clone();
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--data flag), overrides config and environment.
    pub data: Option<PathBuf>,
}

/// Load settings with explicit options.
///
/// An explicit config path must load; a discovered one is best effort.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env_overrides(|key| std::env::var(key).ok());

    if let Some(data_dir) = options.data {
        settings.data_dir = data_dir;
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_toml_partial_sections() {
        let config = Config::parse(
            r#"
data_dir = "corpus"

[pipeline]
workers = 2

[terms]
stop_words = ["sref"]
"#,
            "toml",
        )
        .unwrap();

        assert_eq!(config.data_dir.as_deref(), Some("corpus"));
        assert_eq!(config.pipeline.workers, 2);
        assert_eq!(config.pipeline.min_statement_length, 100);
        assert_eq!(config.terms.stop_words, vec!["sref".to_string()]);
        assert!(config.terms.exclude_article_names);
        assert_eq!(config.extraction.pdftotext, "pdftotext");
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = Config::parse("normalizer:\n  skip_headers: true\n", "yml").unwrap();
        assert!(yaml.normalizer.skip_headers);

        let json = Config::parse(r#"{"catalog": {"extension": "txt"}}"#, "json").unwrap();
        assert_eq!(json.catalog.extension, "txt");

        assert!(matches!(
            Config::parse("workers = [", "toml"),
            Err(ConfigError::Parse { format: "TOML", .. })
        ));
    }

    #[test]
    fn test_apply_resolves_relative_data_dir() {
        let config = Config {
            data_dir: Some("corpus".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/urtica"));
        assert_eq!(settings.data_dir, PathBuf::from("/etc/urtica/corpus"));
        assert_eq!(settings.catalog_path(), PathBuf::from("/etc/urtica/corpus/catalog.csv"));

        let absolute = Config {
            data_dir: Some("/srv/data".to_string()),
            ..Default::default()
        };
        absolute.apply_to_settings(&mut settings, Path::new("/etc/urtica"));
        assert_eq!(settings.data_dir, PathBuf::from("/srv/data"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("URTICA_DATA_DIR", "/tmp/urtica"), ("URTICA_WORKERS", "3")]);
        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/urtica"));
        assert_eq!(settings.pipeline.workers, 3);

        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| (key == "URTICA_WORKERS").then(|| "0".to_string()));
        assert_eq!(settings.pipeline.workers, 8);
    }

    #[tokio::test]
    async fn test_load_from_path_sets_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urtica.toml");
        std::fs::write(&path, "data_dir = \"out\"\n").unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            config_path: Some(path.clone()),
            data: None,
        })
        .await
        .unwrap();

        assert_eq!(config.source_path, Some(path));
        if std::env::var("URTICA_DATA_DIR").is_err() {
            assert_eq!(settings.data_dir, dir.path().join("out"));
        }
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_an_error() {
        let result = load_settings_with_options(LoadOptions {
            config_path: Some(PathBuf::from("/definitely/not/urtica.toml")),
            data: Some(PathBuf::from("elsewhere")),
        })
        .await;
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_settings_to_toml() {
        let rendered = Settings::default().to_toml().unwrap();
        assert!(rendered.contains("data_dir = \"data\""));
        assert!(rendered.contains("[pipeline]"));
        assert!(rendered.contains("workers = 8"));
    }
}
