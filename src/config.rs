//! Configuration management for instanlp using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::corenlp::CoreNlpConfig;

/// Default number of accounts processed concurrently.
pub const DEFAULT_WORKERS: usize = 2;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the scraped dataset (one directory per account).
    pub dataset_path: PathBuf,
    /// Accounts processed concurrently by batch commands.
    pub workers: usize,
    /// CoreNLP client configuration.
    pub corenlp: CoreNlpConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/Documents/instanlp/dataset
        // Falls back gracefully: Documents dir -> Home dir -> Current dir
        let dataset_path = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("instanlp")
            .join("dataset");

        Self {
            dataset_path,
            workers: DEFAULT_WORKERS,
            corenlp: CoreNlpConfig::default(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dataset directory path.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "dataset")]
    pub dataset_path: Option<String>,
    /// Accounts processed concurrently.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// CoreNLP server configuration.
    #[serde(default, skip_serializing_if = "CoreNlpConfig::is_default")]
    pub corenlp: CoreNlpConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers instanlp config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("instanlp").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found, use defaults with env overrides
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config contents, choosing the format from the path's extension.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        // Env wins over file values
        config.corenlp = config.corenlp.with_env_overrides();
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
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
        if let Some(ref dataset_path) = self.dataset_path {
            settings.dataset_path = self.resolve_path(dataset_path, base_dir);
        }
        if let Some(workers) = self.workers {
            settings.workers = workers.max(1);
        }
        settings.corenlp = self.corenlp.clone();
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Dataset directory (--dataset flag), highest precedence.
    pub dataset: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
///
/// Precedence for the dataset path: `--dataset` > `DATASET_PATH` > config file > default.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = config.base_dir().unwrap_or_else(|| cwd.clone());

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(dataset) = std::env::var("DATASET_PATH")
        .ok()
        .filter(|s| !s.is_empty())
    {
        tracing::debug!("Using DATASET_PATH from environment: {}", dataset);
        settings.dataset_path = config.resolve_path(&dataset, &cwd);
    }

    if let Some(dataset) = options.dataset {
        settings.dataset_path = config.resolve_path(&dataset.to_string_lossy(), &cwd);
    }

    (settings, config)
}
