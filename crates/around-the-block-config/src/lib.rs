use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid file pattern {pattern:?} in {config_path}: {source}")]
    InvalidPattern {
        config_path: PathBuf,
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Write toggled files back instead of printing them
    pub in_place: bool,
    /// File name globs the CLI will toggle without `--force`
    pub file_patterns: Vec<String>,
    /// Where to copy a file before overwriting it in place
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            in_place: false,
            file_patterns: ["*.rb", "*.rake", "*.gemspec", "*.ru", "Gemfile", "Rakefile"]
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
            backup_dir: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        for pattern in &config.file_patterns {
            Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                config_path: config_path.to_path_buf(),
                pattern: pattern.clone(),
                source,
            })?;
        }

        // Expand shell variables and tilde in the backup directory
        config.backup_dir = config
            .backup_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the user's config, falling back to defaults when there is none
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/around-the-block");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Whether `path`'s file name matches one of the configured patterns.
    ///
    /// Compiles the patterns on every call; use [`Config::file_matcher`] when
    /// checking many paths.
    pub fn accepts(&self, path: &Path) -> bool {
        self.file_matcher().accepts(path)
    }

    /// Compiled form of `file_patterns`. Invalid patterns are skipped; loading
    /// already rejects them.
    pub fn file_matcher(&self) -> FileMatcher {
        FileMatcher {
            patterns: self
                .file_patterns
                .iter()
                .filter_map(|pattern| Pattern::new(pattern).ok())
                .collect(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

/// File name globs compiled once
#[derive(Debug, Clone, PartialEq)]
pub struct FileMatcher {
    patterns: Vec<Pattern>,
}

impl FileMatcher {
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|pattern| pattern.matches(file_name))
    }
}
