use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use score_core::ImportType;

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_FILE_PREFIX,
    DEFAULT_MAX_CONCURRENCY,
};
use crate::error::{ImportError, Result};
use crate::pipeline::processing::convert::ConverterRegistry;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// JSON snapshot of songs and charts
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    pub enabled_import_types: Vec<ImportType>,
    pub max_concurrency: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            enabled_import_types: ImportType::ALL.to_vec(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load from `SCORE_IMPORT_CONFIG`, or `config.toml` in the working
    /// directory. `.env` is read first.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    /// A missing file means defaults; an unreadable or invalid one is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            ImportError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.import.max_concurrency == 0 {
            return Err(ImportError::Config(
                "import.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Every enabled import type must have a converter
    pub fn validate_against(&self, registry: &ConverterRegistry) -> Result<()> {
        registry.ensure_supported(&self.import.enabled_import_types)?;
        Ok(())
    }

    pub fn is_enabled(&self, import_type: ImportType) -> bool {
        self.import.enabled_import_types.contains(&import_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.import.enabled_import_types.len(), ImportType::ALL.len());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"
[import]
enabled_import_types = ["api/cg-dev-sdvx", "file/batch-manual"]
max_concurrency = 2
"#,
        );

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.import.max_concurrency, 2);
        assert!(config.is_enabled(ImportType::ApiCgDevSdvx));
        assert!(!config.is_enabled(ImportType::FilePliIidxCsv));
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.catalog.path, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let file = write_config("[import]\nmax_concurrency = 0\n");
        assert!(matches!(Config::load_from(file.path()), Err(ImportError::Config(_))));

        let file = write_config("[import]\nenabled_import_types = [\"api/unknown\"]\n");
        assert!(matches!(Config::load_from(file.path()), Err(ImportError::Toml(_))));
    }
}
