use score_core::ImportType;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "SCORE_IMPORT_CONFIG";

pub const DEFAULT_LOG_FILTER: &str = "score_import=info";
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_LOG_FILE_PREFIX: &str = "score_import.log";

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Service name recorded on scores when the caller does not supply one
pub fn default_service(import_type: ImportType) -> &'static str {
    match import_type {
        ImportType::ApiCgDevSdvx => "CG Dev",
        ImportType::ApiCgNagSdvx => "CG NAG",
        ImportType::ApiCgGanSdvx => "CG GAN",
        ImportType::FileEamusementIidxCsv => "e-amusement",
        ImportType::FilePliIidxCsv => "PLI",
        ImportType::FileBatchManual => "batch-manual",
    }
}
