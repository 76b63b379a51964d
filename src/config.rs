use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::layout::DataLayout;

pub const DEFAULT_DATA_DIR: &str = "data";

pub const ENV_DATA_DIR: &str = "CLOSET_DATA_DIR";
pub const ENV_LOG: &str = "CLOSET_LOG";
pub const ENV_LOG_FORMAT: &str = "CLOSET_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "CLOSET_LOG_FILE";
pub const ENV_USER: &str = "CLOSET_USER";
pub const ENV_PASSWORD: &str = "CLOSET_PASSWORD";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid log format: {value} (expected `text` or `json`)")]
pub struct LogFormatError {
    value: String,
}

impl FromStr for LogFormat {
    type Err = LogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogFormatError {
                value: s.to_string(),
            }),
        }
    }
}

/// Process-level settings. Explicit values win over the environment, which
/// wins over the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    /// Also write JSON logs under `<data_dir>/logs/`.
    pub file_logging: bool,
}

impl Config {
    pub fn from_env(data_dir: Option<PathBuf>) -> Result<Self, LogFormatError> {
        Self::resolve(data_dir, |key| std::env::var(key).ok())
    }

    pub fn resolve<F>(data_dir: Option<PathBuf>, lookup: F) -> Result<Self, LogFormatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = data_dir
            .or_else(|| lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };
        let file_logging = lookup(ENV_LOG_FILE)
            .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            log_format,
            file_logging,
        })
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }
}
