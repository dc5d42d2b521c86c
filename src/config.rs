//! Configuration types and validation for detectors and the batch runner

use std::{fs, path::Path};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default size ceiling for inspected files (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Global inspection config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files larger than this are rejected before any parsing
    pub max_file_size: u64,
    /// Number of files inspected concurrently by the batch runner
    pub workers: usize,
    pub image: ImageConfig,
    pub pdf: PdfConfig,
}

/// Image sanitizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub resample_filter: ResampleFilter,
}

/// PDF detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Treat a JavaScript `/OpenAction` on the catalog as document-level script
    pub inspect_open_action: bool,
    /// Treat a non-empty `/Kids` array under `/EmbeddedFiles` as attachments present
    pub reject_name_tree_kids: bool,
}

/// Smoothing filter used by the shrink/regrow round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

// Defaults
impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers: num_cpus::get().max(1),
            image: ImageConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            resample_filter: ResampleFilter::Triangle,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            inspect_open_action: true,
            reject_name_tree_kids: true,
        }
    }
}

impl ScanConfig {
    /// Loads a config file, trying JSON first and then YAML
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ScanConfig = serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size == 0 {
            return Err(ConfigError::Validation("max_file_size must be positive".into()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Validation("Concurrency must be at least 1".into()));
        }
        Ok(())
    }
}
