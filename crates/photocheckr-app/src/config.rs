//! Application configuration from global command-line options.

use crate::app::AppError;
use photocheckr_core::PROJECT_KEY;
use photocheckr_core::export::DEFAULT_QUALITY;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Project title; replaces the saved one when given.
    pub title: Option<String>,
    /// Export raster scale.
    pub quality: u32,
    /// Project directory. `None` uses the platform data directory.
    pub storage_dir: Option<PathBuf>,
    /// Where exports are written.
    pub output_dir: PathBuf,
    /// Key the session is saved under.
    pub project_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            quality: DEFAULT_QUALITY,
            storage_dir: None,
            output_dir: PathBuf::from("."),
            project_key: PROJECT_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Consume the global options. Anything else is left in `args`.
    pub fn from_args(args: &mut pico_args::Arguments) -> Result<Self, AppError> {
        let defaults = Self::default();
        let quality: u32 = args
            .opt_value_from_str("--quality")?
            .unwrap_or(defaults.quality);
        if quality == 0 {
            return Err(AppError::Usage("--quality must be at least 1".to_string()));
        }
        Ok(Self {
            title: args.opt_value_from_str("--title")?,
            quality,
            storage_dir: args.opt_value_from_os_str("--store", path)?,
            output_dir: args
                .opt_value_from_os_str("--out", path)?
                .unwrap_or(defaults.output_dir),
            project_key: args
                .opt_value_from_str("--project")?
                .unwrap_or(defaults.project_key),
        })
    }
}

fn path(s: &std::ffi::OsStr) -> Result<PathBuf, std::convert::Infallible> {
    Ok(PathBuf::from(s))
}
