use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the user as an inline error banner.
#[derive(Error, Debug)]
pub enum DashError {
    #[error("File size exceeds {limit_mb}MB, please upload a smaller file.")]
    FileTooLarge { size_bytes: u64, limit_mb: f64 },

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Failed to read file: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error: {0:#}")]
    Parse(#[from] anyhow::Error),

    #[error("Invalid configuration file: {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DashError>;
