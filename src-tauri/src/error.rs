use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write settings file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard access is not supported on this platform")]
    Unsupported,

    #[error("Failed to read clipboard data: {0}")]
    Read(String),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct DibError(#[from] image::ImageError);

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode clipboard image: {0}")]
    Decode(#[from] DibError),

    #[error("Failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
