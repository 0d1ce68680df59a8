use std::path::PathBuf;

use thiserror::Error;

/// Reasons an image file could not be turned into a `RawImage`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{filename}: file not found")]
    NotFound { filename: String },

    #[error("{filename}: path escapes the image base directory")]
    OutsideBaseDir { filename: String },

    #[error("{filename}: file is empty")]
    Empty { filename: String },

    #[error("{filename}: {source}")]
    Io {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{filename}: failed to decode image: {source}")]
    Decode {
        filename: String,
        #[source]
        source: image::ImageError,
    },
}

impl LoadError {
    pub fn filename(&self) -> &str {
        match self {
            LoadError::NotFound { filename }
            | LoadError::OutsideBaseDir { filename }
            | LoadError::Empty { filename }
            | LoadError::Io { filename, .. }
            | LoadError::Decode { filename, .. } => filename,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The engine cannot be reached at all. Systemic, aborts a match pass.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

impl ExtractionError {
    pub fn is_systemic(&self) -> bool {
        matches!(self, ExtractionError::EngineUnavailable(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid plate identifier {0:?}: nothing left after normalization")]
    InvalidIdentifier(String),
}

/// Errors that abort a whole match pass.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    EngineUnavailable(ExtractionError),

    #[error("worker pool failure: {0}")]
    WorkerPool(String),
}

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("failed to read records file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected `filename,timestamp`, got {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: unrecognized timestamp {value:?}")]
    BadTimestamp { line: usize, value: String },

    #[error("line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
