use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CinedexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Site error: {0}")]
    Site(#[from] SiteError),

    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to start chromedriver '{path}': {source}")]
    SpawnDriver {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chromedriver unavailable: {details}")]
    DriverUnavailable { details: String },

    #[error("WebDriver transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("WebDriver protocol error '{error}': {message}")]
    Protocol { error: String, message: String },

    #[error("Element not found: {locator}")]
    NotFound { locator: String },

    #[error("No tab registered under '{key}'")]
    UnknownTab { key: String },

    #[error("Failed to write downloaded file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    /// True when the underlying browser process can no longer be trusted
    /// and the worker slot should discard its session.
    pub fn poisons_session(&self) -> bool {
        match self {
            SessionError::Transport(_) => true,
            SessionError::Protocol { error, .. } => {
                error == "invalid session id" || error == "no such window"
            }
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Session failed during page lookup: {0}")]
    Session(#[from] SessionError),

    #[error("Expected page element missing: {what}")]
    ElementMissing { what: String },

    #[error("Malformed page text for {what}: '{text}'")]
    Malformed { what: String, text: String },
}

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Translation service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Translation response missing 'translatedText'")]
    MalformedResponse,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record '{path}': {source}")]
    EncodeRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse record '{path}': {source}")]
    ParseRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to move file from '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, CinedexError>;
