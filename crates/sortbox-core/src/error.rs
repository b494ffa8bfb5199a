use thiserror::Error;

/// All errors that can occur in sortbox-core.
#[derive(Debug, Error)]
pub enum SortboxError {
    #[error("No file at index {0}")]
    RecordNotFound(usize),

    #[error("An organize run is already in progress")]
    AlreadyOrganizing,

    #[error("File has no stored preview data: {0}")]
    NoPreviewData(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Destination already exists: {0} (use --force to overwrite)")]
    DestinationExists(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Process exit codes used by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    Busy = 7,
    ConfirmRequired = 8,
}

impl SortboxError {
    /// Exit code the CLI should report for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::RecordNotFound(_) | Self::NoPreviewData(_) => ExitCode::NotFound,
            Self::AlreadyOrganizing => ExitCode::Busy,
            Self::DestinationExists(_) => ExitCode::ConfirmRequired,
            Self::UnknownCategory(_) | Self::InvalidDataUrl(_) => ExitCode::InvalidArgs,
            Self::Io(_) => ExitCode::FileSystemError,
            _ => ExitCode::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, SortboxError>;
