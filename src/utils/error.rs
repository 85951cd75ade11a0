use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Page fetch failed for {url}: HTTP {status}")]
    PageFetchError { url: String, status: u16 },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Database,
    Processing,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::DatabaseError(_) => ErrorCategory::Database,
            EtlError::HttpError(_) | EtlError::PageFetchError { .. } => ErrorCategory::Network,
            EtlError::CsvError(_) | EtlError::ProcessingError { .. } => ErrorCategory::Processing,
            EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常重試即可
            EtlError::HttpError(_) | EtlError::PageFetchError { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_) | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::High,
            EtlError::DatabaseError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML configuration file and the values passed on the command line"
            }
            ErrorCategory::Network => {
                "Check network connectivity and that the search URL is still valid, then retry"
            }
            ErrorCategory::Database => {
                "Check the database host, port and credentials, and that the server is reachable"
            }
            ErrorCategory::Processing => {
                "The page layout may have changed; review the configured selectors"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DatabaseError(_) => format!("Could not talk to the database: {}", self),
            EtlError::HttpError(_) | EtlError::PageFetchError { .. } => {
                format!("Could not load the page: {}", self)
            }
            EtlError::IoError(_) => format!("Could not read or write a file: {}", self),
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => format!("Invalid configuration: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
