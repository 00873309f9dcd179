use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Server rejected the request: {message}")]
    ServerError { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },

    #[error("Data processing error: {message}")]
    DataError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Validation,
    Configuration,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ApiError(_) | AppError::TransportError { .. } => ErrorCategory::Network,
            AppError::ServerError { .. } => ErrorCategory::Server,
            AppError::ValidationError { .. } => ErrorCategory::Validation,
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AppError::IoError(_) => ErrorCategory::Storage,
            AppError::CsvError(_) | AppError::SerializationError(_) | AppError::DataError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    /// 網路與伺服器錯誤可重試；設定錯誤需要使用者介入
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::ApiError(e) if e.is_timeout() => {
                "The backend took too long to answer".to_string()
            }
            AppError::ApiError(e) if e.is_connect() => "Could not reach the backend".to_string(),
            AppError::ApiError(_) | AppError::TransportError { .. } => {
                "Network error while talking to the backend".to_string()
            }
            AppError::ServerError { message } => message.clone(),
            AppError::ValidationError { message } => message.clone(),
            AppError::ConfigError { message } => format!("Invalid configuration: {}", message),
            AppError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            AppError::IoError(e) => format!("File system error: {}", e),
            AppError::CsvError(_) | AppError::SerializationError(_) | AppError::DataError { .. } => {
                format!("Could not process attendance data: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is running and try again",
            ErrorCategory::Server => "Request a new CAPTCHA and try again",
            ErrorCategory::Validation => "Fill in the missing fields and resubmit",
            ErrorCategory::Configuration => "Fix the command-line flags or the config file",
            ErrorCategory::Storage => "Check that the output directory is writable",
            ErrorCategory::Data => "The backend payload may have changed; rerun with --verbose",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
