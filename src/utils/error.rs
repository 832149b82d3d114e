use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

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

pub type Result<T> = std::result::Result<T, ExperimentError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    Storage,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ExperimentError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::Input,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ProcessingError { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Processing
            }
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::TaskError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => {
                "Use a positive sample count, at least one circle and region bounds with min <= max"
            }
            Self::ConfigValidationError { .. } => "Check the configuration file syntax and field types",
            Self::InvalidConfigValueError { .. } => "Correct the highlighted configuration value",
            Self::MissingConfigError { .. } => "Add the missing field to the configuration",
            Self::ProcessingError { .. } => "Re-run with --verbose to inspect the sampling sweep",
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check that the requested output formats are supported"
            }
            Self::IoError(_) | Self::ZipError(_) => {
                "Check that the output path exists and is writable"
            }
            Self::TaskError(_) => "Re-run the experiment; the sampling worker was interrupted",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The experiment was given invalid input: {}", self),
            ErrorCategory::Configuration => format!("The configuration is not valid: {}", self),
            ErrorCategory::Processing => format!("Processing the estimates failed: {}", self),
            ErrorCategory::Storage => format!("Saving the results failed: {}", self),
            ErrorCategory::System => format!("An internal error occurred: {}", self),
        }
    }

    /// Non-zero process exit code for binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
