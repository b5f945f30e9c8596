use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurndownError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Input is missing required column '{column}'")]
    MissingColumnError { column: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("No risk record has a usable open date; nothing to aggregate")]
    EmptyTimeline,

    #[error("Computed range end {end} precedes range start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Input,
    Data,
    Io,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Critical => 3,
        }
    }
}

impl BurndownError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::CsvError(_) | Self::MissingColumnError { .. } => ErrorCategory::Input,
            Self::ProcessingError { .. } | Self::EmptyTimeline | Self::InvalidRange { .. } => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::Io,
            Self::ZipError(_) | Self::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Config | ErrorCategory::Input | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::EmptyTimeline => {
                "Make sure the 'Risk Open Date' column is filled in DD-MMM-YY format (e.g. 05-Mar-24)"
                    .to_string()
            }
            Self::InvalidRange { .. } => {
                "Check that close dates are not earlier than open dates for every risk".to_string()
            }
            Self::MissingColumnError { column } => {
                format!("Add a '{}' column to the input file or map it in [source.columns]", column)
            }
            Self::CsvError(_) => "Export the spreadsheet as a UTF-8 CSV file and retry".to_string(),
            Self::IoError(_) => "Check that the input file exists and the output path is writable".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the configuration values and try again".to_string()
            }
            Self::ProcessingError { .. } => "Inspect the input data for unusual values".to_string(),
            Self::ZipError(_) | Self::SerializationError(_) => {
                "Retry without compression or report the issue".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyTimeline => {
                "No risk has a valid open date, so no burndown chart can be generated.".to_string()
            }
            Self::InvalidRange { start, end } => format!(
                "All close dates ({}) fall before the earliest open date ({}); the burndown range is empty.",
                end.format(crate::core::normalizer::DATE_FORMAT),
                start.format(crate::core::normalizer::DATE_FORMAT)
            ),
            Self::MissingColumnError { column } => {
                format!("The uploaded file has no '{}' column.", column)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BurndownError>;
