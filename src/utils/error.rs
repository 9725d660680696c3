use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Student {matrikel_number} not found")]
    StudentNotFound { matrikel_number: u32 },

    #[error("Course {course_key} not found")]
    CourseNotFound { course_key: u32 },

    #[error("Student {matrikel_number} has no enrollment for course {course_key}")]
    EnrollmentNotFound { matrikel_number: u32, course_key: u32 },

    #[error("Student {matrikel_number} is already enrolled in course {course_key}")]
    DuplicateEnrollment { matrikel_number: u32, course_key: u32 },

    #[error("Invalid grade {grade}: must be between {min} and {max}")]
    InvalidGrade { grade: f32, min: f32, max: f32 },

    #[error("Line {line}: {message}")]
    ParseError { line: u64, message: String },

    #[error("Line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { line: u64, expected: String },

    #[error("Field '{field}' cannot be stored: {reason}")]
    UnstorableField { field: String, reason: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Duplicate,
    MalformedInput,
    Validation,
    Configuration,
    System,
}

impl RegistryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::StudentNotFound { .. }
            | RegistryError::CourseNotFound { .. }
            | RegistryError::EnrollmentNotFound { .. } => ErrorCategory::NotFound,
            RegistryError::DuplicateEnrollment { .. } => ErrorCategory::Duplicate,
            RegistryError::ParseError { .. }
            | RegistryError::UnexpectedEof { .. }
            | RegistryError::CsvError(_) => ErrorCategory::MalformedInput,
            RegistryError::InvalidGrade { .. }
            | RegistryError::UnstorableField { .. }
            | RegistryError::ValidationError { .. } => ErrorCategory::Validation,
            RegistryError::ConfigError { .. } | RegistryError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            RegistryError::IoError(_) | RegistryError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    /// Short message for the terminal; the `Display` form carries the details.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::NotFound => format!("Not found: {}", self),
            ErrorCategory::Duplicate => format!("Rejected: {}", self),
            ErrorCategory::MalformedInput => format!("The data file is malformed. {}", self),
            ErrorCategory::Validation => format!("Invalid input: {}", self),
            ErrorCategory::Configuration => format!("Check your configuration. {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::NotFound
            | ErrorCategory::Duplicate
            | ErrorCategory::Validation
            | ErrorCategory::Configuration => 1,
            ErrorCategory::MalformedInput => 2,
            ErrorCategory::System => 3,
        }
    }

    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        RegistryError::ParseError {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = RegistryError::CourseNotFound { course_key: 1 };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.exit_code(), 1);

        let err = RegistryError::parse(4, "bad date");
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
        assert_eq!(err.to_string(), "Line 4: bad date");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RegistryError = io.into();
        assert_eq!(err.category(), ErrorCategory::System);
        assert!(err.user_friendly_message().starts_with("System error"));
    }
}
