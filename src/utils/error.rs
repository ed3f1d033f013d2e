use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarmapError {
    #[error("Invalid observer {field} '{value}': {reason}")]
    InvalidObserverError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load catalog '{location}': {message}")]
    CatalogLoadError { location: String, message: String },

    #[error("Render failed: {message}")]
    RenderError { message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Observer,
    Catalog,
    Render,
}

impl StarmapError {
    pub fn invalid_observer(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        StarmapError::InvalidObserverError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn catalog(location: impl Into<String>, message: impl ToString) -> Self {
        StarmapError::CatalogLoadError {
            location: location.into(),
            message: message.to_string(),
        }
    }

    pub fn render(message: impl ToString) -> Self {
        StarmapError::RenderError {
            message: message.to_string(),
        }
    }

    /// Name of the error kind as reported to the user.
    pub fn kind(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "ConfigurationError",
            ErrorCategory::Observer => "InvalidObserverError",
            ErrorCategory::Catalog => "CatalogLoadError",
            ErrorCategory::Render => "RenderError",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StarmapError::InvalidObserverError { .. } => ErrorCategory::Observer,
            StarmapError::CatalogLoadError { .. } => ErrorCategory::Catalog,
            StarmapError::RenderError { .. } => ErrorCategory::Render,
            StarmapError::ConfigValidationError { .. }
            | StarmapError::InvalidConfigValueError { .. }
            | StarmapError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 依錯誤類別決定的程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Observer => 2,
            ErrorCategory::Catalog => 3,
            ErrorCategory::Render => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            StarmapError::InvalidObserverError { field, .. } => match field.as_str() {
                "latitude" => "Use a latitude between -90 and 90 degrees, e.g. 40.7".to_string(),
                "longitude" => {
                    "Use a longitude between -180 and 180 degrees, e.g. -74.0".to_string()
                }
                "time" => "Use RFC 3339 (2024-06-21T00:00:00Z) or 'YYYY-MM-DD HH:MM'".to_string(),
                _ => format!("Check the observer '{}' setting", field),
            },
            StarmapError::CatalogLoadError { location, .. } => format!(
                "Make sure '{}' exists and is a valid star catalog or constellation file",
                location
            ),
            StarmapError::RenderError { .. } => {
                "Check that the output path ends in .png or .svg and its directory is writable"
                    .to_string()
            }
            StarmapError::ConfigValidationError { field, .. }
            | StarmapError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the config file or CLI flags", field)
            }
            StarmapError::MissingConfigError { field } => {
                format!("Provide '{}' in the config file or on the command line", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

pub type Result<T> = std::result::Result<T, StarmapError>;
