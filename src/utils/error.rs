use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{message}")]
    ValidationError { field: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Service responded with {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Malformed {entity} payload: {reason}")]
    MalformedPayload { entity: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown catalog item: {item_id}")]
    UnknownItem { item_id: String },

    #[error("Approved prescription required for: {}", .items.join(", "))]
    PrescriptionRequired { items: Vec<String> },

    #[error("No longer available: {}", .items.join(", "))]
    UnavailableItems { items: Vec<String> },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Data,
    Configuration,
    Business,
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StoreError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        StoreError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(entity: &str, reason: impl Into<String>) -> Self {
        StoreError::MalformedPayload {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::ValidationError { .. } => ErrorCategory::Validation,
            StoreError::ApiError(_) | StoreError::ServiceError { .. } => ErrorCategory::Network,
            StoreError::MalformedPayload { .. } | StoreError::SerializationError(_) => {
                ErrorCategory::Data
            }
            StoreError::IoError(_)
            | StoreError::ConfigError { .. }
            | StoreError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            StoreError::UnknownItem { .. }
            | StoreError::PrescriptionRequired { .. }
            | StoreError::UnavailableItems { .. } => ErrorCategory::Business,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Business => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 非關鍵的附加資料（例如續藥建議）失敗時可直接忽略
    pub fn is_silently_degradable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Data
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StoreError::ValidationError { message, .. } => message.clone(),
            StoreError::ApiError(e) if e.is_timeout() => {
                "The pharmacy service did not respond in time".to_string()
            }
            StoreError::ApiError(_) => "Could not reach the pharmacy service".to_string(),
            StoreError::ServiceError { message, .. } => message.clone(),
            StoreError::MalformedPayload { entity, .. } => {
                format!("Received unexpected {} data from the server", entity)
            }
            StoreError::SerializationError(_) => "Could not read the server response".to_string(),
            StoreError::IoError(e) => format!("File access failed: {}", e),
            StoreError::ConfigError { message } => format!("Configuration problem: {}", message),
            StoreError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            StoreError::UnknownItem { item_id } => {
                format!("Medicine '{}' is not available", item_id)
            }
            StoreError::PrescriptionRequired { items } => format!(
                "An approved prescription is required for: {}",
                items.join(", ")
            ),
            StoreError::UnavailableItems { items } => format!(
                "These medicines are no longer available, remove them to continue: {}",
                items.join(", ")
            ),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Correct the highlighted input and try again",
            ErrorCategory::Network => "Check the API base URL and your connection, then retry",
            ErrorCategory::Data => "The service returned unexpected data; report it to support",
            ErrorCategory::Configuration => "Check the configuration file and command-line flags",
            ErrorCategory::Business => {
                "Upload a prescription and wait for approval, or remove the listed medicines from the cart"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
