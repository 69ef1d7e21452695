use thiserror::Error;

/// Main error type for sactl operations
#[derive(Debug, Error)]
pub enum SactlError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Resource provider registration failed: {0}")]
    ProviderRegistrationError(String),

    #[error("Storage account name '{name}' is not available: {reason}")]
    NameUnavailable { name: String, reason: String },

    #[error("Storage account not found: {name}")]
    AccountNotFound { name: String },

    #[error("Resource group not found: {name}")]
    ResourceGroupNotFound { name: String },

    #[error("Azure API error: {0}")]
    AzureApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("SSL/TLS error: {0}")]
    SslError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<SactlError>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SactlError {
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::AuthenticationError(msg.into())
    }

    pub fn provider_registration<S: Into<String>>(msg: S) -> Self {
        Self::ProviderRegistrationError(msg.into())
    }

    pub fn name_unavailable<S: Into<String>>(name: S, reason: S) -> Self {
        Self::NameUnavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn account_not_found<S: Into<String>>(name: S) -> Self {
        Self::AccountNotFound { name: name.into() }
    }

    pub fn resource_group_not_found<S: Into<String>>(name: S) -> Self {
        Self::ResourceGroupNotFound { name: name.into() }
    }

    pub fn azure_api<S: Into<String>>(msg: S) -> Self {
        Self::AzureApiError(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn connection_timeout<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionTimeout(msg.into())
    }

    pub fn connection_refused<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionRefused(msg.into())
    }

    pub fn ssl_error<S: Into<String>>(msg: S) -> Self {
        Self::SslError(msg.into())
    }

    pub fn invalid_url<S: Into<String>>(msg: S) -> Self {
        Self::InvalidUrl(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn step_failed<S: Into<String>>(step: S, source: SactlError) -> Self {
        Self::StepFailed {
            step: step.into(),
            source: Box::new(source),
        }
    }

    pub fn unknown<S: Into<String>>(msg: S) -> Self {
        Self::Unknown(msg.into())
    }
}

/// Result type alias for sactl operations
pub type Result<T> = std::result::Result<T, SactlError>;

/// Convert Azure Core errors to SactlError
impl From<azure_core::Error> for SactlError {
    fn from(error: azure_core::Error) -> Self {
        Self::AzureApiError(error.to_string())
    }
}
