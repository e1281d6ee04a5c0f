//! Error types and handling for the travel brief assistant

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Machine-readable classification of provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Credentials were refused by the provider (HTTP 401/403)
    ApiUnauthorized,
    /// Provider asked us to slow down (HTTP 429)
    ApiRateLimit,
    /// The requested city is unknown to the provider
    ApiLocationNotFound,
    /// Provider answered, but not with something we understand
    ApiInvalidResponse,
    /// Transport failure or an unexpected status code
    ApiNetworkError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::ApiUnauthorized => "api_unauthorized",
            ErrorCode::ApiRateLimit => "api_rate_limit",
            ErrorCode::ApiLocationNotFound => "api_location_not_found",
            ErrorCode::ApiInvalidResponse => "api_invalid_response",
            ErrorCode::ApiNetworkError => "api_network_error",
        };
        f.write_str(code)
    }
}

/// Which side of the pipeline a guardrail tripped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailStage {
    Input,
    Output,
}

impl fmt::Display for GuardrailStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardrailStage::Input => f.write_str("input"),
            GuardrailStage::Output => f.write_str("output"),
        }
    }
}

/// Main error type for the travel brief assistant
#[derive(Error, Debug)]
pub enum TripBriefError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error ({code}): {message}")]
    Api {
        message: String,
        code: ErrorCode,
        context: HashMap<String, String>,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Content refused by the guardrail filter
    #[error("Guardrail rejected {stage}: {rule}")]
    Guardrail { stage: GuardrailStage, rule: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripBriefError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error without extra context
    pub fn api<S: Into<String>>(message: S, code: ErrorCode) -> Self {
        Self::api_with_context(message, code, HashMap::new())
    }

    /// Create a new API error carrying key/value diagnostics
    pub fn api_with_context<S: Into<String>>(
        message: S,
        code: ErrorCode,
        context: HashMap<String, String>,
    ) -> Self {
        Self::Api {
            message: message.into(),
            code,
            context,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn guardrail<S: Into<String>>(stage: GuardrailStage, rule: S) -> Self {
        Self::Guardrail {
            stage,
            rule: rule.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Provider error code, if this is an API error
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            TripBriefError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Guardrail and validation refusals, as opposed to failures
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            TripBriefError::Guardrail { .. } | TripBriefError::Validation { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripBriefError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            TripBriefError::Api {
                code: ErrorCode::ApiUnauthorized,
                ..
            } => "An external service refused our credentials. Please check your API keys."
                .to_string(),
            TripBriefError::Api {
                code: ErrorCode::ApiRateLimit,
                ..
            } => "An external service is rate limiting requests. Please try again later."
                .to_string(),
            TripBriefError::Api {
                code: ErrorCode::ApiLocationNotFound,
                ..
            } => "That city could not be found. Please check the spelling.".to_string(),
            TripBriefError::Api { .. } => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
            TripBriefError::Validation { message } => message.clone(),
            TripBriefError::Guardrail {
                stage: GuardrailStage::Input,
                ..
            } => "Please give me the destination city that you want to travel to within the next 24 hours."
                .to_string(),
            TripBriefError::Guardrail {
                stage: GuardrailStage::Output,
                ..
            } => "Please try rephrasing your request.".to_string(),
            TripBriefError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripBriefError::General { message } => message.clone(),
        }
    }
}
