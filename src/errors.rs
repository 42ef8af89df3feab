//! Error types for the dashboard service.
//!
//! Two failure families matter to callers: configuration errors (an artifact
//! or dataset could not be loaded, so a dashboard cannot run at all) and
//! inference errors (one prediction attempt failed and is abandoned). The
//! remaining variants cover input validation and plumbing failures.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for flightdash
#[derive(Error, Debug)]
pub enum DashError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Expected schema unavailable for model '{model}': {reason}")]
    SchemaUnavailable { model: String, reason: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Dataset error: {context}")]
    Dataset {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource not found: {resource} - {id}")]
    NotFound { resource: String, id: String },
}

/// Result alias used across the crate.
pub type DashResult<T> = Result<T, DashError>;

impl DashError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schema-unavailable error
    pub fn schema_unavailable(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaUnavailable {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn dataset(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Dataset {
            context: context.into(),
            source,
        }
    }

    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// True for failures that make a dashboard unusable until restart.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DashError::Config { .. }
                | DashError::SchemaUnavailable { .. }
                | DashError::Dataset { .. }
                | DashError::Serialization { .. }
                | DashError::Io { .. }
        )
    }

    /// Render the full cause chain, as shown to the user.
    pub fn display_chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

impl IntoResponse for DashError {
    fn into_response(self) -> Response {
        crate::api_errors::AppError::from(self).into_response()
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::serialization("json_operation", err)
    }
}

impl From<std::io::Error> for DashError {
    fn from(err: std::io::Error) -> Self {
        DashError::io("io_operation", err)
    }
}

impl From<csv::Error> for DashError {
    fn from(err: csv::Error) -> Self {
        DashError::dataset("csv_operation", err)
    }
}
