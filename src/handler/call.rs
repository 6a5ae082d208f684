//! Method call and response types exchanged on the channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single incoming method call.
///
/// Created per request and discarded once the response is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name used for routing.
    pub method: String,
    /// Opaque argument value (`null` when the caller sent none).
    #[serde(rename = "args", default)]
    pub arguments: Value,
}

impl MethodCall {
    /// Create a call without arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    /// Create a call with the given arguments.
    pub fn with_arguments(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// The single response produced for a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    /// Handler completed with a value.
    Success {
        /// Result value.
        value: Value,
    },
    /// Handler failed; fields are carried verbatim from [`HandlerFailure`].
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        #[serde(default)]
        message: Option<String>,
        /// Extra error payload.
        #[serde(default)]
        details: Value,
    },
    /// No handler is registered for the method name.
    NotImplemented,
}

impl MethodResponse {
    /// Build a success response.
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    /// Build an error response.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: Some(message.into()),
            details: Value::Null,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    #[inline]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}

impl From<HandlerFailure> for MethodResponse {
    fn from(failure: HandlerFailure) -> Self {
        Self::Error {
            code: failure.code,
            message: failure.message,
            details: failure.details,
        }
    }
}

/// Failure reported by a handler.
///
/// Never fatal to the dispatcher; it is sent back to the caller as
/// [`MethodResponse::Error`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("handler failed with code {code}")]
pub struct HandlerFailure {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: Option<String>,
    /// Extra error payload.
    pub details: Value,
}

impl HandlerFailure {
    /// Create a failure with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: Some(message.into()),
            details: Value::Null,
        }
    }

    /// Attach details to the failure.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_without_arguments() {
        let call = MethodCall::new("getPlatformVersion");
        assert_eq!(call.method, "getPlatformVersion");
        assert_eq!(call.arguments, Value::Null);
    }

    #[test]
    fn test_failure_maps_verbatim() {
        let failure = HandlerFailure::new("E1", "bad").with_details(json!({"retry": false}));
        let response = MethodResponse::from(failure);

        assert_eq!(
            response,
            MethodResponse::Error {
                code: "E1".to_string(),
                message: Some("bad".to_string()),
                details: json!({"retry": false}),
            }
        );
    }

    #[test]
    fn test_response_predicates() {
        assert!(MethodResponse::success("x").is_success());
        assert!(MethodResponse::error("E1", "bad").is_error());
        assert!(MethodResponse::NotImplemented.is_not_implemented());
        assert!(!MethodResponse::NotImplemented.is_success());
    }

    #[test]
    fn test_failure_display() {
        let failure = HandlerFailure::new("E1", "bad");
        assert_eq!(failure.to_string(), "handler failed with code E1");
    }
}
