use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Validation error: {}", describe_validation(.missing, .details))]
    ValidationError {
        missing: Vec<String>,
        details: Option<String>,
    },

    #[error("Upstream error ({status:?}): {message}")]
    UpstreamError {
        status: Option<u16>,
        message: String,
        details: serde_json::Value,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unexpected error: {message}")]
    UnexpectedError { message: String },
}

/// 對外回應的錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigError,
    ValidationError,
    UpstreamError,
    UnexpectedError,
}

/// Failure body returned to clients: `{ error, missing?, details? }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn missing(missing: Vec<String>) -> Self {
        Self::ValidationError {
            missing,
            details: None,
        }
    }

    pub fn upstream(
        status: Option<u16>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::UpstreamError {
            status,
            message: message.into(),
            details,
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedError {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RateError::ConfigError { .. } => ErrorKind::ConfigError,
            RateError::ValidationError { .. } => ErrorKind::ValidationError,
            RateError::UpstreamError { .. } => ErrorKind::UpstreamError,
            RateError::ApiError(e) if e.is_timeout() => ErrorKind::UpstreamError,
            RateError::ApiError(_)
            | RateError::SerializationError(_)
            | RateError::IoError(_)
            | RateError::UnexpectedError { .. } => ErrorKind::UnexpectedError,
        }
    }

    /// HTTP status a handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            RateError::ConfigError { .. } => 500,
            RateError::ValidationError { .. } => 400,
            RateError::UpstreamError { status, .. } => match status {
                Some(code) if (400..=599).contains(code) => *code,
                _ => 502,
            },
            RateError::ApiError(e) if e.is_timeout() => 504,
            _ => 500,
        }
    }

    /// 轉為客戶端可見的錯誤內容；設定錯誤與非預期錯誤不洩漏細節
    pub fn to_body(&self) -> ErrorBody {
        match self {
            RateError::ValidationError { missing, details } => ErrorBody {
                error: ErrorKind::ValidationError,
                missing: Some(missing.clone()),
                details: details.clone().map(serde_json::Value::String),
            },
            RateError::UpstreamError {
                message, details, ..
            } => ErrorBody {
                error: ErrorKind::UpstreamError,
                missing: None,
                details: Some(serde_json::json!({
                    "message": message,
                    "upstream": details,
                })),
            },
            RateError::ApiError(e) if e.is_timeout() => ErrorBody {
                error: ErrorKind::UpstreamError,
                missing: None,
                details: Some(serde_json::json!({
                    "message": "rating authority timed out",
                })),
            },
            other => ErrorBody {
                error: other.kind(),
                missing: None,
                details: None,
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::ConfigError => "Rating service is not configured".to_string(),
            ErrorKind::ValidationError => match self {
                RateError::ValidationError { missing, .. } if !missing.is_empty() => {
                    format!("Shipment is incomplete: {}", missing.join(", "))
                }
                RateError::ValidationError {
                    details: Some(details),
                    ..
                } => format!("Shipment request is malformed: {}", details),
                _ => "Shipment request is malformed".to_string(),
            },
            ErrorKind::UpstreamError => "Rating authority rejected the request".to_string(),
            ErrorKind::UnexpectedError => "Server error".to_string(),
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::ValidationError => 1,
            ErrorKind::UpstreamError => 2,
            ErrorKind::ConfigError | ErrorKind::UnexpectedError => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RateError>;

fn describe_validation(missing: &[String], details: &Option<String>) -> String {
    match details {
        _ if !missing.is_empty() => format!("missing or invalid fields {}", missing.join(", ")),
        Some(details) => details.clone(),
        None => "malformed request".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_lists_every_path() {
        let err = RateError::missing(vec!["from.zip".to_string(), "parcel.heightCm".to_string()]);
        assert_eq!(err.status_code(), 400);

        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(
            body["missing"],
            serde_json::json!(["from.zip", "parcel.heightCm"])
        );
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_malformed_request_message_carries_details() {
        let err = RateError::ValidationError {
            missing: Vec::new(),
            details: Some("Malformed shipment request: duplicate field `weightKg`".to_string()),
        };

        assert_eq!(
            err.to_string(),
            "Validation error: Malformed shipment request: duplicate field `weightKg`"
        );
        assert!(err.user_friendly_message().contains("duplicate field `weightKg`"));

        let err = RateError::missing(vec!["to.zip".to_string()]);
        assert_eq!(err.to_string(), "Validation error: missing or invalid fields to.zip");
    }

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = RateError::upstream(
            Some(422),
            "EasyPost error",
            serde_json::json!({"error": {"code": "ADDRESS.VERIFY.FAILURE"}}),
        );
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.kind(), ErrorKind::UpstreamError);

        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(
            body["details"]["upstream"]["error"]["code"],
            "ADDRESS.VERIFY.FAILURE"
        );

        let no_status = RateError::upstream(None, "bad body", serde_json::Value::Null);
        assert_eq!(no_status.status_code(), 502);
    }

    #[test]
    fn test_config_and_unexpected_do_not_leak_details() {
        let err = RateError::config("EASYPOST_API_KEY is not set");
        assert_eq!(err.status_code(), 500);
        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(body, serde_json::json!({"error": "config_error"}));

        let err = RateError::unexpected("socket closed");
        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(body, serde_json::json!({"error": "unexpected_error"}));
        assert_eq!(err.exit_code(), 3);
    }
}
