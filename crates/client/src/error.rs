use serde::Deserialize;

/// A rejected field as reported in a `VALIDATION_ERROR` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiFieldError {
    pub field: String,
    pub message: String,
}

/// JSON error body returned by the API for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(default)]
    fields: Vec<ApiFieldError>,
}

/// Errors from the readings API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        fields: Vec<ApiFieldError>,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a raw error response body.
    ///
    /// Bodies that are not the API's JSON error shape are kept verbatim as
    /// the message with code `UNKNOWN`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => Self::Api {
                status,
                code: parsed.code,
                message: parsed.error,
                fields: parsed.fields,
            },
            Err(_) => Self::Api {
                status,
                code: "UNKNOWN".to_string(),
                message: String::from_utf8_lossy(body).into_owned(),
                fields: Vec::new(),
            },
        }
    }

    /// Transport failures and server-side errors may succeed on retry;
    /// client errors will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => !e.is_builder() && !e.is_decode(),
            Self::Api { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validation_body() {
        let body = br#"{"error":"Validation failed: ph: pH must be between 0 and 14","code":"VALIDATION_ERROR","fields":[{"field":"ph","message":"pH must be between 0 and 14"}]}"#;
        let err = ClientError::from_response(400, body);
        match err {
            ClientError::Api { status, code, fields, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code, "VALIDATION_ERROR");
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "ph");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_kept_verbatim() {
        let err = ClientError::from_response(502, b"Bad Gateway");
        assert_eq!(err.to_string(), "API error (502) UNKNOWN: Bad Gateway");
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retried() {
        let err = ClientError::from_response(404, br#"{"error":"x","code":"NOT_FOUND"}"#);
        assert!(!err.is_retryable());
    }

    #[test]
    fn request_error_display() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = ClientError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
        assert!(!err.is_retryable());
    }
}
