use thiserror::Error;

/// Failure modes of a backend call.
///
/// `Parse` only occurs on the read path (a 2xx response whose body is not the
/// JSON we expect); callers treat it like `Http` with an absent body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure; no HTTP response was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response. The backend usually ships a JSON body with an
    /// `error` field, but it is not guaranteed to parse.
    #[error("http status {status}")]
    Http {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// Status 429, special-cased for user messaging.
    #[error("rate limited")]
    RateLimited,

    /// 2xx response whose body was not valid JSON for the expected shape.
    #[error("invalid response body: {0}")]
    Parse(#[source] serde_json::Error),

    /// A local precondition failed; no request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// The `error` string the node embeds in failure bodies, when present.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Http {
                body: Some(body), ..
            } => body.get("error").and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// User-facing alert text for a failed operation.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RateLimited => {
                "The node is experiencing heavy load. Please try again in one minute.".to_string()
            }
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Network(_) => "No internet connection.".to_string(),
            _ => match self.backend_message() {
                Some(msg) => msg.to_string(),
                None => "Something went wrong! Please try again in one minute.".to_string(),
            },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_read_from_parsed_body() {
        let err = ApiError::Http {
            status: 400,
            body: Some(serde_json::json!({ "error": "PostHashHex is invalid" })),
        };
        assert_eq!(err.backend_message(), Some("PostHashHex is invalid"));
        assert_eq!(err.user_message(), "PostHashHex is invalid");
    }

    #[test]
    fn backend_message_absent_when_body_missing_or_unparsed() {
        let err = ApiError::Http {
            status: 502,
            body: None,
        };
        assert_eq!(err.backend_message(), None);
        assert!(err.user_message().starts_with("Something went wrong"));
    }

    #[test]
    fn rate_limit_has_dedicated_message() {
        assert!(ApiError::RateLimited.user_message().contains("heavy load"));
    }
}
