//! Planner client error types.

/// Errors from talking to the trip planner.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Planner returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the planner
    #[error("rate limited by the OTP server")]
    RateLimited,

    /// The GraphQL response carried an `errors` array
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Response body was not the JSON we expected; `body` keeps a prefix
    /// of it for logging
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Mock fixture directory could not be loaded
    #[error("mock planner: {0}")]
    Mock(String),

    /// Client could not be constructed from its configuration
    #[error("invalid planner config: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = OtpError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = OtpError::GraphQl("Unknown field 'foo'".into());
        assert_eq!(err.to_string(), "GraphQL error: Unknown field 'foo'");

        let err = OtpError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");
    }
}
