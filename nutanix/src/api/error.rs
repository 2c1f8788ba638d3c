use thiserror::Error;

use super::common::ApiErrorDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status. `message` is the joined API error messages when
    /// the body carried any, the raw body otherwise.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request body could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("authentication failed, check username and password")]
    Unauthorized,

    #[error("no response within {0} seconds")]
    Timeout(u64),

    #[error("rate limited by Prism Central")]
    RateLimited,

    #[error("Prism Central unavailable")]
    ServiceUnavailable,

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("response for {0} carried no ETag")]
    MissingEtag(String),

    #[error("unexpected response type: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            ApiError::RateLimited => Some(429),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
