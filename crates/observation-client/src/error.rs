//! Error types for the observation API client

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;

use crate::request::RequestConfig;

/// Body of a failed HTTP exchange.
///
/// The API usually answers with a JSON error document, but proxies and
/// gateways in front of it do not, so the raw text is kept when parsing fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ErrorBody {
    /// Parse a response body, falling back to the raw text
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// A non-2xx response, captured once at the point it was detected
#[derive(Debug)]
pub struct HttpFailure {
    pub status: StatusCode,
    pub url: String,
    pub headers: HeaderMap,
    pub body: ErrorBody,
    /// The request that produced this response. Only set for resource API
    /// calls; token grant failures carry no replayable request.
    pub request: Option<RequestConfig>,
}

/// Errors surfaced by the client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client options required by the operation were not supplied
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An authenticated request was made without an access token
    #[error("access token is not set, authenticate first")]
    NotAuthenticated,

    /// 401/403 from the API, or any failure from the token endpoint
    #[error("authentication failed ({} {})", .0.status.as_u16(), .0.url)]
    Authentication(Box<HttpFailure>),

    /// Any other non-2xx response
    #[error("API request failed with status {} ({})", .0.status.as_u16(), .0.url)]
    Api(Box<HttpFailure>),

    /// Transport-level failure (DNS, connection reset, TLS, timeout)
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// True for both a missing token and a 401/403 exchange
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::Authentication(_))
    }

    /// HTTP status of the failed exchange, if there was one
    pub fn status(&self) -> Option<StatusCode> {
        self.failure().map(|f| f.status)
    }

    /// Parsed (or raw) body of the failed exchange
    pub fn body(&self) -> Option<&ErrorBody> {
        self.failure().map(|f| &f.body)
    }

    pub fn failure(&self) -> Option<&HttpFailure> {
        match self {
            Self::Authentication(f) | Self::Api(f) => Some(f),
            _ => None,
        }
    }

    /// Classify a non-2xx resource API response
    pub(crate) fn from_response(failure: HttpFailure) -> Self {
        match failure.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::Authentication(Box::new(failure))
            }
            _ => Self::Api(Box::new(failure)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
