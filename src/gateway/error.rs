/// Message used when the gateway sends something we cannot interpret and
/// does not tell us why.
pub const DEFAULT_INVALID_RESPONSE: &str = "Invalid response from payment gateway";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Caller supplied parameters are missing or invalid. Raised before any
    /// network call is made.
    #[error("{0}")]
    Validation(String),
    /// Gateway answered with a document we cannot interpret.
    #[error("{0}")]
    InvalidResponse(String),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to encode request body: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),
}

impl GatewayError {
    pub fn invalid_response() -> Self {
        Self::InvalidResponse(DEFAULT_INVALID_RESPONSE.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_invalid_response(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("http request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    Status(u16),
}

impl From<quick_xml::DeError> for GatewayError {
    fn from(value: quick_xml::DeError) -> Self {
        tracing::debug!("Failed to parse gateway xml: {value}");
        Self::invalid_response()
    }
}
