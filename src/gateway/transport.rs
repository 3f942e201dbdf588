use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::gateway::error::TransportError;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP collaborator used by the request builders.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &Url,
        headers: HeaderMap,
        body: String,
    ) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT).unwrap_or_else(|e| {
            tracing::warn!("Failed to build http client with timeout, using defaults: {e}");
            Self::from_client(reqwest::Client::new())
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &Url,
        headers: HeaderMap,
        body: String,
    ) -> Result<HttpResponse, TransportError> {
        let res = self
            .client
            .post(url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok(HttpResponse { status, body })
    }
}

pub fn form_headers() -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    map
}

/// Post a url-encoded form and return the body of a 2xx reply.
pub async fn post_form(
    transport: &dyn Transport,
    url: &Url,
    body: String,
) -> Result<String, TransportError> {
    let response = transport.post(url, form_headers(), body).await?;
    tracing::debug!(status = response.status, "Gateway API response status");
    if !(200..300).contains(&response.status) {
        tracing::warn!(status = response.status, "Gateway API replied with error status");
        return Err(TransportError::Status(response.status));
    }
    Ok(response.body)
}


#[cfg(test)]
mod tests {
    use super::{mock::MockTransport, *};

    #[tokio::test]
    async fn posts_form_encoded_body() {
        let transport = MockTransport::ok("<r/>");
        let url = Url::parse("https://payments.paystation.co.nz/lookup/").unwrap();
        let body = post_form(&transport, &url, "pi=1&ti=2".into()).await.unwrap();
        assert_eq!(body, "<r/>");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, "pi=1&ti=2");
        assert_eq!(
            calls[0].headers[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
    }

    #[tokio::test]
    async fn error_status_is_a_transport_error() {
        let transport = MockTransport::with_status(503, "unavailable");
        let url = Url::parse("https://payments.paystation.co.nz/lookup/").unwrap();
        let err = post_form(&transport, &url, String::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::Status(503)));
    }
}
