use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::gateway::{
    GatewayConfig, Response, Result, auth,
    callback::CompletePurchaseQuery,
    error::GatewayError,
    lookup::CompletePurchaseResponse,
    mask,
    transport::{self, Transport},
};

/// Quick lookup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupData {
    /// Paystation account id
    pub pi: String,
    /// Transaction reference
    pub ti: String,
}

/// Server side status check of a transaction the customer returned from.
#[derive(Debug, Clone)]
pub struct CompletePurchaseRequest {
    data: LookupData,
    body: String,
    hmac_key: Option<String>,
}

impl CompletePurchaseRequest {
    pub const ENDPOINT: &'static str = "https://payments.paystation.co.nz/lookup/";

    pub fn new(config: &GatewayConfig, query: &CompletePurchaseQuery) -> Result<Self> {
        let Some(ti) = query.transaction_reference() else {
            return Err(GatewayError::Validation(
                "Transaction reference is missing".into(),
            ));
        };
        tracing::debug!(
            ti,
            ec = ?query.ec,
            em = ?query.em,
            ms = ?query.ms,
            am = ?query.am,
            "Customer returned from hosted payment page"
        );
        let data = LookupData {
            pi: config.paystation_id.clone(),
            ti: ti.to_string(),
        };
        let body = serde_urlencoded::to_string(&data)?;
        Ok(Self {
            data,
            body,
            hmac_key: config.hmac_key().map(str::to_owned),
        })
    }

    pub fn data(&self) -> &LookupData {
        &self.data
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn endpoint(&self) -> Url {
        auth::endpoint(Self::ENDPOINT, &self.body, self.hmac_key.as_deref())
    }

    #[instrument(skip_all, fields(ti = %self.data.ti))]
    pub async fn send(&self, transport: &dyn Transport) -> Result<CompletePurchaseResponse> {
        let url = self.endpoint();
        tracing::debug!(url = %mask::secure_url(&url), body = %self.body, "Gateway API lookup request");
        let body = transport::post_form(transport, &url, self.body.clone()).await?;
        let response = CompletePurchaseResponse::parse(&body)?;
        tracing::info!(
            code = ?response.code(),
            successful = response.is_successful(),
            "Purchase lookup completed"
        );
        Ok(response)
    }
}
