use std::{fmt, sync::Arc};

use tracing::instrument;

pub use crate::gateway::{
    callback::CompletePurchaseQuery,
    config::GatewayConfig,
    error::{GatewayError, TransportError},
    lookup::{CardDisplayInfo, CardExpiry, CompletePurchaseResponse, LookupField},
    payin::{CardDetails, PurchaseData, PurchaseParameters, PurchaseRequest},
    redirect::{PurchaseResponse, RedirectMethod},
    status::{CompletePurchaseRequest, LookupData},
    transport::{HttpResponse, HttpTransport, Transport},
};

/// Request signing
pub mod auth;
/// Query the customer brings back from the hosted page
mod callback;
mod config;
mod error;
/// Conversions from caller parameters to gateway fields
mod from;
/// Quick lookup reply
mod lookup;
/// Log masking
pub mod mask;
/// Purchase initiation request
mod payin;
/// Purchase initiation reply
mod redirect;
/// Quick lookup request
mod status;
pub mod transport;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Common view over gateway replies.
pub trait Response {
    fn is_successful(&self) -> bool;

    /// Paystation never reports a transaction as pending.
    fn is_pending(&self) -> bool {
        false
    }

    fn is_redirect(&self) -> bool {
        false
    }

    fn transaction_reference(&self) -> Option<&str>;

    fn code(&self) -> Option<&str>;

    fn message(&self) -> Option<&str>;
}

/// Source of merchant session ids for purchases that did not bring one.
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSessionIds;

impl SessionIdGenerator for UuidSessionIds {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Paystation hosted payment gateway.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
    session_ids: Arc<dyn SessionIdGenerator>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub const NAME: &'static str = "Paystation";

    pub fn new(config: GatewayConfig) -> Self {
        Self::with_transport(config, HttpTransport::default())
    }

    pub fn with_transport(config: GatewayConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            session_ids: Arc::new(UuidSessionIds),
        }
    }

    pub fn with_session_ids(mut self, session_ids: impl SessionIdGenerator + 'static) -> Self {
        self.session_ids = Arc::new(session_ids);
        self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build and validate a purchase without sending it.
    pub fn purchase_request(&self, params: PurchaseParameters) -> Result<PurchaseRequest> {
        PurchaseRequest::new(&self.config, params, self.session_ids.as_ref())
    }

    /// Start a hosted payment. A successful call ends with a redirect, not a payment.
    #[instrument(skip_all)]
    pub async fn purchase(&self, params: PurchaseParameters) -> Result<PurchaseResponse> {
        let request = self.purchase_request(params).inspect_err(|e| {
            tracing::warn!("Purchase rejected before sending: {e}");
        })?;
        request.send(self.transport.as_ref()).await
    }

    pub fn complete_purchase_request(
        &self,
        query: &CompletePurchaseQuery,
    ) -> Result<CompletePurchaseRequest> {
        CompletePurchaseRequest::new(&self.config, query)
    }

    /// Look up the outcome of a payment once the customer is back from the hosted page.
    #[instrument(skip_all)]
    pub async fn complete_purchase(
        &self,
        query: &CompletePurchaseQuery,
    ) -> Result<CompletePurchaseResponse> {
        let request = self.complete_purchase_request(query).inspect_err(|e| {
            tracing::warn!("Lookup rejected before sending: {e}");
        })?;
        request.send(self.transport.as_ref()).await
    }
}
