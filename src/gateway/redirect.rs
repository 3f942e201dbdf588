use serde::{Deserialize, Serialize};

use crate::gateway::{Response, Result, error::GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedirectMethod {
    Get,
}

/// Initiation reply as sent by the gateway. Any root element name is accepted.
#[derive(Debug, Deserialize)]
struct PurchaseReply {
    #[serde(rename = "PaystationTransactionID")]
    transaction_id: Option<String>,
    #[serde(rename = "DigitalOrder")]
    digital_order: Option<String>,
    ec: Option<String>,
    em: Option<String>,
}

/// Reply to a purchase initiation.
///
/// Never successful on its own: it either hands out the hosted payment page
/// the customer has to be sent to, or explains why the purchase was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseResponse {
    pub transaction_reference: Option<String>,
    pub redirect_url: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl PurchaseResponse {
    pub fn parse(document: &str) -> Result<Self> {
        let reply: PurchaseReply = quick_xml::de::from_str(document)?;
        let Some(transaction_id) = reply.transaction_id else {
            tracing::warn!(code = ?reply.ec, "Purchase response without transaction id");
            return Err(GatewayError::invalid_response());
        };
        Ok(Self {
            transaction_reference: Some(transaction_id).filter(|id| !id.is_empty()),
            redirect_url: reply.digital_order,
            code: reply.ec,
            message: reply.em,
        })
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    pub fn redirect_method(&self) -> RedirectMethod {
        RedirectMethod::Get
    }
}

impl Response for PurchaseResponse {
    fn is_successful(&self) -> bool {
        false
    }

    fn is_redirect(&self) -> bool {
        self.redirect_url.is_some()
    }

    fn transaction_reference(&self) -> Option<&str> {
        self.transaction_reference.as_deref()
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
