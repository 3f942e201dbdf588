/// Query parameters Paystation appends when it sends the customer back.
///
/// Only `ti` is used; the rest is informational and is re-checked through the
/// lookup service, never trusted as is.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CompletePurchaseQuery {
    /// Transaction reference
    pub ti: Option<String>,
    /// Error code
    pub ec: Option<String>,
    /// Error message
    pub em: Option<String>,
    /// Merchant session
    pub ms: Option<String>,
    /// Amount in minor units
    pub am: Option<String>,
    pub futurepaytoken: Option<String>,
}

impl CompletePurchaseQuery {
    pub fn from_query_str(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(query)
    }

    pub fn transaction_reference(&self) -> Option<&str> {
        self.ti.as_deref().filter(|ti| !ti.is_empty())
    }
}
