use std::fmt;

/// Account settings shared by every request a [super::Gateway] builds.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Paystation account id (`pstn_pi`).
    pub paystation_id: String,
    /// Gateway id assigned by Paystation (`pstn_gi`).
    pub gateway_id: String,
    /// Key for signed requests. Without it requests are sent unsigned and no return url is passed.
    pub hmac_key: Option<String>,
    /// Mark every purchase as a test transaction.
    pub test_mode: bool,
}

impl GatewayConfig {
    pub fn new(paystation_id: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        Self {
            paystation_id: paystation_id.into(),
            gateway_id: gateway_id.into(),
            ..Default::default()
        }
    }

    pub fn with_hmac_key(mut self, key: impl Into<String>) -> Self {
        self.hmac_key = Some(key.into());
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Reads `PAYSTATION_ID`, `PAYSTATION_GATEWAY_ID`, `PAYSTATION_HMAC_KEY` and
    /// `PAYSTATION_TEST_MODE`. Missing ids stay empty and fail request validation.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let config = Self {
            paystation_id: var("PAYSTATION_ID").unwrap_or_default(),
            gateway_id: var("PAYSTATION_GATEWAY_ID").unwrap_or_default(),
            hmac_key: var("PAYSTATION_HMAC_KEY"),
            test_mode: var("PAYSTATION_TEST_MODE")
                .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")),
        };
        if config.paystation_id.is_empty() || config.gateway_id.is_empty() {
            tracing::warn!("PAYSTATION_ID or PAYSTATION_GATEWAY_ID is not defined");
        }
        config
    }

    pub fn hmac_key(&self) -> Option<&str> {
        self.hmac_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("paystation_id", &self.paystation_id)
            .field("gateway_id", &self.gateway_id)
            .field("hmac_key", &self.hmac_key().map(|_| "***"))
            .field("test_mode", &self.test_mode)
            .finish()
    }
}
