use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::gateway::{
    GatewayConfig, Result, SessionIdGenerator, auth, error::GatewayError, from, mask,
    redirect::PurchaseResponse,
    transport::{self, Transport},
};

/// Customer data attached to a purchase. Only used to fill `pstn_mc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseParameters {
    pub amount: Option<Decimal>,
    /// ISO 4217 code
    pub currency: Option<String>,
    #[serde(default)]
    pub card: CardDetails,
    pub merchant_session: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
    pub transaction_id: Option<String>,
    pub return_url: Option<Url>,
}

/// Form fields posted to the initiation endpoint, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseData {
    pub paystation: &'static str,
    #[serde(rename = "pstn_pi")]
    pub paystation_id: String,
    #[serde(rename = "pstn_gi")]
    pub gateway_id: String,
    #[serde(rename = "pstn_ms")]
    pub merchant_session: String,
    #[serde(rename = "pstn_am")]
    pub amount: u64,
    #[serde(rename = "pstn_cu", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(rename = "pstn_tm", skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<&'static str>,
    #[serde(rename = "pstn_mc", skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<String>,
    #[serde(rename = "pstn_mr", skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,
    /// Return url, url-encoded once more before the form itself is encoded.
    #[serde(rename = "pstn_du", skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    data: PurchaseData,
    body: String,
    hmac_key: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl PurchaseRequest {
    pub const ENDPOINT: &'static str = "https://www.paystation.co.nz/direct/paystation.dll";

    /// Validate the parameters and build the form. No network call is made.
    pub fn new(
        config: &GatewayConfig,
        params: PurchaseParameters,
        session_ids: &dyn SessionIdGenerator,
    ) -> Result<Self> {
        let mut missing = Vec::new();
        if params.amount.is_none() {
            missing.push("amount");
        }
        if config.paystation_id.is_empty() {
            missing.push("paystation_id");
        }
        if config.gateway_id.is_empty() {
            missing.push("gateway_id");
        }
        let amount = match (params.amount, missing.as_slice()) {
            (Some(amount), []) => amount,
            (_, [field]) => {
                return Err(GatewayError::Validation(format!(
                    "The {field} parameter is required"
                )));
            }
            (_, fields) => {
                return Err(GatewayError::Validation(format!(
                    "The {} parameters are required",
                    fields.join(", ")
                )));
            }
        };

        let currency = non_empty(params.currency).map(|c| c.to_uppercase());
        let amount = from::amount_integer(amount, currency.as_deref())?;
        let merchant_session =
            non_empty(params.merchant_session).unwrap_or_else(|| session_ids.generate());
        let hmac_key = config.hmac_key().map(str::to_owned);
        let return_url = match (&hmac_key, params.return_url) {
            (Some(_), Some(url)) => {
                Some(url::form_urlencoded::byte_serialize(url.as_str().as_bytes()).collect())
            }
            _ => None,
        };

        let data = PurchaseData {
            paystation: "_empty",
            paystation_id: config.paystation_id.clone(),
            gateway_id: config.gateway_id.clone(),
            merchant_session,
            amount,
            currency,
            test_mode: (params.test_mode || config.test_mode).then_some("T"),
            customer_details: params.card.customer_details(),
            merchant_reference: non_empty(params.transaction_id),
            return_url,
        };
        let body = serde_urlencoded::to_string(&data)?;

        Ok(Self {
            data,
            body,
            hmac_key,
        })
    }

    pub fn data(&self) -> &PurchaseData {
        &self.data
    }

    /// Url-encoded form, exactly as signed and posted.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Initiation endpoint, carrying the HMAC query pair when a key is configured.
    pub fn endpoint(&self) -> Url {
        auth::endpoint(Self::ENDPOINT, &self.body, self.hmac_key.as_deref())
    }

    #[instrument(skip_all, fields(merchant_session = %self.data.merchant_session))]
    pub async fn send(&self, transport: &dyn Transport) -> Result<PurchaseResponse> {
        let url = self.endpoint();
        tracing::debug!(
            url = %mask::secure_url(&url),
            data = %mask::secure_serializable(&self.data),
            "Gateway API purchase request"
        );
        let body = transport::post_form(transport, &url, self.body.clone()).await?;
        tracing::trace!(%body, "Gateway API purchase response");
        let response = PurchaseResponse::parse(&body)?;
        tracing::info!(
            transaction_reference = ?response.transaction_reference,
            code = ?response.code,
            redirect = response.redirect_url.is_some(),
            "Purchase initiated"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::gateway::transport::mock::MockTransport;

    struct FixedSession;

    impl SessionIdGenerator for FixedSession {
        fn generate(&self) -> String {
            "generated-session".into()
        }
    }

    fn config() -> GatewayConfig {
        GatewayConfig::new("500600", "FOOBAR")
    }

    fn params(amount: &str) -> PurchaseParameters {
        PurchaseParameters {
            amount: Some(Decimal::from_str(amount).unwrap()),
            currency: Some("nzd".into()),
            card: CardDetails {
                name: Some("Example User".into()),
                city: Some("Wellington".into()),
                ..Default::default()
            },
            merchant_session: Some("12345678".into()),
            ..Default::default()
        }
    }

    #[test]
    fn builds_required_and_present_fields() {
        let request = PurchaseRequest::new(&config(), params("10.00"), &FixedSession).unwrap();
        assert_eq!(
            request.body(),
            "paystation=_empty&pstn_pi=500600&pstn_gi=FOOBAR&pstn_ms=12345678&pstn_am=1000\
             &pstn_cu=NZD&pstn_mc=Example+User%2CWellington"
        );
        assert_eq!(request.endpoint().as_str(), PurchaseRequest::ENDPOINT);
    }

    #[test]
    fn optional_fields() {
        let mut params = params("1.00");
        params.test_mode = true;
        params.transaction_id = Some("order-7".into());
        params.currency = Some(String::new());
        let data = PurchaseRequest::new(&config(), params, &FixedSession).unwrap().data().clone();
        assert_eq!(data.test_mode, Some("T"));
        assert_eq!(data.merchant_reference.as_deref(), Some("order-7"));
        assert_eq!(data.currency, None);
        assert_eq!(data.return_url, None);
    }

    #[test]
    fn test_mode_from_config() {
        let config = config().with_test_mode(true);
        let request = PurchaseRequest::new(&config, params("1.00"), &FixedSession).unwrap();
        assert!(request.body().contains("&pstn_tm=T"));
    }

    #[test]
    fn generates_missing_session() {
        for session in [None, Some(String::new())] {
            let mut params = params("1.00");
            params.merchant_session = session;
            let request = PurchaseRequest::new(&config(), params, &FixedSession).unwrap();
            assert_eq!(request.data().merchant_session, "generated-session");
        }
    }

    #[test]
    fn return_url_needs_hmac_key() {
        let mut params = params("1.00");
        params.return_url = Some(Url::parse("http://example.com/return?a=1").unwrap());

        let unsigned = PurchaseRequest::new(&config(), params.clone(), &FixedSession).unwrap();
        assert_eq!(unsigned.data().return_url, None);

        let signed =
            PurchaseRequest::new(&config().with_hmac_key("abc"), params, &FixedSession).unwrap();
        assert_eq!(
            signed.data().return_url.as_deref(),
            Some("http%3A%2F%2Fexample.com%2Freturn%3Fa%3D1")
        );
        assert!(
            signed
                .body()
                .ends_with("&pstn_du=http%253A%252F%252Fexample.com%252Freturn%253Fa%253D1")
        );
    }

    #[test]
    fn signed_endpoint_matches_body() {
        let request =
            PurchaseRequest::new(&config().with_hmac_key("abc"), params("1.00"), &FixedSession)
                .unwrap();
        let url = request.endpoint();
        let (timestamp, hmac) = auth::signature_of(&url).unwrap();
        assert_eq!(hmac, auth::sign(timestamp, request.body(), "abc"));
    }

    #[test]
    fn valid_amounts_pass_validation() {
        for amount in ["0", "0.00", "0.01", "10", "10.5", "99999.99"] {
            assert!(PurchaseRequest::new(&config(), params(amount), &FixedSession).is_ok());
        }
    }

    #[test]
    fn negative_amounts_fail_validation() {
        for amount in ["-0.01", "-1", "-12345.00"] {
            let err = PurchaseRequest::new(&config(), params(amount), &FixedSession).unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn lists_missing_fields() {
        let mut params = params("1.00");
        params.amount = None;
        let err = PurchaseRequest::new(&GatewayConfig::default(), params.clone(), &FixedSession)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The amount, paystation_id, gateway_id parameters are required"
        );

        let err = PurchaseRequest::new(&config(), params, &FixedSession).unwrap_err();
        assert_eq!(err.to_string(), "The amount parameter is required");
    }

    #[tokio::test]
    async fn sends_signed_form() {
        let transport = MockTransport::ok(include_str!("../../tests/fixtures/purchase_success.xml"));
        let request =
            PurchaseRequest::new(&config().with_hmac_key("abc"), params("10.00"), &FixedSession)
                .unwrap();
        let response = request.send(&transport).await.unwrap();
        assert_eq!(response.transaction_reference.as_deref(), Some("023523354-01"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, request.body());
        assert!(calls[0].url.as_str().starts_with(PurchaseRequest::ENDPOINT));
        let (timestamp, hmac) = auth::signature_of(&calls[0].url).unwrap();
        assert_eq!(hmac, auth::sign(timestamp, request.body(), "abc"));
    }
}
