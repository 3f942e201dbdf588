use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use paystation_gateway::{
    CompletePurchaseQuery, CompletePurchaseResponse, Gateway, PurchaseParameters,
    PurchaseResponse, Response,
    gateway::{CardDisplayInfo, RedirectMethod, mask},
};
use serde::Serialize;
use tracing::instrument;

use crate::service::{Result, ServiceErrorResponse, Status};

#[instrument(skip_all)]
pub async fn purchase(
    State(gateway): State<Gateway>,
    Json(params): Json<PurchaseParameters>,
) -> Result<ServiceResponse<PurchaseOutcome>> {
    match gateway.purchase(params).await {
        Ok(res) => {
            tracing::info!(
                transaction_reference = ?res.transaction_reference(),
                code = ?res.code(),
                "Created purchase"
            );
            Ok(ServiceResponse::new(res.into()))
        }
        Err(e) => {
            tracing::error!("Failed to create a purchase: {e}");
            Err(e.into())
        }
    }
}

/// Landing page for customers coming back from the hosted payment page.
#[instrument(skip_all)]
pub async fn complete_purchase(
    State(gateway): State<Gateway>,
    Query(query): Query<CompletePurchaseQuery>,
) -> Result<ServiceResponse<CompletionOutcome>> {
    match gateway.complete_purchase(&query).await {
        Ok(res) => {
            tracing::info!(
                transaction_reference = ?res.transaction_reference(),
                successful = res.is_successful(),
                "Dispatched purchase outcome"
            );
            Ok(ServiceResponse::new(res.into()))
        }
        Err(e) => {
            tracing::error!("Failed to complete purchase: {e}");
            Err(e.into())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse<T> {
    result: bool,
    #[serde(flatten)]
    data: T,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self { result: true, data }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let value = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(e) => {
                return ServiceErrorResponse::new(format!("failed to serialize response: {e}"))
                    .into_response();
            }
        };
        tracing::debug!(data = %mask::secure_value(&value), "Service response payload");
        axum::Json(value).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseOutcome {
    pub status: Status,
    pub transaction_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_request: Option<RedirectRequest>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RedirectRequest {
    pub url: String,
    pub method: RedirectMethod,
}

impl From<PurchaseResponse> for PurchaseOutcome {
    fn from(value: PurchaseResponse) -> Self {
        let method = value.redirect_method();
        let redirect_request = value
            .redirect_url
            .map(|url| RedirectRequest { url, method });
        Self {
            status: if redirect_request.is_some() {
                Status::Pending
            } else {
                Status::Declined
            },
            transaction_reference: value.transaction_reference,
            redirect_request,
            code: value.code,
            message: value.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionOutcome {
    pub status: Status,
    pub transaction_reference: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardDisplayInfo>,
}

impl From<CompletePurchaseResponse> for CompletionOutcome {
    fn from(value: CompletePurchaseResponse) -> Self {
        Self {
            status: if value.is_successful() {
                Status::Approved
            } else {
                Status::Declined
            },
            transaction_reference: value.transaction_reference().map(str::to_owned),
            code: value.code().map(str::to_owned),
            message: value.message().map(str::to_owned),
            card: value.card(),
        }
    }
}

pub fn router() -> axum::Router<crate::state::AppState> {
    axum::Router::new()
        .route("/purchase", post(purchase))
        .route("/return", get(complete_purchase))
}

/// `Json` extractor wrapper that customizes the error from `axum::extract::Json`
pub struct Json<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for Json<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceErrorResponse;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(e) => Err(ServiceErrorResponse::new(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn redirect_is_pending() {
        let response = PurchaseResponse {
            transaction_reference: Some("023523354-01".into()),
            redirect_url: Some("https://payments.paystation.co.nz/hosted/?hk=abc".into()),
            code: None,
            message: None,
        };
        let value = serde_json::to_value(ServiceResponse::new(PurchaseOutcome::from(response))).unwrap();
        assert_eq!(
            value,
            json!({
                "result": true,
                "status": "pending",
                "transaction_reference": "023523354-01",
                "redirect_request": {
                    "url": "https://payments.paystation.co.nz/hosted/?hk=abc",
                    "method": "GET",
                },
                "code": null,
                "message": null,
            })
        );
    }

    #[test]
    fn approved_lookup_carries_card() {
        let response = CompletePurchaseResponse::parse(
            "<PaystationQuickLookup><LookupResponse>\
             <PaystationTransactionID>1212123241-01</PaystationTransactionID>\
             <PaystationErrorCode>0</PaystationErrorCode>\
             <PaystationErrorMessage>Transaction successful</PaystationErrorMessage>\
             <CardNo>512345XXXXXXX346</CardNo><CardExpiry>1705</CardExpiry>\
             </LookupResponse></PaystationQuickLookup>",
        )
        .unwrap();
        let value = serde_json::to_value(CompletionOutcome::from(response)).unwrap();
        assert_eq!(value["status"], "approved");
        assert_eq!(value["card"]["number"], "512345XXXXXXX346");
        assert_eq!(value["card"]["expiry_month"], "05");
    }

    #[test]
    fn gateway_errors_keep_their_kind() {
        let value = serde_json::to_value(ServiceErrorResponse::from(
            paystation_gateway::GatewayError::Validation("Transaction reference is missing".into()),
        ))
        .unwrap();
        assert_eq!(
            value,
            json!({ "result": false, "error": "Transaction reference is missing", "kind": "validation" })
        );
    }
}
