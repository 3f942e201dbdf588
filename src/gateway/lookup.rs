use serde::{Deserialize, Serialize};

use crate::gateway::{Response, Result, error::GatewayError};

/// Code the lookup service reports for an approved transaction.
const APPROVED_CODE: &str = "0";

#[derive(Debug, Deserialize)]
struct LookupReply {
    #[serde(rename = "LookupResponse")]
    response: Option<LookupResponse>,
    #[serde(rename = "LookupStatus")]
    status: Option<LookupStatus>,
    response_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupStatus {
    #[serde(rename = "LookupMessage")]
    message: Option<String>,
}

/// `LookupResponse` element. Present but empty elements are kept as `Some("")`.
#[derive(Debug, Clone, Default, Deserialize)]
struct LookupResponse {
    #[serde(rename = "PaystationTransactionID")]
    transaction_id: Option<String>,
    #[serde(rename = "PaystationErrorCode")]
    error_code: Option<String>,
    #[serde(rename = "PaystationErrorMessage")]
    error_message: Option<String>,
    #[serde(rename = "CardNo")]
    card_no: Option<String>,
    #[serde(rename = "CardExpiry")]
    card_expiry: Option<String>,
    #[serde(rename = "CardholderName")]
    cardholder_name: Option<String>,
    #[serde(rename = "CardType")]
    card_type: Option<String>,
}

/// Fields of the lookup reply reachable through [CompletePurchaseResponse::response_field].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    TransactionId,
    ErrorCode,
    ErrorMessage,
    CardNo,
    CardExpiry,
    CardholderName,
    CardType,
}

impl LookupField {
    fn value(self, lookup: &LookupResponse) -> Option<&str> {
        match self {
            Self::TransactionId => lookup.transaction_id.as_deref(),
            Self::ErrorCode => lookup.error_code.as_deref(),
            Self::ErrorMessage => lookup.error_message.as_deref(),
            Self::CardNo => lookup.card_no.as_deref(),
            Self::CardExpiry => lookup.card_expiry.as_deref(),
            Self::CardholderName => lookup.cardholder_name.as_deref(),
            Self::CardType => lookup.card_type.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardExpiry {
    pub year: u8,
    pub month: u8,
}

impl CardExpiry {
    /// Parses the gateway's `YYMM` form. Anything but four digits is rejected.
    pub fn parse(yymm: &str) -> Option<Self> {
        if yymm.len() != 4 || !yymm.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            year: yymm[..2].parse().ok()?,
            month: yymm[2..].parse().ok()?,
        })
    }

    pub fn year_display(&self) -> String {
        format!("{:02}", self.year)
    }

    pub fn month_display(&self) -> String {
        format!("{:02}", self.month)
    }
}

/// Card data for receipts. Numbers are masked by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardDisplayInfo {
    pub number: Option<String>,
    pub expiry_year: Option<String>,
    pub expiry_month: Option<String>,
    pub holder_name: Option<String>,
    pub card_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompletePurchaseResponse {
    lookup: LookupResponse,
    lookup_message: Option<String>,
}

impl CompletePurchaseResponse {
    pub fn parse(document: &str) -> Result<Self> {
        let reply: LookupReply = quick_xml::de::from_str(document)?;
        let lookup_message = reply.status.and_then(|status| status.message);

        match (reply.response, reply.response_error) {
            (Some(lookup), _) => Ok(Self {
                lookup,
                lookup_message,
            }),
            (None, Some(error)) => {
                tracing::warn!(%error, "Lookup service reported an error");
                Err(GatewayError::InvalidResponse(error))
            }
            (None, None) => {
                tracing::warn!("Lookup response without LookupResponse");
                Err(GatewayError::invalid_response())
            }
        }
    }

    fn field(&self, field: LookupField) -> Option<&str> {
        field.value(&self.lookup)
    }

    /// Card related field, only once the payment went through.
    pub fn response_field(&self, field: LookupField) -> Option<&str> {
        if !self.is_successful() {
            return None;
        }
        self.field(field)
    }

    pub fn card_number(&self) -> Option<&str> {
        self.response_field(LookupField::CardNo)
    }

    pub fn card_expiry(&self) -> Option<CardExpiry> {
        self.response_field(LookupField::CardExpiry)
            .and_then(CardExpiry::parse)
    }

    pub fn card_expiry_year(&self) -> Option<String> {
        self.card_expiry().map(|e| e.year_display())
    }

    pub fn card_expiry_month(&self) -> Option<String> {
        self.card_expiry().map(|e| e.month_display())
    }

    pub fn cardholder_name(&self) -> Option<&str> {
        self.response_field(LookupField::CardholderName)
    }

    pub fn card_type(&self) -> Option<&str> {
        self.response_field(LookupField::CardType)
    }

    pub fn card(&self) -> Option<CardDisplayInfo> {
        if !self.is_successful() {
            return None;
        }
        Some(CardDisplayInfo {
            number: self.card_number().map(str::to_owned),
            expiry_year: self.card_expiry_year(),
            expiry_month: self.card_expiry_month(),
            holder_name: self.cardholder_name().map(str::to_owned),
            card_type: self.card_type().map(str::to_owned),
        })
    }
}

impl Response for CompletePurchaseResponse {
    fn is_successful(&self) -> bool {
        self.code() == Some(APPROVED_CODE)
    }

    fn transaction_reference(&self) -> Option<&str> {
        self.field(LookupField::TransactionId)
    }

    fn code(&self) -> Option<&str> {
        self.field(LookupField::ErrorCode)
    }

    /// `PaystationErrorMessage` whenever the element is present, even empty.
    fn message(&self) -> Option<&str> {
        self.field(LookupField::ErrorMessage)
            .or(self.lookup_message.as_deref())
    }
}
