use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::gateway::{error::GatewayError, payin::CardDetails};

/// Gateway limit for `pstn_mc`, in bytes.
pub const CUSTOMER_DETAILS_LIMIT: usize = 255;

impl CardDetails {
    /// Comma joined customer fields, empty ones skipped, cut to the gateway limit.
    pub fn customer_details(&self) -> Option<String> {
        let mut joined = [
            &self.name,
            &self.company,
            &self.email,
            &self.phone,
            &self.address1,
            &self.address2,
            &self.city,
            &self.state,
            &self.country,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(",");
        truncate_on_char_boundary(&mut joined, CUSTOMER_DETAILS_LIMIT);
        (!joined.is_empty()).then_some(joined)
    }
}

/// Cut `value` to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_on_char_boundary(value: &mut String, max: usize) {
    if value.len() <= max {
        return;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
}

/// Number of minor unit digits for an ISO 4217 currency.
pub fn currency_exponent(currency: Option<&str>) -> u32 {
    match currency {
        Some(
            "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX"
            | "UYI" | "VND" | "VUV" | "XAF" | "XOF" | "XPF",
        ) => 0,
        Some("BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND") => 3,
        _ => 2,
    }
}

/// Amount in minor units (cents for NZD) as sent in `pstn_am`.
pub fn amount_integer(amount: Decimal, currency: Option<&str>) -> Result<u64, GatewayError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(GatewayError::Validation(
            "A negative amount is not allowed.".into(),
        ));
    }
    let exponent = currency_exponent(currency);
    if amount.normalize().scale() > exponent {
        return Err(GatewayError::Validation(format!(
            "Amount precision is too high for currency {}.",
            currency.unwrap_or("(default)")
        )));
    }
    let factor = Decimal::from(10_u64.pow(exponent));
    amount
        .checked_mul(factor)
        .and_then(|minor| minor.to_u64())
        .ok_or_else(|| GatewayError::Validation("Amount is out of range.".into()))
}
