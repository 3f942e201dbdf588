//! Paystation hosted payment page integration.
//!
//! - [gateway] (request building, signing and reply parsing)
#![doc = include_str!("../README.md")]

/// Paystation gateway implementation
///
/// Builds signed purchase initiations, interprets the XML replies and checks
/// the outcome through the quick lookup service once the customer returns.
pub mod gateway;

pub use gateway::{
    CompletePurchaseQuery, CompletePurchaseResponse, Gateway, GatewayConfig, GatewayError,
    PurchaseParameters, PurchaseResponse, Response,
};
