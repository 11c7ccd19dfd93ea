//! # Payment Gateway Interface
//!
//! The core never captures payments and never stores card data. It asks the
//! gateway to create an intent for a computed amount, and later verifies the
//! confirmation the gateway produced for that intent. Gateway I/O always
//! happens outside the row-lock window.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Gateway-reported status of a payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    Canceled,
}

/// The gateway's authoritative record that an amount was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub confirmation_id: String,
    pub status: PaymentStatus,
    /// Amount in minor currency units (cents).
    pub amount_minor: i64,
    /// Lowercase ISO 4217 currency code.
    pub currency: String,
    pub created_at: Option<NaiveDateTime>,
}

/// Handle returned when a checkout is initiated; the client completes the
/// payment against the gateway with this secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentHandle {
    pub intent_id: String,
    pub client_secret: String,
}

/// External payment gateway collaborator.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for `amount_minor` in `currency`.
    async fn create_intent(&self, amount_minor: i64, currency: &str)
        -> Result<PaymentIntentHandle>;

    /// Retrieve a confirmation by its gateway identifier.
    async fn retrieve_confirmation(&self, confirmation_id: &str) -> Result<PaymentConfirmation>;
}
