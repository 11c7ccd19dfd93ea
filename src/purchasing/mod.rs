//! # Purchase Orchestrator
//!
//! Confirms a paid purchase as one atomic unit: verify the gateway
//! confirmation, lock and decrement inventory, freeze the price into a
//! purchase line, and mint one ticket per unit. Gateway I/O happens before
//! the transaction opens; the buyer notification happens after it commits.
//!
//! A replayed confirmation id returns the already-committed purchase instead
//! of minting a second set of tickets; the unique constraint on
//! `purchases.payment_confirmation_id` backs the check under concurrency.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::PaymentConfig;
use crate::error::{Result, WristpassError};
use crate::models::{
    Buyer, Festival, NewPurchase, Purchase, PurchaseLine, Ticket, TicketType,
};
use crate::notifications::{self, Notifier};
use crate::payments::{PaymentGateway, PaymentIntentHandle, PaymentStatus};
use crate::{inventory, money};

/// Everything the caller knows at confirmation time.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub buyer_email: String,
    pub buyer_name: String,
    pub buyer_phone: Option<String>,
    pub ticket_type_id: i64,
    pub quantity: i32,
    pub payment_confirmation_id: String,
}

/// Committed outcome of a confirmed purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub purchase: Purchase,
    pub tickets: Vec<Ticket>,
    pub festival_name: String,
    /// True when the confirmation id had already been processed and the
    /// original purchase was returned unchanged.
    pub replayed: bool,
}

pub struct PurchaseOrchestrator {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    payment: PaymentConfig,
}

impl PurchaseOrchestrator {
    pub fn new(
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            pool,
            gateway,
            notifier,
            payment,
        }
    }

    /// Start a checkout: compute the price server-side and open a gateway
    /// intent for it. Read-only; takes no locks.
    pub async fn initiate_payment(
        &self,
        ticket_type_id: i64,
        quantity: i32,
    ) -> Result<PaymentIntentHandle> {
        if quantity <= 0 {
            return Err(WristpassError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let mut conn = self.pool.acquire().await?;
        let ticket_type = TicketType::find_by_id(&mut *conn, ticket_type_id)
            .await?
            .ok_or(WristpassError::TicketTypeNotFound { id: ticket_type_id })?;
        let festival = Festival::find_by_id(&mut *conn, ticket_type.festival_id)
            .await?
            .ok_or(WristpassError::FestivalNotFound {
                id: ticket_type.festival_id,
            })?;
        drop(conn);

        if !festival.state.allows_operations() {
            return Err(WristpassError::FestivalNotPublished {
                name: festival.name,
            });
        }

        let total = money::line_total(&ticket_type.price, quantity);
        let amount_minor = money::to_minor_units(&total)?;

        info!(
            ticket_type_id,
            quantity, amount_minor, "initiating payment intent"
        );
        self.gateway
            .create_intent(amount_minor, &self.payment.expected_currency)
            .await
    }

    /// Confirm a purchase against an external payment confirmation.
    ///
    /// Stock decrement, purchase/line creation, and ticket minting commit or
    /// roll back as one unit. The confirmation notification is dispatched
    /// after commit and never affects the result.
    pub async fn confirm_purchase(&self, request: PurchaseRequest) -> Result<PurchaseReceipt> {
        Self::validate_request(&request)?;

        // Buyer resolution is idempotent by email and intentionally outside
        // the sale transaction, mirroring its use from other entry points.
        let mut conn = self.pool.acquire().await?;
        let buyer = Buyer::find_or_create(
            &mut *conn,
            &request.buyer_email,
            &request.buyer_name,
            request.buyer_phone.as_deref(),
        )
        .await?;
        drop(conn);

        // Gateway round trip strictly before any row lock is taken.
        let confirmation = self
            .gateway
            .retrieve_confirmation(&request.payment_confirmation_id)
            .await?;
        if confirmation.status != PaymentStatus::Succeeded {
            return Err(WristpassError::InvalidPayment {
                reason: format!("payment not completed (status: {:?})", confirmation.status),
            });
        }
        if !confirmation
            .currency
            .eq_ignore_ascii_case(&self.payment.expected_currency)
        {
            return Err(WristpassError::InvalidPayment {
                reason: format!(
                    "payment currency {} does not match expected {}",
                    confirmation.currency, self.payment.expected_currency
                ),
            });
        }

        let mut tx = self.pool.begin().await?;

        // Replay guard: a confirmation id that already produced a purchase
        // returns it unchanged instead of decrementing stock again.
        if let Some(existing) =
            Purchase::find_by_confirmation_id(&mut *tx, &request.payment_confirmation_id).await?
        {
            let receipt = Self::load_receipt(&mut tx, existing).await?;
            tx.commit().await?;
            warn!(
                purchase_id = receipt.purchase.purchase_id,
                confirmation_id = %request.payment_confirmation_id,
                "replayed payment confirmation, returning existing purchase"
            );
            return Ok(receipt);
        }

        let ticket_type = TicketType::lock_for_update(&mut *tx, request.ticket_type_id)
            .await?
            .ok_or(WristpassError::TicketTypeNotFound {
                id: request.ticket_type_id,
            })?;

        let festival = Festival::find_by_id(&mut *tx, ticket_type.festival_id)
            .await?
            .ok_or(WristpassError::FestivalNotFound {
                id: ticket_type.festival_id,
            })?;
        if !festival.state.allows_operations() {
            return Err(WristpassError::FestivalNotPublished {
                name: festival.name,
            });
        }

        // Exact amount check in minor units guards against quantity or price
        // tampering between intent creation and confirmation.
        let total = money::line_total(&ticket_type.price, request.quantity);
        let expected_minor = money::to_minor_units(&total)?;
        if confirmation.amount_minor != expected_minor {
            return Err(WristpassError::InvalidPayment {
                reason: format!(
                    "payment amount {} does not match expected {expected_minor}",
                    confirmation.amount_minor
                ),
            });
        }

        inventory::reserve(&mut *tx, request.ticket_type_id, request.quantity).await?;

        let purchase = Purchase::create(
            &mut *tx,
            NewPurchase {
                buyer_id: buyer.buyer_id,
                total,
                payment_confirmation_id: confirmation.confirmation_id.clone(),
                payment_status: "paid".to_string(),
                confirmed_at: confirmation.created_at,
            },
        )
        .await?;

        let line = PurchaseLine::create(
            &mut *tx,
            purchase.purchase_id,
            ticket_type.ticket_type_id,
            request.quantity,
            ticket_type.price.clone(),
        )
        .await?;

        let mut tickets = Vec::with_capacity(request.quantity as usize);
        for _ in 0..request.quantity {
            tickets.push(Ticket::create(&mut *tx, line.purchase_line_id).await?);
        }

        tx.commit().await?;

        info!(
            purchase_id = purchase.purchase_id,
            buyer_id = buyer.buyer_id,
            ticket_type_id = ticket_type.ticket_type_id,
            quantity = request.quantity,
            "purchase confirmed"
        );

        self.dispatch_confirmation(&buyer, &festival.name, &tickets);

        Ok(PurchaseReceipt {
            purchase,
            tickets,
            festival_name: festival.name,
            replayed: false,
        })
    }

    fn validate_request(request: &PurchaseRequest) -> Result<()> {
        if request.buyer_email.trim().is_empty() || request.buyer_name.trim().is_empty() {
            return Err(WristpassError::Validation(
                "buyer email and name are required".to_string(),
            ));
        }
        if request.quantity <= 0 {
            return Err(WristpassError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        if request.payment_confirmation_id.trim().is_empty() {
            return Err(WristpassError::Validation(
                "payment confirmation id is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Rebuild the receipt for an already-committed purchase.
    async fn load_receipt(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        purchase: Purchase,
    ) -> Result<PurchaseReceipt> {
        let tickets = Ticket::list_by_purchase(&mut *tx, purchase.purchase_id).await?;
        let lines = PurchaseLine::list_by_purchase(&mut *tx, purchase.purchase_id).await?;
        let festival_name = match lines.first() {
            Some(line) => {
                let ticket_type = TicketType::find_by_id(&mut *tx, line.ticket_type_id)
                    .await?
                    .ok_or(WristpassError::TicketTypeNotFound {
                        id: line.ticket_type_id,
                    })?;
                Festival::find_by_id(&mut *tx, ticket_type.festival_id)
                    .await?
                    .map(|f| f.name)
                    .unwrap_or_default()
            }
            None => String::new(),
        };
        Ok(PurchaseReceipt {
            purchase,
            tickets,
            festival_name,
            replayed: true,
        })
    }

    /// Fire-and-forget buyer notification; failures are logged and swallowed.
    fn dispatch_confirmation(&self, buyer: &Buyer, festival_name: &str, tickets: &[Ticket]) {
        let notifier = Arc::clone(&self.notifier);
        let email = buyer.email.clone();
        let name = buyer.name.clone();
        let festival = festival_name.to_string();
        let tickets = tickets.to_vec();
        tokio::spawn(async move {
            notifications::dispatch("purchase_confirmation", async {
                notifier
                    .send_purchase_confirmation(&email, &name, &festival, &tickets)
                    .await
            })
            .await;
        });
    }
}
