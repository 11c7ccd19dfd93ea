//! Shared test fixtures: row factories and collaborator doubles.
//!
//! Each `#[sqlx::test]` gets its own freshly-migrated database, so factories
//! only need uniqueness within a single test; UUID suffixes keep emails and
//! UIDs collision-free anyway.

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use wristpass::error::{Result, WristpassError};
use wristpass::models::{
    Actor, ActorRole, Buyer, Festival, NewActor, NewFestival, NewPurchase, NewTicketType,
    Purchase, PurchaseLine, Ticket, TicketType,
};
use wristpass::payments::{
    PaymentConfirmation, PaymentGateway, PaymentIntentHandle, PaymentStatus,
};
use wristpass::state_machine::FestivalState;

pub fn decimal(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal literal")
}

pub async fn create_actor(pool: &PgPool, role: ActorRole) -> Actor {
    let mut conn = pool.acquire().await.expect("acquire");
    Actor::create(
        &mut conn,
        NewActor {
            email: format!("{}-{}@example.com", role, Uuid::new_v4().simple()),
            name: format!("Test {role}"),
            password_hash: "$argon2id$test".to_string(),
            role,
        },
    )
    .await
    .expect("create actor")
}

pub async fn create_festival(pool: &PgPool, promoter_id: i64) -> Festival {
    let mut conn = pool.acquire().await.expect("acquire");
    Festival::create(
        &mut conn,
        NewFestival {
            name: format!("Festival {}", Uuid::new_v4().simple()),
            description: None,
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 10).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 12).unwrap(),
            location: Some("Riverside".to_string()),
            capacity: Some(20_000),
        },
        promoter_id,
    )
    .await
    .expect("create festival")
}

/// Force a festival into a state without going through the state machine.
/// Setup shortcut only; behavior tests drive the machine itself.
pub async fn force_festival_state(pool: &PgPool, festival_id: i64, state: FestivalState) {
    let mut conn = pool.acquire().await.expect("acquire");
    Festival::update_state(&mut conn, festival_id, state)
        .await
        .expect("update state");
}

pub async fn published_festival(pool: &PgPool, promoter_id: i64) -> Festival {
    let festival = create_festival(pool, promoter_id).await;
    force_festival_state(pool, festival.festival_id, FestivalState::Published).await;
    Festival {
        state: FestivalState::Published,
        ..festival
    }
}

pub async fn create_ticket_type(
    pool: &PgPool,
    festival_id: i64,
    price: &str,
    stock: i32,
    requires_nomination: bool,
) -> TicketType {
    let mut conn = pool.acquire().await.expect("acquire");
    TicketType::create(
        &mut conn,
        NewTicketType {
            festival_id,
            name: "General Admission".to_string(),
            description: None,
            price: decimal(price),
            stock,
            requires_nomination,
        },
    )
    .await
    .expect("create ticket type")
}

/// Persist a buyer, purchase, line, and `quantity` tickets directly through
/// the models, bypassing payment verification. For tests that need existing
/// tickets without exercising the orchestrator.
pub async fn mint_tickets(
    pool: &PgPool,
    ticket_type: &TicketType,
    quantity: i32,
) -> (Purchase, Vec<Ticket>) {
    let mut conn = pool.acquire().await.expect("acquire");
    let buyer = Buyer::find_or_create(
        &mut conn,
        &format!("buyer-{}@example.com", Uuid::new_v4().simple()),
        "Factory Buyer",
        None,
    )
    .await
    .expect("create buyer");

    let purchase = Purchase::create(
        &mut conn,
        NewPurchase {
            buyer_id: buyer.buyer_id,
            total: ticket_type.price.clone() * BigDecimal::from(quantity),
            payment_confirmation_id: format!("pi_{}", Uuid::new_v4().simple()),
            payment_status: "paid".to_string(),
            confirmed_at: None,
        },
    )
    .await
    .expect("create purchase");

    let line = PurchaseLine::create(
        &mut conn,
        purchase.purchase_id,
        ticket_type.ticket_type_id,
        quantity,
        ticket_type.price.clone(),
    )
    .await
    .expect("create line");

    let mut tickets = Vec::with_capacity(quantity as usize);
    for _ in 0..quantity {
        tickets.push(
            Ticket::create(&mut conn, line.purchase_line_id)
                .await
                .expect("create ticket"),
        );
    }
    (purchase, tickets)
}

pub fn unique_uid() -> String {
    format!("NFC-{}", Uuid::new_v4().simple())
}

/// In-memory payment gateway: confirmations are registered up front and
/// served by id; created intents are recorded for assertions.
#[derive(Default)]
pub struct StaticGateway {
    confirmations: Mutex<HashMap<String, PaymentConfirmation>>,
    pub created_intents: Mutex<Vec<(i64, String)>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_succeeded(self, confirmation_id: &str, amount_minor: i64, currency: &str) -> Self {
        self.register(PaymentConfirmation {
            confirmation_id: confirmation_id.to_string(),
            status: PaymentStatus::Succeeded,
            amount_minor,
            currency: currency.to_string(),
            created_at: None,
        });
        self
    }

    pub fn register(&self, confirmation: PaymentConfirmation) {
        self.confirmations
            .lock()
            .expect("gateway lock")
            .insert(confirmation.confirmation_id.clone(), confirmation);
    }
}

#[async_trait]
impl PaymentGateway for StaticGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntentHandle> {
        let intent_id = format!("pi_{}", Uuid::new_v4().simple());
        self.created_intents
            .lock()
            .expect("gateway lock")
            .push((amount_minor, currency.to_string()));
        Ok(PaymentIntentHandle {
            client_secret: format!("{intent_id}_secret"),
            intent_id,
        })
    }

    async fn retrieve_confirmation(&self, confirmation_id: &str) -> Result<PaymentConfirmation> {
        self.confirmations
            .lock()
            .expect("gateway lock")
            .get(confirmation_id)
            .cloned()
            .ok_or_else(|| {
                WristpassError::PaymentGateway(format!("unknown confirmation {confirmation_id}"))
            })
    }
}
