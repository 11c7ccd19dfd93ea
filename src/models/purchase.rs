//! # Purchase Models
//!
//! `Purchase` and `PurchaseLine` are immutable once committed: the line
//! freezes unit price and quantity at sale time, so later price changes on
//! the ticket type never rewrite purchase history. The unique
//! `payment_confirmation_id` makes confirmation replays idempotent.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub purchase_id: i64,
    pub buyer_id: i64,
    pub total: BigDecimal,
    pub payment_confirmation_id: String,
    pub payment_status: String,
    pub confirmed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// New Purchase for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    pub buyer_id: i64,
    pub total: BigDecimal,
    pub payment_confirmation_id: String,
    pub payment_status: String,
    pub confirmed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PurchaseLine {
    pub purchase_line_id: i64,
    pub purchase_id: i64,
    pub ticket_type_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

const PURCHASE_COLUMNS: &str =
    "purchase_id, buyer_id, total, payment_confirmation_id, payment_status, confirmed_at, created_at";

impl Purchase {
    pub async fn create(
        conn: &mut PgConnection,
        new_purchase: NewPurchase,
    ) -> Result<Purchase, sqlx::Error> {
        sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases
                (buyer_id, total, payment_confirmation_id, payment_status, confirmed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING purchase_id, buyer_id, total, payment_confirmation_id, payment_status,
                      confirmed_at, created_at
            "#,
        )
        .bind(new_purchase.buyer_id)
        .bind(new_purchase.total)
        .bind(new_purchase.payment_confirmation_id)
        .bind(new_purchase.payment_status)
        .bind(new_purchase.confirmed_at)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        purchase_id: i64,
    ) -> Result<Option<Purchase>, sqlx::Error> {
        sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE purchase_id = $1"
        ))
        .bind(purchase_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Replay guard lookup: a confirmation id that already produced a
    /// purchase must not produce another.
    pub async fn find_by_confirmation_id(
        conn: &mut PgConnection,
        payment_confirmation_id: &str,
    ) -> Result<Option<Purchase>, sqlx::Error> {
        sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE payment_confirmation_id = $1"
        ))
        .bind(payment_confirmation_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn list_by_buyer(
        conn: &mut PgConnection,
        buyer_id: i64,
    ) -> Result<Vec<Purchase>, sqlx::Error> {
        sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE buyer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(buyer_id)
        .fetch_all(&mut *conn)
        .await
    }
}

impl PurchaseLine {
    pub async fn create(
        conn: &mut PgConnection,
        purchase_id: i64,
        ticket_type_id: i64,
        quantity: i32,
        unit_price: BigDecimal,
    ) -> Result<PurchaseLine, sqlx::Error> {
        sqlx::query_as::<_, PurchaseLine>(
            r#"
            INSERT INTO purchase_lines (purchase_id, ticket_type_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING purchase_line_id, purchase_id, ticket_type_id, quantity, unit_price
            "#,
        )
        .bind(purchase_id)
        .bind(ticket_type_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_purchase(
        conn: &mut PgConnection,
        purchase_id: i64,
    ) -> Result<Vec<PurchaseLine>, sqlx::Error> {
        sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT purchase_line_id, purchase_id, ticket_type_id, quantity, unit_price
            FROM purchase_lines
            WHERE purchase_id = $1
            ORDER BY purchase_line_id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&mut *conn)
        .await
    }
}
