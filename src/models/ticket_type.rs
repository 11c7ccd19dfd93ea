//! # TicketType Model
//!
//! Carries the per-type stock counter at the center of the inventory race.
//! Any path that reads stock with intent to write must go through
//! [`TicketType::lock_for_update`] so the read-check-write happens under an
//! exclusive row lock held to transaction commit.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub ticket_type_id: i64,
    pub festival_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub requires_nomination: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// New TicketType for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicketType {
    pub festival_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub requires_nomination: bool,
}

const TICKET_TYPE_COLUMNS: &str = "ticket_type_id, festival_id, name, description, price, stock, \
                                   requires_nomination, created_at, updated_at";

impl TicketType {
    pub async fn create(
        conn: &mut PgConnection,
        new_ticket_type: NewTicketType,
    ) -> Result<TicketType, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(
            r#"
            INSERT INTO ticket_types
                (festival_id, name, description, price, stock, requires_nomination,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING ticket_type_id, festival_id, name, description, price, stock,
                      requires_nomination, created_at, updated_at
            "#,
        )
        .bind(new_ticket_type.festival_id)
        .bind(new_ticket_type.name)
        .bind(new_ticket_type.description)
        .bind(new_ticket_type.price)
        .bind(new_ticket_type.stock)
        .bind(new_ticket_type.requires_nomination)
        .fetch_one(&mut *conn)
        .await
    }

    /// Plain read, no lock. For listings and price display only; never for a
    /// stock decision.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        ticket_type_id: i64,
    ) -> Result<Option<TicketType>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE ticket_type_id = $1"
        ))
        .bind(ticket_type_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Exclusive-lock read. Blocks until any concurrent holder commits or
    /// rolls back; the lock is released with the caller's transaction.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        ticket_type_id: i64,
    ) -> Result<Option<TicketType>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE ticket_type_id = $1 FOR UPDATE"
        ))
        .bind(ticket_type_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Unconditional stock write. Only the inventory ledger calls this, after
    /// validating the new value under the row lock.
    pub async fn set_stock(
        conn: &mut PgConnection,
        ticket_type_id: i64,
        stock: i32,
    ) -> Result<TicketType, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            r#"
            UPDATE ticket_types
            SET stock = $2, updated_at = NOW()
            WHERE ticket_type_id = $1
            RETURNING {TICKET_TYPE_COLUMNS}
            "#
        ))
        .bind(ticket_type_id)
        .bind(stock)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_festival(
        conn: &mut PgConnection,
        festival_id: i64,
    ) -> Result<Vec<TicketType>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE festival_id = $1 ORDER BY name"
        ))
        .bind(festival_id)
        .fetch_all(&mut *conn)
        .await
    }
}
