//! # Wristband Model
//!
//! Each row carries a cashless balance and the at-most-one active-ticket
//! binding. Every balance or binding mutation goes through
//! [`Wristband::lock_by_uid`] first; the plain finders exist for read paths
//! only. `festival_id` is set on first binding and never changes afterwards.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Wristband {
    pub wristband_id: i64,
    pub uid: String,
    pub balance: BigDecimal,
    pub active: bool,
    pub ticket_id: Option<i64>,
    pub festival_id: Option<i64>,
    pub associated_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

const WRISTBAND_COLUMNS: &str = "wristband_id, uid, balance, active, ticket_id, festival_id, \
                                 associated_at, created_at, updated_at";

impl Wristband {
    /// Create a fresh wristband with zero balance, bound to the given ticket
    /// and festival. Used on first association of an unseen UID.
    pub async fn create_bound(
        conn: &mut PgConnection,
        uid: &str,
        ticket_id: i64,
        festival_id: i64,
    ) -> Result<Wristband, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(
            r#"
            INSERT INTO wristbands
                (uid, balance, active, ticket_id, festival_id, associated_at, created_at, updated_at)
            VALUES ($1, 0, TRUE, $2, $3, NOW(), NOW(), NOW())
            RETURNING wristband_id, uid, balance, active, ticket_id, festival_id, associated_at,
                      created_at, updated_at
            "#,
        )
        .bind(uid)
        .bind(ticket_id)
        .bind(festival_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        wristband_id: i64,
    ) -> Result<Option<Wristband>, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(&format!(
            "SELECT {WRISTBAND_COLUMNS} FROM wristbands WHERE wristband_id = $1"
        ))
        .bind(wristband_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn find_by_uid(
        conn: &mut PgConnection,
        uid: &str,
    ) -> Result<Option<Wristband>, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(&format!(
            "SELECT {WRISTBAND_COLUMNS} FROM wristbands WHERE uid = $1"
        ))
        .bind(uid)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Exclusive-lock read by physical UID. Serializes every concurrent
    /// mutation of the same wristband until the caller's transaction ends.
    pub async fn lock_by_uid(
        conn: &mut PgConnection,
        uid: &str,
    ) -> Result<Option<Wristband>, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(&format!(
            "SELECT {WRISTBAND_COLUMNS} FROM wristbands WHERE uid = $1 FOR UPDATE"
        ))
        .bind(uid)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Bind to a ticket, stamping association time and pinning the festival.
    pub async fn bind_to_ticket(
        conn: &mut PgConnection,
        wristband_id: i64,
        ticket_id: i64,
        festival_id: i64,
    ) -> Result<Wristband, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(&format!(
            r#"
            UPDATE wristbands
            SET ticket_id = $2, festival_id = $3, associated_at = NOW(), updated_at = NOW()
            WHERE wristband_id = $1
            RETURNING {WRISTBAND_COLUMNS}
            "#
        ))
        .bind(wristband_id)
        .bind(ticket_id)
        .bind(festival_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Detach any wristband currently bound to `ticket_id`, except the one
    /// being bound. Runs in the same transaction as the re-binding so the
    /// at-most-one invariant holds at every committed instant.
    pub async fn unbind_others_from_ticket(
        conn: &mut PgConnection,
        ticket_id: i64,
        keep_wristband_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE wristbands
            SET ticket_id = NULL, updated_at = NOW()
            WHERE ticket_id = $1 AND wristband_id <> $2
            "#,
        )
        .bind(ticket_id)
        .bind(keep_wristband_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unconditional balance write. Only the wristband ledger calls this,
    /// after validating the new value under the row lock.
    pub async fn set_balance(
        conn: &mut PgConnection,
        wristband_id: i64,
        balance: BigDecimal,
    ) -> Result<Wristband, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(&format!(
            r#"
            UPDATE wristbands
            SET balance = $2, updated_at = NOW()
            WHERE wristband_id = $1
            RETURNING {WRISTBAND_COLUMNS}
            "#
        ))
        .bind(wristband_id)
        .bind(balance)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_festival(
        conn: &mut PgConnection,
        festival_id: i64,
    ) -> Result<Vec<Wristband>, sqlx::Error> {
        sqlx::query_as::<_, Wristband>(&format!(
            "SELECT {WRISTBAND_COLUMNS} FROM wristbands WHERE festival_id = $1 ORDER BY wristband_id"
        ))
        .bind(festival_id)
        .fetch_all(&mut *conn)
        .await
    }
}
