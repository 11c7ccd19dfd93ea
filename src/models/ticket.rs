//! # Ticket Model
//!
//! One row per purchased unit, materialized during purchase confirmation with
//! a globally unique redemption code. The festival a ticket belongs to is
//! resolved through purchase line → ticket type → festival; callers that need
//! that chain in one round trip use [`Ticket::load_context`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::state_machine::{FestivalState, TicketState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub ticket_id: i64,
    pub purchase_line_id: i64,
    pub redemption_code: String,
    pub state: TicketState,
    pub attendee_id: Option<i64>,
    pub nominated_at: Option<NaiveDateTime>,
    pub used_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A ticket joined with the ownership chain that gates every operation on it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TicketContext {
    pub ticket_id: i64,
    pub purchase_line_id: i64,
    pub redemption_code: String,
    pub state: TicketState,
    pub attendee_id: Option<i64>,
    pub ticket_type_id: i64,
    pub requires_nomination: bool,
    pub festival_id: i64,
    pub festival_name: String,
    pub festival_state: FestivalState,
}

const TICKET_COLUMNS: &str = "ticket_id, purchase_line_id, redemption_code, state, attendee_id, \
                              nominated_at, used_at, created_at, updated_at";

const CONTEXT_QUERY: &str = r#"
    SELECT t.ticket_id, t.purchase_line_id, t.redemption_code, t.state, t.attendee_id,
           tt.ticket_type_id, tt.requires_nomination,
           f.festival_id, f.name AS festival_name, f.state AS festival_state
    FROM tickets t
    JOIN purchase_lines pl ON pl.purchase_line_id = t.purchase_line_id
    JOIN ticket_types tt ON tt.ticket_type_id = pl.ticket_type_id
    JOIN festivals f ON f.festival_id = tt.festival_id
"#;

impl Ticket {
    /// Globally unique redemption code; doubles as the QR payload.
    pub fn generate_redemption_code() -> String {
        format!("WP-{}", Uuid::new_v4().simple())
    }

    pub async fn create(
        conn: &mut PgConnection,
        purchase_line_id: i64,
    ) -> Result<Ticket, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (purchase_line_id, redemption_code, state, created_at, updated_at)
            VALUES ($1, $2, 'active', NOW(), NOW())
            RETURNING ticket_id, purchase_line_id, redemption_code, state, attendee_id,
                      nominated_at, used_at, created_at, updated_at
            "#,
        )
        .bind(purchase_line_id)
        .bind(Self::generate_redemption_code())
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        ticket_id: i64,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = $1"
        ))
        .bind(ticket_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn find_by_redemption_code(
        conn: &mut PgConnection,
        redemption_code: &str,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE redemption_code = $1"
        ))
        .bind(redemption_code)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Ticket plus its type/festival chain, by ticket id.
    pub async fn load_context(
        conn: &mut PgConnection,
        ticket_id: i64,
    ) -> Result<Option<TicketContext>, sqlx::Error> {
        sqlx::query_as::<_, TicketContext>(&format!("{CONTEXT_QUERY} WHERE t.ticket_id = $1"))
            .bind(ticket_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Ticket plus its type/festival chain, by redemption code.
    pub async fn load_context_by_code(
        conn: &mut PgConnection,
        redemption_code: &str,
    ) -> Result<Option<TicketContext>, sqlx::Error> {
        sqlx::query_as::<_, TicketContext>(&format!(
            "{CONTEXT_QUERY} WHERE t.redemption_code = $1"
        ))
        .bind(redemption_code)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn set_nominated(
        conn: &mut PgConnection,
        ticket_id: i64,
        attendee_id: i64,
    ) -> Result<Ticket, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET attendee_id = $2, nominated_at = NOW(), updated_at = NOW()
            WHERE ticket_id = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket_id)
        .bind(attendee_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Transition to `Used`, stamping redemption time. Wristband association
    /// is the only caller.
    pub async fn mark_used(conn: &mut PgConnection, ticket_id: i64) -> Result<Ticket, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET state = 'used', used_at = NOW(), updated_at = NOW()
            WHERE ticket_id = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn mark_cancelled(
        conn: &mut PgConnection,
        ticket_id: i64,
    ) -> Result<Ticket, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET state = 'cancelled', updated_at = NOW()
            WHERE ticket_id = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// All tickets minted by one purchase, across its lines.
    pub async fn list_by_purchase(
        conn: &mut PgConnection,
        purchase_id: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT t.ticket_id, t.purchase_line_id, t.redemption_code, t.state, t.attendee_id,
                   t.nominated_at, t.used_at, t.created_at, t.updated_at
            FROM tickets t
            JOIN purchase_lines pl ON pl.purchase_line_id = t.purchase_line_id
            WHERE pl.purchase_id = $1
            ORDER BY t.ticket_id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn list_by_festival(
        conn: &mut PgConnection,
        festival_id: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT t.{}
            FROM tickets t
            JOIN purchase_lines pl ON pl.purchase_line_id = t.purchase_line_id
            JOIN ticket_types tt ON tt.ticket_type_id = pl.ticket_type_id
            WHERE tt.festival_id = $1
            ORDER BY t.ticket_id
            "#,
            TICKET_COLUMNS.replace(", ", ", t.")
        ))
        .bind(festival_id)
        .fetch_all(&mut *conn)
        .await
    }
}
