//! Transition persistence.
//!
//! Every effective festival transition leaves one append-only audit row,
//! written in the same transaction that updates the festival itself.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

use super::states::FestivalState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FestivalStateTransition {
    pub transition_id: i64,
    pub festival_id: i64,
    pub from_state: FestivalState,
    pub to_state: FestivalState,
    pub actor_id: i64,
    pub created_at: NaiveDateTime,
}

impl FestivalStateTransition {
    pub async fn record(
        conn: &mut PgConnection,
        festival_id: i64,
        from_state: FestivalState,
        to_state: FestivalState,
        actor_id: i64,
    ) -> Result<FestivalStateTransition, sqlx::Error> {
        sqlx::query_as::<_, FestivalStateTransition>(
            r#"
            INSERT INTO festival_state_transitions
                (festival_id, from_state, to_state, actor_id, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING transition_id, festival_id, from_state, to_state, actor_id, created_at
            "#,
        )
        .bind(festival_id)
        .bind(from_state)
        .bind(to_state)
        .bind(actor_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_for_festival(
        conn: &mut PgConnection,
        festival_id: i64,
    ) -> Result<Vec<FestivalStateTransition>, sqlx::Error> {
        sqlx::query_as::<_, FestivalStateTransition>(
            r#"
            SELECT transition_id, festival_id, from_state, to_state, actor_id, created_at
            FROM festival_state_transitions
            WHERE festival_id = $1
            ORDER BY transition_id
            "#,
        )
        .bind(festival_id)
        .fetch_all(&mut *conn)
        .await
    }
}
