//! # Festival Model
//!
//! The aggregate every other resource hangs off. Lifecycle state is mutated
//! only through the festival state machine; the model layer exposes the raw
//! row operations the machine drives.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

use crate::state_machine::FestivalState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Festival {
    pub festival_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub promoter_id: i64,
    pub state: FestivalState,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// New Festival for creation (without generated fields). State always starts
/// at `Draft` regardless of caller input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFestival {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

/// Metadata changes applied by `update_festival`. Lifecycle state is not
/// updatable through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FestivalChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

const FESTIVAL_COLUMNS: &str = "festival_id, name, description, start_date, end_date, location, \
                                capacity, promoter_id, state, created_at, updated_at";

impl Festival {
    pub async fn create(
        conn: &mut PgConnection,
        new_festival: NewFestival,
        promoter_id: i64,
    ) -> Result<Festival, sqlx::Error> {
        sqlx::query_as::<_, Festival>(
            r#"
            INSERT INTO festivals
                (name, description, start_date, end_date, location, capacity, promoter_id, state,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', NOW(), NOW())
            RETURNING festival_id, name, description, start_date, end_date, location, capacity,
                      promoter_id, state, created_at, updated_at
            "#,
        )
        .bind(new_festival.name)
        .bind(new_festival.description)
        .bind(new_festival.start_date)
        .bind(new_festival.end_date)
        .bind(new_festival.location)
        .bind(new_festival.capacity)
        .bind(promoter_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        festival_id: i64,
    ) -> Result<Option<Festival>, sqlx::Error> {
        sqlx::query_as::<_, Festival>(&format!(
            "SELECT {FESTIVAL_COLUMNS} FROM festivals WHERE festival_id = $1"
        ))
        .bind(festival_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Update lifecycle state. Callers go through the state machine, which
    /// validates the transition first.
    pub async fn update_state(
        conn: &mut PgConnection,
        festival_id: i64,
        state: FestivalState,
    ) -> Result<Festival, sqlx::Error> {
        sqlx::query_as::<_, Festival>(&format!(
            r#"
            UPDATE festivals
            SET state = $2, updated_at = NOW()
            WHERE festival_id = $1
            RETURNING {FESTIVAL_COLUMNS}
            "#
        ))
        .bind(festival_id)
        .bind(state)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn update_metadata(
        conn: &mut PgConnection,
        festival_id: i64,
        changes: &FestivalChanges,
    ) -> Result<Festival, sqlx::Error> {
        sqlx::query_as::<_, Festival>(&format!(
            r#"
            UPDATE festivals
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                location = COALESCE($6, location),
                capacity = COALESCE($7, capacity),
                updated_at = NOW()
            WHERE festival_id = $1
            RETURNING {FESTIVAL_COLUMNS}
            "#
        ))
        .bind(festival_id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.location.as_deref())
        .bind(changes.capacity)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn delete(conn: &mut PgConnection, festival_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM festivals WHERE festival_id = $1")
            .bind(festival_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count tickets hanging off this festival, through any of its ticket
    /// types. Deletion is refused while this is non-zero.
    pub async fn ticket_count(
        conn: &mut PgConnection,
        festival_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM tickets t
            JOIN purchase_lines pl ON pl.purchase_line_id = t.purchase_line_id
            JOIN ticket_types tt ON tt.ticket_type_id = pl.ticket_type_id
            WHERE tt.festival_id = $1
            "#,
        )
        .bind(festival_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_promoter(
        conn: &mut PgConnection,
        promoter_id: i64,
    ) -> Result<Vec<Festival>, sqlx::Error> {
        sqlx::query_as::<_, Festival>(&format!(
            "SELECT {FESTIVAL_COLUMNS} FROM festivals WHERE promoter_id = $1 ORDER BY start_date"
        ))
        .bind(promoter_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn list_by_state(
        conn: &mut PgConnection,
        state: FestivalState,
    ) -> Result<Vec<Festival>, sqlx::Error> {
        sqlx::query_as::<_, Festival>(&format!(
            "SELECT {FESTIVAL_COLUMNS} FROM festivals WHERE state = $1 ORDER BY start_date"
        ))
        .bind(state)
        .fetch_all(&mut *conn)
        .await
    }

    /// Published festivals overlapping the given (optional) date window.
    pub async fn list_published_between(
        conn: &mut PgConnection,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<Festival>, sqlx::Error> {
        sqlx::query_as::<_, Festival>(&format!(
            r#"
            SELECT {FESTIVAL_COLUMNS}
            FROM festivals
            WHERE state = 'published'
              AND ($1::date IS NULL OR end_date >= $1)
              AND ($2::date IS NULL OR start_date <= $2)
            ORDER BY start_date
            "#
        ))
        .bind(from)
        .bind(until)
        .fetch_all(&mut *conn)
        .await
    }
}
