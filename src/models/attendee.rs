use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

/// A named attendee a ticket is nominated to. Resolved-or-created by email
/// during nomination, exactly like [`Buyer`](super::Buyer) during purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub attendee_id: i64,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Attendee {
    pub async fn find_or_create(
        conn: &mut PgConnection,
        email: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Attendee, sqlx::Error> {
        sqlx::query_as::<_, Attendee>(
            r#"
            INSERT INTO attendees (email, name, phone, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                phone = COALESCE(EXCLUDED.phone, attendees.phone),
                updated_at = NOW()
            RETURNING attendee_id, email, name, phone, created_at, updated_at
            "#,
        )
        .bind(email.trim().to_lowercase())
        .bind(name.trim())
        .bind(phone.map(str::trim))
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        attendee_id: i64,
    ) -> Result<Option<Attendee>, sqlx::Error> {
        sqlx::query_as::<_, Attendee>(
            r#"
            SELECT attendee_id, email, name, phone, created_at, updated_at
            FROM attendees
            WHERE attendee_id = $1
            "#,
        )
        .bind(attendee_id)
        .fetch_optional(&mut *conn)
        .await
    }
}
