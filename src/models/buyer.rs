use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

/// Purchasing identity, keyed by email. Buyers are created on first purchase
/// and reused afterwards; they are not platform actors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Buyer {
    pub buyer_id: i64,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Buyer {
    /// Resolve a buyer by email, creating one when unseen. An existing
    /// buyer's name/phone are refreshed when the caller supplies new values.
    ///
    /// Idempotent per email: concurrent first purchases race on the unique
    /// constraint and the loser retries as a lookup.
    pub async fn find_or_create(
        conn: &mut PgConnection,
        email: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Buyer, sqlx::Error> {
        let normalized = email.trim().to_lowercase();

        sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (email, name, phone, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                phone = COALESCE(EXCLUDED.phone, buyers.phone),
                updated_at = NOW()
            RETURNING buyer_id, email, name, phone, created_at, updated_at
            "#,
        )
        .bind(normalized)
        .bind(name.trim())
        .bind(phone.map(str::trim))
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Buyer>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>(
            r#"
            SELECT buyer_id, email, name, phone, created_at, updated_at
            FROM buyers
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&mut *conn)
        .await
    }
}
