use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

/// Append-only audit entry backing a balance debit at a point of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Spend {
    pub spend_id: i64,
    pub wristband_id: i64,
    pub amount: BigDecimal,
    pub description: String,
    pub festival_id: i64,
    pub point_of_sale_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl Spend {
    pub async fn create(
        conn: &mut PgConnection,
        wristband_id: i64,
        amount: &BigDecimal,
        description: &str,
        festival_id: i64,
        point_of_sale_id: Option<i64>,
    ) -> Result<Spend, sqlx::Error> {
        sqlx::query_as::<_, Spend>(
            r#"
            INSERT INTO spends
                (wristband_id, amount, description, festival_id, point_of_sale_id, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING spend_id, wristband_id, amount, description, festival_id, point_of_sale_id,
                      created_at
            "#,
        )
        .bind(wristband_id)
        .bind(amount)
        .bind(description)
        .bind(festival_id)
        .bind(point_of_sale_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_wristband(
        conn: &mut PgConnection,
        wristband_id: i64,
    ) -> Result<Vec<Spend>, sqlx::Error> {
        sqlx::query_as::<_, Spend>(
            r#"
            SELECT spend_id, wristband_id, amount, description, festival_id, point_of_sale_id,
                   created_at
            FROM spends
            WHERE wristband_id = $1
            ORDER BY spend_id
            "#,
        )
        .bind(wristband_id)
        .fetch(&mut *conn)
        .try_collect()
        .await
    }
}
