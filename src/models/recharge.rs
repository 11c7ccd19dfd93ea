use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

/// Append-only audit entry backing a balance top-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recharge {
    pub recharge_id: i64,
    pub wristband_id: i64,
    pub amount: BigDecimal,
    pub payment_method: Option<String>,
    pub operator_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl Recharge {
    pub async fn create(
        conn: &mut PgConnection,
        wristband_id: i64,
        amount: &BigDecimal,
        payment_method: Option<&str>,
        operator_id: Option<i64>,
    ) -> Result<Recharge, sqlx::Error> {
        sqlx::query_as::<_, Recharge>(
            r#"
            INSERT INTO recharges (wristband_id, amount, payment_method, operator_id, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING recharge_id, wristband_id, amount, payment_method, operator_id, created_at
            "#,
        )
        .bind(wristband_id)
        .bind(amount)
        .bind(payment_method)
        .bind(operator_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_wristband(
        conn: &mut PgConnection,
        wristband_id: i64,
    ) -> Result<Vec<Recharge>, sqlx::Error> {
        sqlx::query_as::<_, Recharge>(
            r#"
            SELECT recharge_id, wristband_id, amount, payment_method, operator_id, created_at
            FROM recharges
            WHERE wristband_id = $1
            ORDER BY recharge_id
            "#,
        )
        .bind(wristband_id)
        .fetch(&mut *conn)
        .try_collect()
        .await
    }
}
