//! # Festival Service
//!
//! Festival CRUD around the state machine: creation in `Draft` by a
//! promoter, guard-protected metadata updates and deletion, ticket type
//! management, and the read-only listings. Lifecycle state itself is only
//! mutated through [`FestivalStateMachine`](crate::state_machine).

use sqlx::PgPool;
use tracing::info;

use crate::authorization;
use crate::error::{Result, WristpassError};
use crate::models::{
    Actor, ActorRole, Festival, FestivalChanges, NewFestival, NewTicketType, TicketType,
};
use crate::state_machine::FestivalState;

pub struct FestivalService {
    pool: PgPool,
}

impl FestivalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a festival in `Draft`, owned by the promoter.
    pub async fn create_festival(
        &self,
        new_festival: NewFestival,
        promoter_id: i64,
    ) -> Result<Festival> {
        Self::validate_dates(&new_festival)?;

        let mut tx = self.pool.begin().await?;

        let promoter = Actor::find_by_id(&mut *tx, promoter_id)
            .await?
            .filter(|a| a.role == ActorRole::Promoter)
            .ok_or(WristpassError::ActorNotFound { id: promoter_id })?;

        let festival = Festival::create(&mut *tx, new_festival, promoter.actor_id).await?;

        tx.commit().await?;

        info!(
            festival_id = festival.festival_id,
            promoter_id,
            name = %festival.name,
            "festival created"
        );
        Ok(festival)
    }

    /// Guard-protected metadata update; never touches lifecycle state.
    pub async fn update_festival(
        &self,
        festival_id: i64,
        changes: FestivalChanges,
        actor_id: i64,
    ) -> Result<Festival> {
        if let (Some(start), Some(end)) = (changes.start_date, changes.end_date) {
            if end < start {
                return Err(WristpassError::Validation(
                    "festival end date must not precede its start date".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        authorization::ensure_festival_access(&mut *tx, festival_id, actor_id).await?;

        let current = Festival::find_by_id(&mut *tx, festival_id)
            .await?
            .ok_or(WristpassError::FestivalNotFound { id: festival_id })?;

        // Partial updates may move only one end of the range; check the
        // combined result, not just the supplied fields.
        let start = changes.start_date.unwrap_or(current.start_date);
        let end = changes.end_date.unwrap_or(current.end_date);
        if end < start {
            return Err(WristpassError::Validation(
                "festival end date must not precede its start date".to_string(),
            ));
        }

        let festival = Festival::update_metadata(&mut *tx, festival_id, &changes).await?;
        tx.commit().await?;

        info!(festival_id, actor_id, "festival updated");
        Ok(festival)
    }

    /// Delete a festival. Refused while tickets exist anywhere under it; a
    /// sold-out festival's history is never silently dropped.
    pub async fn delete_festival(&self, festival_id: i64, actor_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        authorization::ensure_festival_access(&mut *tx, festival_id, actor_id).await?;

        if Festival::ticket_count(&mut *tx, festival_id).await? > 0 {
            return Err(WristpassError::FestivalHasTickets { id: festival_id });
        }

        if !Festival::delete(&mut *tx, festival_id).await? {
            return Err(WristpassError::FestivalNotFound { id: festival_id });
        }

        tx.commit().await?;

        info!(festival_id, actor_id, "festival deleted");
        Ok(())
    }

    /// Add a ticket type under a festival. Price and stock must be
    /// non-negative; stock is the counter later purchases decrement.
    pub async fn add_ticket_type(
        &self,
        new_ticket_type: NewTicketType,
        actor_id: i64,
    ) -> Result<TicketType> {
        if new_ticket_type.price < bigdecimal::BigDecimal::from(0) {
            return Err(WristpassError::Validation(
                "ticket type price must be non-negative".to_string(),
            ));
        }
        if new_ticket_type.stock < 0 {
            return Err(WristpassError::Validation(
                "ticket type stock must be non-negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        authorization::ensure_festival_access(&mut *tx, new_ticket_type.festival_id, actor_id)
            .await?;

        let festival_id = new_ticket_type.festival_id;
        let ticket_type = TicketType::create(&mut *tx, new_ticket_type).await?;

        tx.commit().await?;

        info!(
            ticket_type_id = ticket_type.ticket_type_id,
            festival_id, "ticket type created"
        );
        Ok(ticket_type)
    }

    pub async fn find_festival(&self, festival_id: i64) -> Result<Option<Festival>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Festival::find_by_id(&mut *conn, festival_id).await?)
    }

    pub async fn list_by_promoter(&self, promoter_id: i64) -> Result<Vec<Festival>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Festival::list_by_promoter(&mut *conn, promoter_id).await?)
    }

    pub async fn list_by_state(&self, state: FestivalState) -> Result<Vec<Festival>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Festival::list_by_state(&mut *conn, state).await?)
    }

    /// Published festivals overlapping the given window. The public landing
    /// query; takes no locks and may observe slightly stale state.
    pub async fn list_published_between(
        &self,
        from: Option<chrono::NaiveDate>,
        until: Option<chrono::NaiveDate>,
    ) -> Result<Vec<Festival>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Festival::list_published_between(&mut *conn, from, until).await?)
    }

    pub async fn list_ticket_types(&self, festival_id: i64) -> Result<Vec<TicketType>> {
        let mut conn = self.pool.acquire().await?;
        Ok(TicketType::list_by_festival(&mut *conn, festival_id).await?)
    }

    fn validate_dates(new_festival: &NewFestival) -> Result<()> {
        if new_festival.name.trim().is_empty() {
            return Err(WristpassError::Validation(
                "festival name is required".to_string(),
            ));
        }
        if new_festival.end_date < new_festival.start_date {
            return Err(WristpassError::Validation(
                "festival end date must not precede its start date".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_festival(start: (i32, u32, u32), end: (i32, u32, u32)) -> NewFestival {
        NewFestival {
            name: "Riverlights".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            location: None,
            capacity: Some(5000),
        }
    }

    #[test]
    fn end_before_start_rejected() {
        let festival = new_festival((2026, 7, 10), (2026, 7, 8));
        assert!(FestivalService::validate_dates(&festival).is_err());
    }

    #[test]
    fn single_day_festival_allowed() {
        let festival = new_festival((2026, 7, 10), (2026, 7, 10));
        assert!(FestivalService::validate_dates(&festival).is_ok());
    }

    #[test]
    fn blank_name_rejected() {
        let mut festival = new_festival((2026, 7, 10), (2026, 7, 12));
        festival.name = "  ".to_string();
        assert!(FestivalService::validate_dates(&festival).is_err());
    }
}
