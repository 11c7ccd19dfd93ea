//! # Ticket Operations
//!
//! Nomination binds a ticket to a named attendee before it can be redeemed
//! (mandatory for nomination-required ticket types); cancellation voids an
//! active ticket and returns its unit to stock through the inventory ledger,
//! inside the same transaction.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::authorization;
use crate::error::{Result, WristpassError};
use crate::inventory;
use crate::models::{Attendee, Ticket, TicketContext};
use crate::notifications::{self, Notifier};

/// Attendee identity supplied at nomination time.
#[derive(Debug, Clone)]
pub struct AttendeeInfo {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
}

pub struct TicketService {
    pool: PgPool,
    notifier: Arc<dyn Notifier>,
}

impl TicketService {
    pub fn new(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Nominate a ticket to an attendee, on behalf of a festival operator.
    pub async fn nominate(
        &self,
        ticket_id: i64,
        attendee: AttendeeInfo,
        actor_id: i64,
    ) -> Result<Ticket> {
        Self::validate_attendee(&attendee)?;

        let mut tx = self.pool.begin().await?;

        let context = Ticket::load_context(&mut *tx, ticket_id)
            .await?
            .ok_or_else(|| WristpassError::TicketNotFound {
                reference: format!("id {ticket_id}"),
            })?;

        authorization::ensure_festival_access(&mut *tx, context.festival_id, actor_id).await?;

        let (ticket, attendee_row) = Self::nominate_locked(&mut tx, &context, &attendee).await?;

        tx.commit().await?;

        self.dispatch_nomination(&attendee_row, &ticket);
        Ok(ticket)
    }

    /// Public nomination keyed by redemption code; no actor involved. The
    /// email-confirmation equality check is the caller's responsibility.
    pub async fn nominate_by_code(
        &self,
        redemption_code: &str,
        attendee: AttendeeInfo,
    ) -> Result<Ticket> {
        Self::validate_attendee(&attendee)?;
        if redemption_code.trim().is_empty() {
            return Err(WristpassError::Validation(
                "redemption code is required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let context = Ticket::load_context_by_code(&mut *tx, redemption_code)
            .await?
            .ok_or_else(|| WristpassError::TicketNotFound {
                reference: "redemption code".to_string(),
            })?;

        let (ticket, attendee_row) = Self::nominate_locked(&mut tx, &context, &attendee).await?;

        tx.commit().await?;

        self.dispatch_nomination(&attendee_row, &ticket);
        Ok(ticket)
    }

    /// Cancel an active ticket, releasing its stock unit in the same
    /// transaction.
    pub async fn cancel(&self, ticket_id: i64, actor_id: i64) -> Result<Ticket> {
        let mut tx = self.pool.begin().await?;

        let context = Ticket::load_context(&mut *tx, ticket_id)
            .await?
            .ok_or_else(|| WristpassError::TicketNotFound {
                reference: format!("id {ticket_id}"),
            })?;

        authorization::ensure_festival_access(&mut *tx, context.festival_id, actor_id).await?;

        if !context.state.is_active() {
            return Err(WristpassError::TicketNotActive {
                id: context.ticket_id,
                state: context.state.to_string(),
            });
        }

        let ticket = Ticket::mark_cancelled(&mut *tx, ticket_id).await?;
        inventory::release(&mut *tx, context.ticket_type_id, 1).await?;

        tx.commit().await?;

        info!(ticket_id, ticket_type_id = context.ticket_type_id, "ticket cancelled");
        Ok(ticket)
    }

    /// Guard-protected single-ticket lookup.
    pub async fn find_ticket(&self, ticket_id: i64, actor_id: i64) -> Result<Option<Ticket>> {
        let mut conn = self.pool.acquire().await?;
        let Some(context) = Ticket::load_context(&mut *conn, ticket_id).await? else {
            return Ok(None);
        };
        authorization::ensure_festival_access(&mut *conn, context.festival_id, actor_id).await?;
        Ok(Ticket::find_by_id(&mut *conn, ticket_id).await?)
    }

    /// Public lookup for the nomination page; the code is the credential.
    pub async fn find_by_redemption_code(&self, redemption_code: &str) -> Result<Option<Ticket>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Ticket::find_by_redemption_code(&mut *conn, redemption_code).await?)
    }

    /// Guard-protected listing of a festival's tickets. No locks.
    pub async fn list_by_festival(&self, festival_id: i64, actor_id: i64) -> Result<Vec<Ticket>> {
        let mut conn = self.pool.acquire().await?;
        authorization::ensure_festival_access(&mut *conn, festival_id, actor_id).await?;
        Ok(Ticket::list_by_festival(&mut *conn, festival_id).await?)
    }

    /// Shared nomination core. The ticket must be active and un-nominated;
    /// the attendee is resolved-or-created by email inside the transaction.
    async fn nominate_locked(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        context: &TicketContext,
        attendee: &AttendeeInfo,
    ) -> Result<(Ticket, Attendee)> {
        if context.attendee_id.is_some() {
            return Err(WristpassError::TicketAlreadyNominated {
                id: context.ticket_id,
            });
        }
        if !context.state.is_active() {
            return Err(WristpassError::TicketNotActive {
                id: context.ticket_id,
                state: context.state.to_string(),
            });
        }

        let attendee_row = Attendee::find_or_create(
            &mut *tx,
            &attendee.email,
            &attendee.name,
            attendee.phone.as_deref(),
        )
        .await?;

        let ticket =
            Ticket::set_nominated(&mut *tx, context.ticket_id, attendee_row.attendee_id).await?;

        info!(
            ticket_id = ticket.ticket_id,
            attendee_id = attendee_row.attendee_id,
            "ticket nominated"
        );
        Ok((ticket, attendee_row))
    }

    fn validate_attendee(attendee: &AttendeeInfo) -> Result<()> {
        if attendee.email.trim().is_empty() || attendee.name.trim().is_empty() {
            return Err(WristpassError::Validation(
                "attendee email and name are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Fire-and-forget nomination notice; failures are logged and swallowed.
    fn dispatch_nomination(&self, attendee: &Attendee, ticket: &Ticket) {
        let notifier = Arc::clone(&self.notifier);
        let email = attendee.email.clone();
        let name = attendee.name.clone();
        let ticket = ticket.clone();
        tokio::spawn(async move {
            notifications::dispatch("nomination", async {
                notifier.send_nomination(&email, &name, &ticket).await
            })
            .await;
        });
    }
}
