//! # Notification Collaborator
//!
//! Purchase and nomination notifications are strictly best-effort: they are
//! dispatched after the owning transaction has committed, and a failure is
//! logged and swallowed, never propagated to the caller.

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::Result;
use crate::models::Ticket;

/// Outbound notification sink (email, push, whatever the deployment wires).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_purchase_confirmation(
        &self,
        buyer_email: &str,
        buyer_name: &str,
        festival_name: &str,
        tickets: &[Ticket],
    ) -> Result<()>;

    async fn send_nomination(
        &self,
        attendee_email: &str,
        attendee_name: &str,
        ticket: &Ticket,
    ) -> Result<()>;
}

/// Dispatch helper that enforces the fire-and-forget contract: log the
/// outcome, swallow the error.
pub async fn dispatch<F>(context: &str, send: F)
where
    F: std::future::Future<Output = Result<()>>,
{
    match send.await {
        Ok(()) => info!(context, "notification dispatched"),
        Err(e) => error!(context, error = %e, "notification failed, continuing"),
    }
}

/// Default sink that only writes to the log. Useful for development and as a
/// stand-in until a real transport is wired.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_purchase_confirmation(
        &self,
        buyer_email: &str,
        _buyer_name: &str,
        festival_name: &str,
        tickets: &[Ticket],
    ) -> Result<()> {
        info!(
            buyer_email,
            festival_name,
            ticket_count = tickets.len(),
            "purchase confirmation (logging notifier)"
        );
        Ok(())
    }

    async fn send_nomination(
        &self,
        attendee_email: &str,
        _attendee_name: &str,
        ticket: &Ticket,
    ) -> Result<()> {
        info!(
            attendee_email,
            ticket_id = ticket.ticket_id,
            "nomination notice (logging notifier)"
        );
        Ok(())
    }
}
