//! # Ticket Inventory Ledger
//!
//! Owns the per-ticket-type stock counter. Both operations acquire an
//! exclusive row lock before reading stock and perform the read-check-write
//! while holding it; the lock is released when the caller's transaction
//! commits or rolls back, so no interleaving can observe (or commit)
//! negative stock.

use sqlx::PgConnection;
use tracing::{debug, info};

use crate::error::{Result, WristpassError};
use crate::models::TicketType;

/// Decrement stock by `quantity` for a paid sale.
///
/// Fails with `InsufficientStock` when fewer than `quantity` units remain,
/// leaving the row untouched. Must run inside the transaction that also
/// persists the sale.
pub async fn reserve(
    conn: &mut PgConnection,
    ticket_type_id: i64,
    quantity: i32,
) -> Result<TicketType> {
    ensure_positive_quantity(quantity)?;

    let ticket_type = TicketType::lock_for_update(&mut *conn, ticket_type_id)
        .await?
        .ok_or(WristpassError::TicketTypeNotFound { id: ticket_type_id })?;

    if ticket_type.stock < quantity {
        debug!(
            ticket_type_id,
            available = ticket_type.stock,
            requested = quantity,
            "reservation rejected"
        );
        return Err(WristpassError::InsufficientStock {
            available: ticket_type.stock,
            requested: quantity,
        });
    }

    let updated = TicketType::set_stock(&mut *conn, ticket_type_id, ticket_type.stock - quantity)
        .await?;
    info!(ticket_type_id, reserved = quantity, stock = updated.stock, "stock reserved");
    Ok(updated)
}

/// Return `quantity` units to stock on the cancellation path.
pub async fn release(
    conn: &mut PgConnection,
    ticket_type_id: i64,
    quantity: i32,
) -> Result<TicketType> {
    ensure_positive_quantity(quantity)?;

    let ticket_type = TicketType::lock_for_update(&mut *conn, ticket_type_id)
        .await?
        .ok_or(WristpassError::TicketTypeNotFound { id: ticket_type_id })?;

    let updated = TicketType::set_stock(&mut *conn, ticket_type_id, ticket_type.stock + quantity)
        .await?;
    info!(ticket_type_id, released = quantity, stock = updated.stock, "stock released");
    Ok(updated)
}

fn ensure_positive_quantity(quantity: i32) -> Result<()> {
    if quantity <= 0 {
        return Err(WristpassError::Validation(format!(
            "quantity must be a positive integer, got {quantity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_quantities_rejected() {
        assert!(ensure_positive_quantity(0).is_err());
        assert!(ensure_positive_quantity(-3).is_err());
        assert!(ensure_positive_quantity(1).is_ok());
    }
}
