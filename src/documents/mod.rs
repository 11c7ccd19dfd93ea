//! Printable ticket projection.
//!
//! Pure function of its input; rendering to PDF or image happens in an
//! external collaborator that consumes this value.

use serde::{Deserialize, Serialize};

use crate::models::{Attendee, Ticket};

/// Everything a renderer needs to produce a printable ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDocument {
    pub redemption_code: String,
    /// Payload to encode as the QR image; identical to the redemption code.
    pub qr_payload: String,
    pub festival_name: String,
    pub ticket_type_name: String,
    /// Attendee name, or a bearer label when the ticket is not nominated.
    pub holder_label: String,
}

const BEARER_LABEL: &str = "Bearer";

pub fn render_ticket(
    ticket: &Ticket,
    attendee: Option<&Attendee>,
    festival_name: &str,
    ticket_type_name: &str,
) -> TicketDocument {
    TicketDocument {
        redemption_code: ticket.redemption_code.clone(),
        qr_payload: ticket.redemption_code.clone(),
        festival_name: festival_name.to_string(),
        ticket_type_name: ticket_type_name.to_string(),
        holder_label: attendee
            .map(|a| a.name.clone())
            .unwrap_or_else(|| BEARER_LABEL.to_string()),
    }
}
