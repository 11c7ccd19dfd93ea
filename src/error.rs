//! # Error Types
//!
//! Typed domain errors for every rule the core can reject, using thiserror
//! for structured error types instead of `Box<dyn Error>` patterns.
//!
//! Every variant maps to a stable machine-readable code so callers can
//! distinguish "retry" (`Contention`) from "fix your input" (`Validation`)
//! from "this is final" (state violations). All variants abort the enclosing
//! transaction before surfacing.

use thiserror::Error;

/// Domain error taxonomy for ticketing and wristband operations.
#[derive(Error, Debug)]
pub enum WristpassError {
    #[error("Festival not found with id {id}")]
    FestivalNotFound { id: i64 },

    #[error("Ticket type not found with id {id}")]
    TicketTypeNotFound { id: i64 },

    #[error("Ticket not found: {reference}")]
    TicketNotFound { reference: String },

    #[error("Wristband not found with uid {uid}")]
    WristbandNotFound { uid: String },

    #[error("Actor not found with id {id}")]
    ActorNotFound { id: i64 },

    #[error("Attendee not found with id {id}")]
    AttendeeNotFound { id: i64 },

    #[error("Illegal festival state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Festival '{name}' is not published")]
    FestivalNotPublished { name: String },

    #[error("Ticket {id} is not active (state: {state})")]
    TicketNotActive { id: i64, state: String },

    #[error("Ticket {id} is already nominated")]
    TicketAlreadyNominated { id: i64 },

    #[error("Ticket {id} requires nomination before wristband association")]
    TicketNotNominated { id: i64 },

    #[error("Wristband {uid} is already bound to another active ticket")]
    WristbandAlreadyBound { uid: String },

    #[error("Wristband {uid} is not active")]
    WristbandInactive { uid: String },

    #[error("Wristband {uid} belongs to a different festival")]
    CrossFestivalConflict { uid: String },

    #[error("Festival {id} still has tickets and cannot be deleted")]
    FestivalHasTickets { id: i64 },

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Insufficient balance: {balance} available, {requested} requested")]
    InsufficientBalance { balance: String, requested: String },

    #[error("Invalid payment: {reason}")]
    InvalidPayment { reason: String },

    #[error("Actor {actor_id} has no permission on festival {festival_id}")]
    PermissionDenied { actor_id: i64, festival_id: i64 },

    #[error("Actor {actor_id} must be an admin for this operation")]
    AdminRequired { actor_id: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transaction contention, retry the operation: {0}")]
    Contention(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),
}

impl WristpassError {
    /// Stable error code for API consumers and log correlation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FestivalNotFound { .. } => "FESTIVAL_NOT_FOUND",
            Self::TicketTypeNotFound { .. } => "TICKET_TYPE_NOT_FOUND",
            Self::TicketNotFound { .. } => "TICKET_NOT_FOUND",
            Self::WristbandNotFound { .. } => "WRISTBAND_NOT_FOUND",
            Self::ActorNotFound { .. } => "ACTOR_NOT_FOUND",
            Self::AttendeeNotFound { .. } => "ATTENDEE_NOT_FOUND",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::FestivalNotPublished { .. } => "FESTIVAL_NOT_PUBLISHED",
            Self::TicketNotActive { .. } => "TICKET_NOT_ACTIVE",
            Self::TicketAlreadyNominated { .. } => "TICKET_ALREADY_NOMINATED",
            Self::TicketNotNominated { .. } => "TICKET_NOT_NOMINATED",
            Self::WristbandAlreadyBound { .. } => "WRISTBAND_ALREADY_BOUND",
            Self::WristbandInactive { .. } => "WRISTBAND_INACTIVE",
            Self::CrossFestivalConflict { .. } => "CROSS_FESTIVAL_CONFLICT",
            Self::FestivalHasTickets { .. } => "FESTIVAL_HAS_TICKETS",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidPayment { .. } => "INVALID_PAYMENT",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::AdminRequired { .. } => "ADMIN_REQUIRED",
            Self::Validation(_) => "VALIDATION",
            Self::Contention(_) => "CONTENTION",
            Self::Database(_) => "DATABASE",
            Self::Configuration(_) => "CONFIGURATION",
            Self::PaymentGateway(_) => "PAYMENT_GATEWAY",
        }
    }

    /// Whether the caller should retry the same operation unchanged.
    ///
    /// Only lock-wait/serialization failures qualify; every domain error is
    /// final until the caller changes its input or the world changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention(_))
    }
}

/// PostgreSQL SQLSTATE codes that signal lock contention rather than a broken
/// query: lock_not_available, serialization_failure, deadlock_detected.
const CONTENTION_SQLSTATES: [&str; 3] = ["55P03", "40001", "40P01"];

impl From<sqlx::Error> for WristpassError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                if CONTENTION_SQLSTATES.contains(&code.as_ref()) {
                    return Self::Contention(db_err.to_string());
                }
            }
        }
        Self::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, WristpassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_and_distinct() {
        let errors = [
            WristpassError::FestivalNotFound { id: 1 },
            WristpassError::InsufficientStock {
                available: 0,
                requested: 1,
            },
            WristpassError::InsufficientBalance {
                balance: "10.00".into(),
                requested: "15.00".into(),
            },
            WristpassError::InvalidPayment {
                reason: "amount mismatch".into(),
            },
            WristpassError::PermissionDenied {
                actor_id: 1,
                festival_id: 2,
            },
            WristpassError::Contention("lock timeout".into()),
            WristpassError::Validation("quantity must be positive".into()),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_contention_is_retryable() {
        assert!(WristpassError::Contention("busy".into()).is_retryable());
        assert!(!WristpassError::InsufficientStock {
            available: 0,
            requested: 1
        }
        .is_retryable());
        assert!(!WristpassError::Validation("bad".into()).is_retryable());
    }

    #[test]
    fn row_not_found_maps_to_database() {
        let err = WristpassError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), "DATABASE");
        assert!(!err.is_retryable());
    }
}
