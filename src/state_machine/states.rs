use serde::{Deserialize, Serialize};
use std::fmt;

/// Festival lifecycle states.
///
/// Selling tickets and operating wristbands both require `Published`;
/// `Cancelled` and `Finished` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "festival_state", rename_all = "snake_case")]
pub enum FestivalState {
    /// Initial state when a promoter creates the festival
    Draft,
    /// Open for ticket sales and wristband activity
    Published,
    /// Called off; no further activity
    Cancelled,
    /// Ran to completion; no further activity
    Finished,
}

impl FestivalState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Finished)
    }

    /// Check whether sales and wristband operations are allowed
    pub fn allows_operations(&self) -> bool {
        matches!(self, Self::Published)
    }
}

impl fmt::Display for FestivalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for FestivalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "cancelled" => Ok(Self::Cancelled),
            "finished" => Ok(Self::Finished),
            _ => Err(format!("Invalid festival state: {s}")),
        }
    }
}

impl Default for FestivalState {
    fn default() -> Self {
        Self::Draft
    }
}

/// Individual ticket states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ticket_state", rename_all = "snake_case")]
pub enum TicketState {
    /// Sold, not yet redeemed; the only state that admits nomination,
    /// cancellation, or wristband association
    Active,
    /// Redeemed through wristband association
    Used,
    /// Voided; its stock unit has been released
    Cancelled,
}

impl TicketState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Used => write!(f, "used"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TicketState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "used" => Ok(Self::Used),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid ticket state: {s}")),
        }
    }
}

impl Default for TicketState {
    fn default() -> Self {
        Self::Active
    }
}
