use serde::{Deserialize, Serialize};

use super::states::FestivalState;

/// Events that drive festival lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FestivalEvent {
    /// Open the festival for sales
    Publish,
    /// Call the festival off
    Cancel,
    /// Close out a festival that ran
    Finish,
}

impl FestivalEvent {
    /// The state this event targets, independent of the current state.
    pub fn target_state(&self) -> FestivalState {
        match self {
            Self::Publish => FestivalState::Published,
            Self::Cancel => FestivalState::Cancelled,
            Self::Finish => FestivalState::Finished,
        }
    }

    /// Event that would drive a festival into `target`, if any.
    pub fn for_target(target: FestivalState) -> Option<Self> {
        match target {
            FestivalState::Published => Some(Self::Publish),
            FestivalState::Cancelled => Some(Self::Cancel),
            FestivalState::Finished => Some(Self::Finish),
            FestivalState::Draft => None,
        }
    }
}
