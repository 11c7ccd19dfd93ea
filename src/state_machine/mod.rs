// State machine module for festival and ticket lifecycles.
//
// Festival transitions run through an exhaustive table with admin-only
// guards and append-only transition persistence; ticket states are simple
// enough to be driven directly by the owning workflows.

pub mod events;
pub mod festival_state_machine;
pub mod persistence;
pub mod states;

// Re-export main types for convenient access
pub use events::FestivalEvent;
pub use festival_state_machine::FestivalStateMachine;
pub use persistence::FestivalStateTransition;
pub use states::{FestivalState, TicketState};
