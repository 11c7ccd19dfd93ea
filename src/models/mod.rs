// Persisted entities, one file per table. Structs map rows 1:1 via FromRow;
// mutations that participate in the locking protocol live next to the reads
// so the FOR UPDATE discipline is visible in one place per entity.

pub mod actor;
pub mod attendee;
pub mod buyer;
pub mod festival;
pub mod purchase;
pub mod recharge;
pub mod spend;
pub mod ticket;
pub mod ticket_type;
pub mod wristband;

// Re-export core models for easy access
pub use actor::{Actor, ActorRole, NewActor};
pub use attendee::Attendee;
pub use buyer::Buyer;
pub use festival::{Festival, FestivalChanges, NewFestival};
pub use purchase::{NewPurchase, Purchase, PurchaseLine};
pub use recharge::Recharge;
pub use spend::Spend;
pub use ticket::{Ticket, TicketContext};
pub use ticket_type::{NewTicketType, TicketType};
pub use wristband::Wristband;
