//! # Wristpass
//!
//! Festival ticketing combined with a prepaid cashless wallet carried on NFC
//! wristbands. The crate is the transactional core of the platform: the HTTP
//! surface, authentication, and document rendering live elsewhere and call
//! into the services here.
//!
//! ## What the core guards
//!
//! Two shared, money-adjacent counters sit at the center of everything:
//! per-ticket-type **stock** and per-wristband **balance**. Every mutation
//! of either runs inside one all-or-nothing transaction and takes an
//! exclusive row lock (`SELECT … FOR UPDATE`) before its first read, so
//! concurrent operations on the same row serialize while different rows
//! proceed in parallel. External I/O (payment gateway, notifications) never
//! happens while a lock is held.
//!
//! ## Module Organization
//!
//! - [`models`] - Persisted entities, one file per table
//! - [`state_machine`] - Festival/ticket lifecycles and transition audit
//! - [`authorization`] - Owner-or-admin guard run inside each transaction
//! - [`inventory`] - Stock reserve/release under row locks
//! - [`purchasing`] - Payment-verified purchase confirmation
//! - [`wristbands`] - Associate/recharge/spend ledger
//! - [`tickets`] - Nomination workflow and cancellation
//! - [`festivals`] - Festival and ticket type management
//! - [`payments`], [`notifications`], [`documents`] - Collaborator seams
//! - [`config`], [`database`], [`logging`], [`error`] - Ambient plumbing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wristpass::config::ConfigManager;
//! use wristpass::database;
//!
//! # async fn example() -> Result<(), wristpass::error::WristpassError> {
//! wristpass::logging::init_logging();
//! let manager = ConfigManager::load()?;
//! let pool = database::connect_pool(&manager.config().database).await?;
//! database::run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod config;
pub mod database;
pub mod documents;
pub mod error;
pub mod festivals;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod money;
pub mod notifications;
pub mod payments;
pub mod purchasing;
pub mod state_machine;
pub mod tickets;
pub mod wristbands;

pub use config::{ConfigManager, DatabaseConfig, PaymentConfig, WristpassConfig};
pub use error::{Result, WristpassError};
pub use festivals::FestivalService;
pub use purchasing::{PurchaseOrchestrator, PurchaseReceipt, PurchaseRequest};
pub use state_machine::{FestivalEvent, FestivalState, FestivalStateMachine, TicketState};
pub use tickets::{AttendeeInfo, TicketService};
pub use wristbands::{RechargeRequest, SpendRequest, WristbandLedger};
