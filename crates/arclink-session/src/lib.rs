//! Session state and change notifications for Arclink.
//!
//! This crate owns everything that is "about the user" rather than about a
//! particular leaderboard:
//!
//! 1. **Login state**, driven by the backend's status signal
//!    ([`SessionHub::on_status_changed`])
//! 2. **Cached arcade data**: balance, inventory, catalog, profile
//! 3. **Notifications**: typed events fanned out to subscribers
//!    ([`EventRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Leaderboard Layer (above)  ← subscribes to login changes, reads status
//!     ↕
//! Session Layer (this crate) ← login state machine, cached data, events
//!     ↕
//! Backend Layer (below)      ← live gateway or simulator
//! ```

mod error;
mod events;
mod host;
mod hub;

pub use error::SessionError;
pub use events::{EventKind, EventRegistry, HubEvent, Subscription};
pub use host::{HeadlessHost, Host};
pub use hub::{HubConfig, HubState, PurchaseOutcome, Session, SessionHub};
