//! The arcade backend capability for Arclink.
//!
//! Everything above this crate talks to the arcade through one interface,
//! [`Backend`], which has two implementations:
//!
//! - [`LiveGateway`]: forwards each operation over a [`Connection`] to the
//!   real arcade backend and relays its login-status pushes.
//! - [`Simulator`]: fabricates plausible responses after an artificial
//!   delay, for offline development and tests.
//!
//! Business logic never asks which one it holds; the response shapes and
//! failure signals are identical.
//!
//! [`Connection`]: arclink_transport::Connection

mod backend;
mod error;
mod live;
mod simulator;

pub use backend::{Backend, BackendKind, StatusSink};
pub use error::{BackendError, INSUFFICIENT_FUNDS};
pub use live::LiveGateway;
pub use simulator::{
    AROUND_PLAYER_RANK_OFFSET, Simulator, SimulatorConfig, WORLD_RANK_OFFSET,
};
