//! Data model and gateway wire format for Arclink.
//!
//! This crate defines the shapes that every other layer agrees on:
//!
//! - **Types** ([`LoginStatus`], [`ItemId`], [`CatalogEntry`], [`BoardEntry`],
//!   the response shapes): what the arcade backend hands back.
//! - **Frames** ([`GatewayRequest`], [`GatewayCall`], [`GatewayFrame`]):
//!   how a live gateway connection speaks to the backend.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames are converted
//!   to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (GatewayFrame) → Backend (typed responses)
//! ```

mod codec;
mod error;
#[cfg(feature = "json")]
mod frames;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
#[cfg(feature = "json")]
pub use frames::{GatewayCall, GatewayFrame, GatewayRequest, RequestId};
pub use types::{
    BoardEntry, CatalogEntry, CatalogResponse, CurrencyResponse, HostStatus,
    InventoryResponse, ItemId, LeaderboardQuery, LeaderboardResponse,
    LoginStatus, PurchaseReceipt, UserProfile, UserResponse,
};
