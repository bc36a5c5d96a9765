//! # Domain Models
//!
//! Canonical value types shared by the conversion engine, the allocation
//! model, the price poller and the wallet session.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PriceQuote`] | Current price and previous close for one asset |
//! | [`Symbol`] | Validated market-data ticker |
//! | [`WalletAddress`] | Base58 wallet public key |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Constructors validate their invariants and return [`ValidationError`](crate::ValidationError)
//! instead of building an inconsistent value.

mod address;
mod quote;
mod symbol;
mod timestamp;

pub use address::{format_address, WalletAddress};
pub use quote::{PriceDirection, PriceQuote};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
