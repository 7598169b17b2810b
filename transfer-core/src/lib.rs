//! Transfer Core
//!
//! Data model and storage interfaces for the PIX transfer screening rail.
//!
//! # Design
//!
//! - **Exact arithmetic**: `Decimal` for money, never floats
//! - **Key addressing**: accounts are addressed by PIX key, not account number
//! - **Append-only blacklist**: entries are inserted, never removed
//! - **Write-once classification**: a transfer's status transitions exactly
//!   once per screening pass

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use store::{
    Blacklist, InMemoryBlacklist, InMemoryDirectory, InMemoryTransferStore, TransferStore,
    UserDirectory, RECENT_WINDOW,
};
pub use types::{Account, BlacklistEntry, FraudReason, PixKeyType, Transfer, TransferStatus};
