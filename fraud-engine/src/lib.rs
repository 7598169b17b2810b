//! Fraud-screening engine for PIX transfers
//!
//! One synchronous classification pass per inbound transfer: resolve both
//! parties through the account directory, then run the ordered rule chain,
//! short-circuiting on the first rule that assigns a terminal status.

#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod resolver;
pub mod rules;
pub mod service;

pub use engine::TransferScreener;
pub use error::{Error, Result};
pub use resolver::AccountResolver;
pub use rules::{RuleChain, RuleKind, RULE_CHAIN};
pub use service::{AccountView, PartyRequest, TransferRequest, TransferService, TransferView};
