//! # dapp-bridge-core
//!
//! Core types for the dapp IPC provider bridge: the tagged event union
//! received from an embedded page, partial transaction descriptions, and
//! token approval metadata.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

/// Inbound event model
pub mod event;

/// One-shot signing credentials
pub mod passphrase;

/// Token metadata and decoded approvals
pub mod token;

/// Partial transaction descriptions
pub mod transaction;

pub use event::{DappEvent, EventDecodeError, EventKind, RawEvent};
pub use passphrase::Passphrase;
pub use token::{TokenApproval, TokenData};
pub use transaction::{PreparedFees, PreparedTransaction, TransactionConfig};
