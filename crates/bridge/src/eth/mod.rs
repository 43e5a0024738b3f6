//! Wallet-side request handling.

pub mod api;
pub mod chain;
pub mod classify;
pub mod consent;
pub mod error;
pub mod prepare;
pub mod sign;
