//! # dapp-bridge-rpc
//!
//! Encoding of correlated responses and errors sent back to an embedded
//! page's injected provider shim.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod error;
pub mod response;
pub mod script;

pub use error::{ChannelError, ErrorCode};
pub use response::{ChannelResponse, ResponseResult};
pub use script::OutboundMessage;
