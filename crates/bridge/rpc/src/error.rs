//! Channel error bindings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{borrow::Cow, fmt};

/// An error answered to the embedded page, tagged with the correlation id of
/// the request that caused it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelError {
    pub code: ErrorCode,
    /// Human readable reason, surfaced verbatim by the injected provider.
    pub message: Cow<'static, str>,
}

impl ChannelError {
    /// New [`ChannelError`] with the given [`ErrorCode`] and its default
    /// message.
    pub const fn new(code: ErrorCode) -> Self {
        Self { message: Cow::Borrowed(code.message()), code }
    }

    /// The user explicitly denied the request; carries the UI-supplied
    /// reason.
    pub fn user_rejected<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: ErrorCode::UserRejected, message: message.into().into() }
    }

    /// Creates a new `InvalidParams` error.
    pub fn invalid_params<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: ErrorCode::InvalidParams, message: message.into().into() }
    }

    /// Creates a new `InternalError` error with a message.
    pub fn internal_error_with<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: ErrorCode::InternalError, message: message.into().into() }
    }

    /// Creates a new error for a transaction that failed to sign or
    /// broadcast.
    pub fn transaction_rejected<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: ErrorCode::TransactionRejected, message: message.into().into() }
    }

    /// Creates a new `Disconnected` error.
    pub const fn disconnected() -> Self {
        Self::new(ErrorCode::Disconnected)
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.message(), self.message)
    }
}

/// Error codes understood by the injected provider: the EIP-1193 provider
/// errors plus the JSON-RPC codes reused by wallet shims.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The user rejected the request (EIP-1193 4001).
    UserRejected,
    /// The requested account/method has not been authorized (EIP-1193 4100).
    Unauthorized,
    /// The provider does not support the requested method (EIP-1193 4200).
    UnsupportedMethod,
    /// The provider is disconnected (EIP-1193 4900).
    Disconnected,
    /// Invalid method parameter.
    InvalidParams,
    /// Internal error.
    InternalError,
    /// Failed to sign or broadcast a transaction.
    TransactionRejected,
    /// Any other code.
    ServerError(i64),
}

impl ErrorCode {
    /// Returns the error code as `i64`.
    pub fn code(&self) -> i64 {
        match *self {
            Self::UserRejected => 4001,
            Self::Unauthorized => 4100,
            Self::UnsupportedMethod => 4200,
            Self::Disconnected => 4900,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::TransactionRejected => -32003,
            Self::ServerError(c) => c,
        }
    }

    /// Returns the default message associated with the code.
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::UserRejected => "User rejected the request",
            Self::Unauthorized => "Unauthorized",
            Self::UnsupportedMethod => "Unsupported method",
            Self::Disconnected => "Disconnected",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::TransactionRejected => "Transaction rejected",
            Self::ServerError(_) => "Server error",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'a> Deserialize<'a> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        i64::deserialize(deserializer).map(Into::into)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => Self::UserRejected,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32003 => Self::TransactionRejected,
            _ => Self::ServerError(code),
        }
    }
}
