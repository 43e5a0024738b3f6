//! Correlated response messages.

use crate::error::ChannelError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// The terminal message produced for one request, tagged with the original
/// correlation id. Exactly one of these exists per settled request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelResponse {
    pub id: u64,
    #[serde(flatten)]
    pub result: ResponseResult,
}

impl ChannelResponse {
    pub fn new(id: u64, result: impl Into<ResponseResult>) -> Self {
        Self { id, result: result.into() }
    }

    /// A successful response carrying a single serializable value.
    pub fn success<S: Serialize>(id: u64, value: S) -> Self {
        Self { id, result: ResponseResult::success(value) }
    }

    /// A successful response carrying a collection of values, e.g. the
    /// account list answered to `requestAccounts`.
    pub fn batch<S: Serialize>(id: u64, values: impl IntoIterator<Item = S>) -> Self {
        let values: Vec<serde_json::Value> = values
            .into_iter()
            .map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null))
            .collect();
        Self { id, result: ResponseResult::Success(serde_json::Value::Array(values)) }
    }

    /// An error response.
    pub fn error(id: u64, error: ChannelError) -> Self {
        Self { id, result: ResponseResult::Error(error) }
    }
}

/// Either the success value or the error of a settled request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum ResponseResult {
    #[serde(rename = "response")]
    Success(serde_json::Value),
    #[serde(rename = "error")]
    Error(ChannelError),
}

impl ResponseResult {
    pub fn success<S: Serialize>(value: S) -> Self {
        match serde_json::to_value(&value) {
            Ok(value) => Self::Success(value),
            Err(err) => {
                error!(target: "bridge::rpc", ?err, "failed to serialize response");
                Self::Error(ChannelError::internal_error_with("Failed to serialize response"))
            }
        }
    }
}

impl From<ChannelError> for ResponseResult {
    fn from(error: ChannelError) -> Self {
        Self::Error(error)
    }
}
