//! Maps alloy errors onto [`ChainError`], deciding which ones are worth a retry.

use crate::error::ChainError;
use alloy::contract::Error as ContractError;
use alloy::transports::http::reqwest;
use alloy::transports::{RpcError, TransportErrorKind};
use std::error::Error as StdError;

/// Message fragments of custom transport errors that a retry can clear.
const TRANSIENT_MARKERS: &[&str] = &[
    "connection",
    "timed out",
    "timeout",
    "rate limit",
    "too many requests",
    "temporarily unavailable",
    "broken pipe",
];

fn is_retryable_custom(err: &(dyn StdError + Send + Sync + 'static)) -> bool {
    if let Some(http) = err.downcast_ref::<reqwest::Error>() {
        return http.is_connect() || http.is_timeout() || http.is_request();
    }
    let lowered = err.to_string().to_ascii_lowercase();
    TRANSIENT_MARKERS.iter().any(|marker| lowered.contains(marker))
}

pub(crate) fn is_retryable_rpc_error(err: &RpcError<TransportErrorKind>) -> bool {
    match err {
        RpcError::Transport(kind) => match kind {
            TransportErrorKind::MissingBatchResponse(_) => true,
            TransportErrorKind::BackendGone => true,
            TransportErrorKind::HttpError(http) => {
                http.is_rate_limit_err() || http.is_temporarily_unavailable()
            }
            // The HTTP client reports refused connections and timeouts here.
            TransportErrorKind::Custom(inner) => is_retryable_custom(inner.as_ref()),
            _ => false,
        },
        RpcError::ErrorResp(payload) => payload.is_retry_err(),
        RpcError::NullResp => true,
        RpcError::DeserError { text, .. } => {
            let lowered = text.to_ascii_lowercase();
            lowered.contains("rate limit") || lowered.contains("too many requests")
        }
        _ => false,
    }
}

pub(crate) fn from_rpc_error(err: RpcError<TransportErrorKind>) -> ChainError {
    ChainError::Rpc {
        transient: is_retryable_rpc_error(&err),
        message: err.to_string(),
    }
}

pub(crate) fn from_contract_error(err: ContractError) -> ChainError {
    if err.as_revert_data().is_some() {
        return ChainError::Reverted(err.to_string());
    }
    match err {
        ContractError::TransportError(inner) => from_rpc_error(inner),
        other @ ContractError::ZeroData(..) => ChainError::Decode(other.to_string()),
        other => ChainError::Rpc {
            message: other.to_string(),
            transient: false,
        },
    }
}
