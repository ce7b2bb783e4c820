// src/error.rs
use alloy::transports::{RpcError, TransportError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use tracing::{error, warn};

use crate::models::{ErrorDetail, ErrorResponse};

/// Failure of a single volume request. Every variant ends that request only.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// The endpoint could not be reached or the connection failed mid-call.
    #[error("RPC transport failure: {0}")]
    Transport(#[source] TransportError),
    /// The node answered the log query with a JSON-RPC error.
    #[error("RPC node rejected the log query: {0}")]
    QueryRejected(#[source] TransportError),
    /// The node's reply could not be read as a list of logs.
    #[error("RPC node returned a malformed reply: {0}")]
    MalformedResponse(#[source] TransportError),
    /// A log does not match the `MarketItemCreated` signature.
    #[error("log {log_index:?} in block {block_number:?} does not match MarketItemCreated: {source}")]
    Decode {
        block_number: Option<u64>,
        log_index: Option<u64>,
        #[source]
        source: alloy::sol_types::Error,
    },
    /// Connecting and querying took longer than the configured deadline.
    #[error("RPC request timed out after {0:?}")]
    Timeout(Duration),
}

impl VolumeError {
    /// Sort an alloy RPC error into transport, rejection and malformed reply.
    pub fn from_rpc(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(_) => Self::QueryRejected(err),
            RpcError::DeserError { .. } | RpcError::NullResp => Self::MalformedResponse(err),
            _ => Self::Transport(err),
        }
    }

    /// Machine-readable category reported in the error body.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::QueryRejected(_) => "query_rejected",
            Self::MalformedResponse(_) | Self::Decode { .. } => "decode",
            Self::Timeout(_) => "timeout",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Transport(_) | Self::QueryRejected(_) | Self::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            Self::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Only transport failures are worth another attempt.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl IntoResponse for VolumeError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Decode { .. } => error!("Volume request failed ({}): {}", self.kind(), self),
            _ => warn!("Upstream failure ({}): {}", self.kind(), self),
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
