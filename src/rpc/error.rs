use std::fmt;

use thiserror::Error;
use tonic::{Code, Status};

/// Errors returned by every call issued through an [`RpcSession`](super::RpcSession).
///
/// Each variant carries the name of the operation that failed so the rendered message always
/// says what was being attempted and why it failed.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The remote side reports that the entity being created already exists.
    #[error("{operation}: entity already exists: {message}")]
    AlreadyExists { operation: String, message: String },

    /// The connection to the endpoint could not be established or was lost.
    #[error("{operation}: transport failure: {source}")]
    Transport {
        operation: String,
        #[source]
        source: tonic::codegen::StdError,
    },

    /// The call did not complete before its deadline.
    #[error("{operation}: deadline exceeded after {timeout_ms}ms")]
    DeadlineExceeded { operation: String, timeout_ms: u128 },

    /// A server stream failed before delivering its clean end-of-stream signal.
    #[error("{operation}: stream terminated abnormally: {status}")]
    StreamTerminated { operation: String, status: Status },

    /// The call was cancelled, locally or by the remote side.
    #[error("{operation}: call cancelled")]
    Cancelled { operation: String },

    /// The endpoint address could not be turned into a valid URI.
    #[error("{operation}: invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        operation: String,
        endpoint: String,
        reason: String,
    },

    /// The call succeeded but the response breaks the service contract.
    #[error("{operation}: malformed response: {reason}")]
    MalformedResponse { operation: String, reason: String },

    /// Any status that does not map onto a known outcome.
    #[error("{operation}: {status}")]
    Unclassified { operation: String, status: Status },
}

/// Closed classification of an [`RpcError`], for callers that branch on outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Conflict,
    Transport,
    DeadlineExceeded,
    StreamTerminated,
    Cancelled,
    Unclassified,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transport => "transport",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::StreamTerminated => "stream_terminated",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

impl RpcError {
    /// Classify a status returned by a unary call or by opening a stream.
    pub fn from_status(operation: impl Into<String>, status: Status) -> Self {
        let operation = operation.into();
        match status.code() {
            Code::AlreadyExists => RpcError::AlreadyExists {
                operation,
                message: status.message().to_string(),
            },
            Code::DeadlineExceeded => RpcError::DeadlineExceeded {
                operation,
                timeout_ms: 0,
            },
            Code::Cancelled => RpcError::Cancelled { operation },
            Code::Unavailable => RpcError::Transport {
                operation,
                source: Box::new(status),
            },
            _ => RpcError::Unclassified { operation, status },
        }
    }

    /// Classify a status received while reading an already open stream.
    ///
    /// Anything other than a deadline or a cancellation ends the stream abnormally.
    pub fn from_stream_status(operation: impl Into<String>, status: Status) -> Self {
        let operation = operation.into();
        match status.code() {
            Code::DeadlineExceeded => RpcError::DeadlineExceeded {
                operation,
                timeout_ms: 0,
            },
            Code::Cancelled => RpcError::Cancelled { operation },
            _ => RpcError::StreamTerminated { operation, status },
        }
    }

    pub fn transport(
        operation: impl Into<String>,
        source: impl Into<tonic::codegen::StdError>,
    ) -> Self {
        RpcError::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn deadline_exceeded(operation: impl Into<String>, timeout: std::time::Duration) -> Self {
        RpcError::DeadlineExceeded {
            operation: operation.into(),
            timeout_ms: timeout.as_millis(),
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        RpcError::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::AlreadyExists { .. } => ErrorKind::Conflict,
            RpcError::Transport { .. } | RpcError::InvalidEndpoint { .. } => ErrorKind::Transport,
            RpcError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            RpcError::StreamTerminated { .. } => ErrorKind::StreamTerminated,
            RpcError::Cancelled { .. } => ErrorKind::Cancelled,
            RpcError::MalformedResponse { .. } | RpcError::Unclassified { .. } => {
                ErrorKind::Unclassified
            }
        }
    }

    /// Everything except an "already exists" conflict is fatal for the current call.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Conflict
    }

    /// Name of the operation that produced this error.
    pub fn operation(&self) -> &str {
        match self {
            RpcError::AlreadyExists { operation, .. }
            | RpcError::Transport { operation, .. }
            | RpcError::DeadlineExceeded { operation, .. }
            | RpcError::StreamTerminated { operation, .. }
            | RpcError::Cancelled { operation }
            | RpcError::InvalidEndpoint { operation, .. }
            | RpcError::MalformedResponse { operation, .. }
            | RpcError::Unclassified { operation, .. } => operation,
        }
    }
}
