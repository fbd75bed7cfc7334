//! # rpc
//!
//! Client-side call lifecycle for gRPC services: one session per endpoint, a deadline per call,
//! and a closed classification of every failure.
//!
//! ## Call shapes
//!
//! - Unary: [`RpcSession::unary`] sends one request and waits for one response.
//! - Server streaming: [`RpcSession::open_stream`] sends one request and returns an
//!   [`RpcStream`] that yields responses in arrival order until a terminal signal.
//!
//! ## Deadlines
//!
//! Deadlines are attached to calls, never to the session. A unary deadline bounds the round
//! trip; a stream deadline bounds the stream's entire lifetime. The remaining time is also
//! propagated to the server in the `grpc-timeout` header.
//!
//! ## Outcomes
//!
//! | Remote outcome                        | [`ErrorKind`]        |
//! |---------------------------------------|----------------------|
//! | `ALREADY_EXISTS`                      | `Conflict`           |
//! | unreachable endpoint, `UNAVAILABLE`   | `Transport`          |
//! | local expiry, `DEADLINE_EXCEEDED`     | `DeadlineExceeded`   |
//! | stream failure before clean end       | `StreamTerminated`   |
//! | [`CancelHandle::cancel`], `CANCELLED` | `Cancelled`          |
//! | anything else                         | `Unclassified`       |
//!
//! Only `Conflict` is non-fatal. The library never aborts the process; callers decide.
//!
//! ```ignore
//! use pcbook_rpc::rpc::{CancelHandle, RpcClientConfig, RpcSession};
//!
//! let config = RpcClientConfig::builder().endpoint("0.0.0.0:8080").build();
//! let cancel = CancelHandle::new();
//! let session = RpcSession::connect(&config).await?.with_cancel(cancel.signal());
//! ```

mod cancel;
mod deadline;
mod error;
mod path;

pub mod client;

pub use cancel::{CancelHandle, CancelSignal};
pub use deadline::Deadline;
pub use error::{ErrorKind, RpcError};
pub use path::{GrpcPath, GrpcPathParse};

pub use client::{DEFAULT_CALL_TIMEOUT, RpcClientConfig, RpcSession, RpcStream};
pub use crate::state_machine::stream::StreamState;
