use std::future::Future;
use std::time::Duration;

use prost::Message;
use tonic::client::Grpc;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Response, Status};
use tonic_prost::ProstCodec;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::rpc::cancel::CancelSignal;
use crate::rpc::client::config::RpcClientConfig;
use crate::rpc::client::stream::RpcStream;
use crate::rpc::deadline::Deadline;
use crate::rpc::error::RpcError;
use crate::rpc::path::GrpcPath;

/// A client session bound to one remote endpoint.
///
/// The session handles:
/// - Dialing the endpoint once and reusing the connection for every call
/// - Attaching a fresh deadline to each call
/// - Encoding/decoding protobuf messages
/// - Classifying failures into [`RpcError`] variants
///
/// Cloning a session yields another handle to the same connection, so a session can be used
/// from many tasks at once. Calls do not share any state besides the connection.
///
/// # Example
///
/// ```ignore
/// let config = RpcClientConfig::builder().endpoint("0.0.0.0:8080").build();
/// let session = RpcSession::connect(&config).await?;
///
/// let path = GrpcPath::parse("pcbook.LaptopService/CreateLaptop")?;
/// let response: CreateLaptopResponse = session
///     .unary(&path, request, config.create_timeout)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RpcSession {
    channel: Channel,
    endpoint: String,
    span: Span,
    cancel: Option<CancelSignal>,
}

impl RpcSession {
    /// Dial the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The endpoint is not a valid URI
    /// * The connection could not be established within `connect_timeout` (eager mode only)
    pub async fn connect(config: &RpcClientConfig) -> Result<Self, RpcError> {
        let uri = config.endpoint_uri();

        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| RpcError::InvalidEndpoint {
                operation: "connect".to_string(),
                endpoint: config.endpoint.clone(),
                reason: e.to_string(),
            })?
            .connect_timeout(config.connect_timeout);

        info!(endpoint = %uri, lazy = config.lazy, "Dialing RPC endpoint");

        let channel = if config.lazy {
            endpoint.connect_lazy()
        } else {
            endpoint
                .connect()
                .await
                .map_err(|e| RpcError::transport("connect", e))?
        };

        Ok(Self::from_channel(channel, uri))
    }

    /// Wrap an already established channel.
    pub fn from_channel(channel: Channel, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let span = info_span!("rpc_session", endpoint = %endpoint);
        Self {
            channel,
            endpoint,
            span,
            cancel: None,
        }
    }

    /// Report every call made through this session under `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Abort in-flight and future calls once `signal` fires.
    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue a unary call, waiting at most `timeout` for the response.
    ///
    /// A zero `timeout` fails with [`RpcError::DeadlineExceeded`] without sending anything.
    pub async fn unary<Req, Resp>(
        &self,
        path: &GrpcPath,
        request: Req,
        timeout: Duration,
    ) -> Result<Resp, RpcError>
    where
        Req: Message + 'static,
        Resp: Message + Default + 'static,
    {
        let operation = path.to_string();
        let deadline = Deadline::after(timeout);
        self.precheck(&operation, &deadline)?;

        let call = async {
            let mut grpc = self.ready(&operation).await?;
            let codec = ProstCodec::<Req, Resp>::default();

            debug!(path = %path, timeout_ms = %timeout.as_millis(), "Sending unary request");

            grpc.unary(with_deadline(request, &deadline), path.path_and_query(), codec)
                .await
                .map(Response::into_inner)
                .map_err(|status| classify(&operation, status, &deadline))
        };

        let result = self
            .guard(&operation, &deadline, call)
            .instrument(self.span.clone())
            .await;

        if let Err(e) = &result {
            self.span.in_scope(|| {
                debug!(path = %path, kind = %e.kind(), error = %e, "Unary call failed");
            });
        }

        result
    }

    /// Open a server stream. `timeout` covers the whole lifetime of the stream, not each message.
    ///
    /// A zero `timeout` fails with [`RpcError::DeadlineExceeded`] without sending anything.
    pub async fn open_stream<Req, Resp>(
        &self,
        path: &GrpcPath,
        request: Req,
        timeout: Duration,
    ) -> Result<RpcStream<Resp>, RpcError>
    where
        Req: Message + 'static,
        Resp: Message + Default + 'static,
    {
        let operation = path.to_string();
        let deadline = Deadline::after(timeout);
        self.precheck(&operation, &deadline)?;

        let call = async {
            let mut grpc = self.ready(&operation).await?;
            let codec = ProstCodec::<Req, Resp>::default();

            debug!(path = %path, timeout_ms = %timeout.as_millis(), "Opening server stream");

            grpc.server_streaming(with_deadline(request, &deadline), path.path_and_query(), codec)
                .await
                .map(Response::into_inner)
                .map_err(|status| classify(&operation, status, &deadline))
        };

        let inbound = self
            .guard(&operation, &deadline, call)
            .instrument(self.span.clone())
            .await?;

        Ok(RpcStream::new(
            operation,
            inbound,
            deadline,
            self.cancel.clone(),
            self.span.clone(),
        ))
    }

    /// Refuse to send anything once the deadline or the cancellation signal has already fired.
    fn precheck(&self, operation: &str, deadline: &Deadline) -> Result<(), RpcError> {
        if self.cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
            return Err(RpcError::cancelled(operation));
        }
        if deadline.is_expired() {
            return Err(RpcError::deadline_exceeded(operation, deadline.timeout()));
        }
        Ok(())
    }

    async fn ready(&self, operation: &str) -> Result<Grpc<Channel>, RpcError> {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready().await.map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "Endpoint not ready");
            RpcError::transport(operation, e)
        })?;
        Ok(grpc)
    }

    /// Race `call` against the deadline and the cancellation signal.
    async fn guard<T, F>(
        &self,
        operation: &str,
        deadline: &Deadline,
        call: F,
    ) -> Result<T, RpcError>
    where
        F: Future<Output = Result<T, RpcError>>,
    {
        let cancelled = wait_cancelled(self.cancel.clone());

        tokio::select! {
            result = call => result,
            _ = tokio::time::sleep_until(deadline.instant()) => {
                Err(RpcError::deadline_exceeded(operation, deadline.timeout()))
            }
            _ = cancelled => Err(RpcError::cancelled(operation)),
        }
    }
}

/// Resolves when `signal` fires, never when there is no signal.
pub(crate) async fn wait_cancelled(signal: Option<CancelSignal>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Propagate the remaining time to the server as a `grpc-timeout` header.
fn with_deadline<T>(message: T, deadline: &Deadline) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(deadline.remaining());
    request
}

/// The server enforces the propagated timeout too and reports its expiry as `CANCELLED`.
pub(crate) fn classify(operation: &str, status: Status, deadline: &Deadline) -> RpcError {
    match status.code() {
        Code::DeadlineExceeded => RpcError::deadline_exceeded(operation, deadline.timeout()),
        Code::Cancelled if deadline.is_expired() => {
            RpcError::deadline_exceeded(operation, deadline.timeout())
        }
        _ => RpcError::from_status(operation, status),
    }
}

pub(crate) fn classify_stream(operation: &str, status: Status, deadline: &Deadline) -> RpcError {
    match status.code() {
        Code::Cancelled if deadline.is_expired() => {
            RpcError::deadline_exceeded(operation, deadline.timeout())
        }
        Code::DeadlineExceeded => RpcError::deadline_exceeded(operation, deadline.timeout()),
        _ => RpcError::from_stream_status(operation, status),
    }
}
