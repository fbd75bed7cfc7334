use futures::Stream;
use tonic::Streaming;
use tracing::{Instrument, Span, debug};

use crate::rpc::cancel::CancelSignal;
use crate::rpc::client::session::{classify_stream, wait_cancelled};
use crate::rpc::deadline::Deadline;
use crate::rpc::error::RpcError;
use crate::state_machine::StateMachine;
use crate::state_machine::stream::{StreamInput, StreamMachine, StreamOutput, StreamState};

/// The receiving end of a server-streaming call.
///
/// Values are handed out one at a time in arrival order, with nothing buffered ahead of the
/// consumer. The stream ends with exactly one terminal signal: `Ok(None)` for a clean
/// end-of-stream, or an `Err` carrying the cause. Every call to [`next`](Self::next) after that
/// returns `Ok(None)` without touching the network.
///
/// A single deadline, set when the stream was opened, bounds the whole stream.
pub struct RpcStream<T> {
    operation: String,
    inbound: Streaming<T>,
    machine: StreamMachine<T>,
    deadline: Deadline,
    cancel: Option<CancelSignal>,
    span: Span,
}

impl<T> RpcStream<T> {
    pub(crate) fn new(
        operation: String,
        inbound: Streaming<T>,
        deadline: Deadline,
        cancel: Option<CancelSignal>,
        span: Span,
    ) -> Self {
        Self {
            operation,
            inbound,
            machine: StreamMachine::new(),
            deadline,
            cancel,
            span,
        }
    }

    /// Wait for the next value.
    pub async fn next(&mut self) -> Result<Option<T>, RpcError> {
        if self.machine.state().is_terminal() {
            return Ok(None);
        }

        let span = self.span.clone();
        let input = self.receive().instrument(span).await;
        self.machine.process_input(input);

        match self.machine.poll_output() {
            Some(StreamOutput::Item(item)) => Ok(Some(item)),
            Some(StreamOutput::Error(err)) => {
                self.span.in_scope(|| {
                    debug!(
                        operation = %self.operation,
                        received = self.machine.received(),
                        kind = %err.kind(),
                        "Stream failed"
                    );
                });
                Err(err)
            }
            Some(StreamOutput::End) | None => {
                self.span.in_scope(|| {
                    debug!(
                        operation = %self.operation,
                        received = self.machine.received(),
                        "Stream ended"
                    );
                });
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> StreamState {
        self.machine.state()
    }

    /// Number of values received so far.
    pub fn received(&self) -> u64 {
        self.machine.received()
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Convert into a [`Stream`] that ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<T, RpcError>> {
        let mut inner = self;
        async_stream::try_stream! {
            while let Some(item) = inner.next().await? {
                yield item;
            }
        }
    }

    async fn receive(&mut self) -> StreamInput<T> {
        let deadline = self.deadline;
        let cancelled = wait_cancelled(self.cancel.clone());
        let operation = &self.operation;

        tokio::select! {
            message = self.inbound.message() => match message {
                Ok(Some(item)) => StreamInput::Message(item),
                Ok(None) => StreamInput::End,
                Err(status) => StreamInput::Failed(classify_stream(operation, status, &deadline)),
            },
            _ = tokio::time::sleep_until(deadline.instant()) => StreamInput::Failed(
                RpcError::deadline_exceeded(operation.as_str(), deadline.timeout()),
            ),
            _ = cancelled => StreamInput::Failed(RpcError::cancelled(operation.as_str())),
        }
    }
}

impl<T> std::fmt::Debug for RpcStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcStream")
            .field("operation", &self.operation)
            .field("state", &self.machine.state())
            .field("received", &self.machine.received())
            .field("deadline", &self.deadline)
            .finish()
    }
}
