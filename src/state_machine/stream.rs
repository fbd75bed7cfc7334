use super::StateMachine;
use crate::rpc::RpcError;

/// Lifecycle of a server stream as seen by its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Opened, nothing received yet.
    Open,
    Receiving,
    /// The server signalled a clean end-of-stream.
    Ended,
    /// The stream failed. The cause was handed to the consumer exactly once.
    Errored,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamState::Ended | StreamState::Errored)
    }
}

pub enum StreamInput<T> {
    Message(T),
    End,
    Failed(RpcError),
}

#[derive(Debug)]
pub enum StreamOutput<T> {
    Item(T),
    End,
    Error(RpcError),
}

/// Consumption protocol for a single server stream.
///
/// Items are released in the order they were received. Once a terminal input has been
/// processed, exactly one terminal output is produced and every later input is discarded.
#[derive(Debug)]
pub struct StreamMachine<T> {
    state: StreamState,
    pending: Option<StreamOutput<T>>,
    received: u64,
}

impl<T> StreamMachine<T> {
    pub fn new() -> Self {
        Self {
            state: StreamState::Open,
            pending: None,
            received: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of items received so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    fn receive(&mut self, item: T) {
        self.state = StreamState::Receiving;
        self.received += 1;
        self.pending = Some(StreamOutput::Item(item));
    }

    fn end(&mut self) {
        self.state = StreamState::Ended;
        self.pending = Some(StreamOutput::End);
    }

    fn fail(&mut self, err: RpcError) {
        self.state = StreamState::Errored;
        self.pending = Some(StreamOutput::Error(err));
    }
}

impl<T> Default for StreamMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateMachine for StreamMachine<T> {
    type Input = StreamInput<T>;
    type Output = StreamOutput<T>;

    fn process_input(&mut self, input: Self::Input) {
        if self.state.is_terminal() {
            return;
        }

        match input {
            StreamInput::Message(item) => self.receive(item),
            StreamInput::End => self.end(),
            StreamInput::Failed(err) => self.fail(err),
        }
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.pending.take()
    }
}
