//! Pure state machines driven by async runners elsewhere in the crate.

pub mod stream;

/// Calling semantics for a deterministic state machine.
///
/// Inputs are pushed in with [`process_input`](StateMachine::process_input) and outputs are
/// pulled out with [`poll_output`](StateMachine::poll_output). The implementor maps its own
/// inherent methods onto those two entry points.
///
/// # Invariants
/// Implementors must not perform IO, read the clock, spawn tasks, block, or use interior
/// mutability. Anything impure (timers, network reads, cancellation) belongs to the runner that
/// owns the machine and feeds the result in as input.
///
/// Keeping the machine pure means the protocol it encodes can be unit tested by replaying a
/// sequence of inputs, without a runtime or a live connection.
///
/// # Example
/// ```ignore
/// let mut machine = StreamMachine::new();
/// machine.process_input(StreamInput::Message(laptop));
/// assert!(matches!(machine.poll_output(), Some(StreamOutput::Item(_))));
/// ```
pub trait StateMachine {
    /// The type of input [processed](StateMachine::process_input) by the machine. Usually an
    /// enum with one variant per kind of input.
    type Input;
    /// The type of output [polled](StateMachine::poll_output) from the machine.
    type Output;

    /// Feed one `input` into the machine.
    fn process_input(&mut self, input: Self::Input);

    /// Take the next available output, if any.
    fn poll_output(&mut self) -> Option<Self::Output>;
}
