//! Per-invocation state machine.
//!
//! ```text
//! Received -> Bound -> Running -> Completed
//!    |                    |------> TimedOut
//!    |                    '------> Faulted
//!    '--------------------------> Faulted   (binding failed)
//! ```
//!
//! Terminal states map one-to-one onto the invocation outcome.

use std::fmt;

use crate::error::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Received,
    Bound,
    Running,
    Completed,
    TimedOut,
    Faulted,
}

impl InvocationState {
    /// States reachable in one step from `self`.
    pub fn valid_transitions(self) -> &'static [InvocationState] {
        use InvocationState::*;
        match self {
            Received => &[Bound, Faulted],
            Bound => &[Running, Faulted],
            Running => &[Completed, TimedOut, Faulted],
            Completed | TimedOut | Faulted => &[],
        }
    }

    pub fn can_transition(self, to: InvocationState) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Terminal state for a finished invocation.
    pub fn terminal_for(outcome: &Result<(), DispatchError>) -> InvocationState {
        match outcome {
            Ok(()) => InvocationState::Completed,
            Err(DispatchError::Timeout { .. }) => InvocationState::TimedOut,
            Err(DispatchError::Binding(_) | DispatchError::HandlerFault(_)) => {
                InvocationState::Faulted
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvocationState::Received => "received",
            InvocationState::Bound => "bound",
            InvocationState::Running => "running",
            InvocationState::Completed => "completed",
            InvocationState::TimedOut => "timed_out",
            InvocationState::Faulted => "faulted",
        }
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
