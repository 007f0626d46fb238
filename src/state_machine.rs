//! Intake conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the caller owns the per-user [`ConvState`], feeds it [`Event`]s, and
//! executes the returned [`Effect`]s.

mod effect;
pub mod event;
mod replies;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, PersistOp};
pub use state::{ConvContext, ConvState, UserId};
pub use transition::transition;
