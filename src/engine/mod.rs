//! Transition execution.
//!
//! This module is the runtime half of the crate: given a validated
//! definition and a callback registry it resolves which transition applies
//! and drives the execution pipeline.
//!
//! # Pipeline
//!
//! `Resolving → GuardChecking → ActionExecuting → OverrideChecking →
//! ExitCallbacks → EntryCallbacks → Done`. Any step may fail, which aborts
//! the remaining steps and yields no outcome.

mod error;
mod machine;
mod outcome;
mod resolver;

pub use error::{Phase, ResolveError, TransitionError};
pub use machine::StateMachine;
pub use outcome::TransitionOutcome;
