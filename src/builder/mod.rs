//! Builder API for ergonomic definition and state machine construction.
//!
//! [`WorkflowBuilder`] assembles and validates a definition in code, and
//! [`StateMachineBuilder`] wires a definition to its registry and metrics.

pub mod error;
pub mod machine;
pub mod workflow;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use workflow::WorkflowBuilder;
