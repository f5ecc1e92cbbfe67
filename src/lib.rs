//! Machina: a declarative, embeddable finite-state-machine engine
//!
//! A workflow's shape (states, transitions, guard names, action names) is
//! static data, usually loaded from a YAML or JSON document. Behavior is
//! supplied by the host application as named async callbacks in a
//! [`Registry`]. The engine resolves which transition applies to a state and
//! event, runs guards and callbacks in a fixed order, merges their outputs
//! into a data bag and reports the resulting state.
//!
//! # Core Concepts
//!
//! - **Definition**: states, transitions and callback names (`core`)
//! - **Registry**: name to guard/action implementation lookup (`registry`)
//! - **State machine**: transition resolution and execution (`engine`)
//! - **Side quests**: diversions that return via a stack of state names (`side_quest`)
//!
//! # Example
//!
//! ```rust
//! use machina::{DataBag, ExecutionContext, Registry, StateMachine};
//! use machina::core::{State, Transition, WorkflowDefinition};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let definition = WorkflowDefinition::new()
//!     .with_state(State::new("start").transition(Transition::new("go", "end").action("stamp")))
//!     .with_state(State::new("end"));
//!
//! let registry = Registry::new();
//! registry
//!     .register_action("stamp", |_ctx, _data| async move {
//!         let mut update = DataBag::new();
//!         update.insert("stamped".into(), true.into());
//!         Ok(Some(update))
//!     })
//!     .unwrap();
//!
//! let machine = StateMachine::new(definition, registry).unwrap();
//! let outcome = machine
//!     .trigger(&ExecutionContext::new(), "start", "go", &DataBag::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(outcome.new_state(), "end");
//! assert_eq!(outcome.data()["stamped"], true);
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod core;
pub mod engine;
pub mod metrics;
pub mod registry;
pub mod side_quest;

// Re-export commonly used types
pub use crate::context::{ExecutionContext, Interrupted};
pub use crate::core::{DataBag, State, Transition, WorkflowDefinition};
pub use crate::engine::{StateMachine, TransitionError, TransitionOutcome};
pub use crate::registry::{CallbackError, Registry};
