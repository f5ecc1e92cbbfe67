//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::WorkflowDefinition;
use crate::engine::StateMachine;
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::registry::Registry;
use std::sync::Arc;

/// Builder for a [`StateMachine`] with optional collaborators.
///
/// # Example
///
/// ```
/// use machina::builder::{StateMachineBuilder, WorkflowBuilder};
/// use machina::core::{State, Transition};
/// use machina::metrics::PrometheusMetrics;
/// use machina::registry::Registry;
/// use std::sync::Arc;
///
/// let definition = WorkflowBuilder::new()
///     .state(State::new("start").transition(Transition::new("go", "end")))
///     .state(State::new("end"))
///     .build()
///     .unwrap();
///
/// let prometheus = prometheus::Registry::new();
/// let machine = StateMachineBuilder::new(definition)
///     .registry(Registry::new())
///     .metrics(Arc::new(PrometheusMetrics::new(&prometheus).unwrap()))
///     .build()
///     .unwrap();
///
/// assert!(machine.definition().state("start").is_some());
/// ```
pub struct StateMachineBuilder {
    definition: WorkflowDefinition,
    registry: Option<Registry>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl StateMachineBuilder {
    /// Create a new builder for `definition`.
    pub fn new(definition: WorkflowDefinition) -> Self {
        Self {
            definition,
            registry: None,
            metrics: None,
        }
    }

    /// Use `registry` for callback lookups. Defaults to an empty registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Report transitions to `metrics`. Defaults to [`NoopMetrics`].
    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the definition and build the machine.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        self.definition.validate()?;

        Ok(StateMachine::from_parts(
            self.definition,
            self.registry.unwrap_or_default(),
            self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics)),
        ))
    }
}
