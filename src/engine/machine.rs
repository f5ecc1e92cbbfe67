//! State machine that executes transitions against a workflow definition.

use super::error::{Phase, TransitionError};
use super::outcome::TransitionOutcome;
use super::resolver;
use crate::context::ExecutionContext;
use crate::core::{DataBag, State, Transition, WorkflowDefinition};
use crate::metrics::MetricsSink;
use crate::registry::Registry;
use crate::side_quest::NEXT_STATE_OVERRIDE;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::field::{self, Empty};
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

struct Inner {
    definition: WorkflowDefinition,
    registry: Registry,
    metrics: Arc<dyn MetricsSink>,
}

/// Executes transitions of one validated [`WorkflowDefinition`].
///
/// The machine holds no per-invocation state: the current state and data bag
/// are passed in on every [`trigger`](Self::trigger) call and returned in the
/// [`TransitionOutcome`]. Clones share the same definition and registry, and
/// any number of triggers may run concurrently.
#[derive(Clone)]
pub struct StateMachine {
    inner: Arc<Inner>,
}

impl StateMachine {
    /// Validate `definition` and build a machine with no metrics.
    ///
    /// Installs the built-in return action into `registry`.
    pub fn new(
        definition: WorkflowDefinition,
        registry: Registry,
    ) -> Result<Self, crate::builder::BuildError> {
        crate::builder::StateMachineBuilder::new(definition)
            .registry(registry)
            .build()
    }

    /// Assemble a machine from already validated parts.
    pub(crate) fn from_parts(
        definition: WorkflowDefinition,
        registry: Registry,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        registry.install_builtins();
        Self {
            inner: Arc::new(Inner {
                definition,
                registry,
                metrics,
            }),
        }
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.inner.definition
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// The configured initial state. An empty name counts as unset.
    pub fn initial_state(&self) -> Option<&str> {
        self.inner
            .definition
            .initial_state
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Process `event` in `current_state`.
    ///
    /// Runs, in order: transition resolution, the transition's guards, its
    /// actions, the target override check, the source state's exit callbacks
    /// and the target state's entry callbacks. Every callback sees the
    /// caller's original `data`; action results are merged into a working
    /// copy that becomes the outcome's data bag. Any failure aborts the
    /// remaining steps.
    pub async fn trigger(
        &self,
        ctx: &ExecutionContext,
        current_state: &str,
        event: &str,
        data: &DataBag,
    ) -> Result<TransitionOutcome, TransitionError> {
        let started = Instant::now();
        let span = info_span!(
            "fsm.transition",
            transition_id = %Uuid::new_v4(),
            fsm.current_state = current_state,
            fsm.event = event,
            fsm.target_state = Empty,
            fsm.conditions = Empty,
            fsm.actions = Empty,
            fsm.dynamic_target = Empty,
            fsm.new_state = Empty,
            fsm.duration_seconds = Empty,
            error = Empty,
        );

        let result = self
            .execute(ctx, current_state, event, data)
            .instrument(span.clone())
            .await;
        let duration = started.elapsed();
        let metrics = &self.inner.metrics;

        match &result {
            Ok(outcome) => {
                metrics.record_transition(current_state, outcome.new_state(), event, duration);
                if outcome.auto_event().is_some() {
                    metrics.record_auto_transition(current_state, outcome.new_state(), event);
                }
                span.record("fsm.new_state", outcome.new_state());
                span.record("fsm.duration_seconds", duration.as_secs_f64());
                info!(
                    parent: &span,
                    from = current_state,
                    to = outcome.new_state(),
                    event,
                    duration_seconds = duration.as_secs_f64(),
                    "Transition completed"
                );
            }
            Err(err) => {
                metrics.record_error(current_state, event, err.category());
                span.record("error", field::display(err));
                debug!(parent: &span, error = %err, category = err.category(), "Transition failed");
            }
        }

        result
    }

    /// Resolve the transition for `event` in `state` without executing it and
    /// return its auto-chained event.
    ///
    /// Competing transitions are disambiguated against an empty data bag and
    /// a background context.
    pub async fn auto_event_for(
        &self,
        state: &str,
        event: &str,
    ) -> Result<Option<String>, TransitionError> {
        let state_def = self.state(state)?;
        let payload = Arc::new(DataBag::new());
        let transition = self
            .resolve(state_def, event, &ExecutionContext::background(), &payload)
            .await?;
        Ok(transition.chained_event().map(str::to_string))
    }

    async fn execute(
        &self,
        ctx: &ExecutionContext,
        current_state: &str,
        event: &str,
        data: &DataBag,
    ) -> Result<TransitionOutcome, TransitionError> {
        let state = self.state(current_state)?;
        info!(state = current_state, event, "Processing event");

        let payload = Arc::new(data.clone());
        let transition = self.resolve(state, event, ctx, &payload).await?;

        let span = Span::current();
        span.record("fsm.target_state", transition.target.as_str());
        span.record("fsm.conditions", field::debug(&transition.conditions));
        span.record("fsm.actions", field::debug(&transition.actions));
        info!(
            event,
            target = %transition.target,
            conditions = ?transition.conditions,
            actions = ?transition.actions,
            "Found transition"
        );

        let mut persisted = data.clone();

        self.check_guards(ctx, transition, &payload).await?;
        self.run_callbacks(
            ctx,
            Phase::TransitionAction,
            &transition.actions,
            &payload,
            &mut persisted,
        )
        .await?;

        let target = match take_override(&mut persisted) {
            Some(dynamic) => {
                span.record("fsm.dynamic_target", dynamic.as_str());
                info!(
                    from = %transition.target,
                    to = %dynamic,
                    "Dynamic transition target override"
                );
                dynamic
            }
            None => transition.target.clone(),
        };

        self.run_callbacks(ctx, Phase::ExitCallback, &state.on_leave, &payload, &mut persisted)
            .await?;

        let target_state = self
            .inner
            .definition
            .state(&target)
            .ok_or_else(|| TransitionError::TargetStateNotFound {
                target: target.clone(),
            })?;

        self.run_callbacks(
            ctx,
            Phase::EntryCallback,
            &target_state.on_enter,
            &payload,
            &mut persisted,
        )
        .await?;

        Ok(TransitionOutcome::new(
            target,
            transition.chained_event().map(str::to_string),
            persisted,
        ))
    }

    fn state(&self, name: &str) -> Result<&State, TransitionError> {
        self.inner
            .definition
            .state(name)
            .ok_or_else(|| TransitionError::StateNotFound {
                state: name.to_string(),
            })
    }

    async fn resolve<'a>(
        &self,
        state: &'a State,
        event: &str,
        ctx: &ExecutionContext,
        payload: &Arc<DataBag>,
    ) -> Result<&'a Transition, TransitionError> {
        resolver::resolve(state, event, &self.inner.registry, ctx, payload)
            .await
            .map_err(|source| TransitionError::Resolution {
                from: state.name.clone(),
                event: event.to_string(),
                source,
            })
    }

    /// Evaluate every guard of `transition`; the first false or failing
    /// guard aborts.
    async fn check_guards(
        &self,
        ctx: &ExecutionContext,
        transition: &Transition,
        payload: &Arc<DataBag>,
    ) -> Result<(), TransitionError> {
        for name in &transition.conditions {
            let guard = self
                .inner
                .registry
                .guard(name)
                .map_err(|source| TransitionError::GuardNotFound {
                    guard: name.clone(),
                    source,
                })?;

            debug!(condition = %name, "Evaluating condition");
            let passed = ctx
                .run(guard(ctx.clone(), Arc::clone(payload)))
                .await
                .map_err(|source| TransitionError::Interrupted {
                    phase: Phase::Guard,
                    callback: name.clone(),
                    source,
                })?
                .map_err(|source| TransitionError::callback(Phase::Guard, name, source))?;

            if !passed {
                debug!(condition = %name, "Condition evaluated to false");
                return Err(TransitionError::GuardRejected {
                    guard: name.clone(),
                });
            }
            debug!(condition = %name, "Condition passed");
        }
        Ok(())
    }

    /// Run named actions in order, merging each result into `persisted`.
    async fn run_callbacks(
        &self,
        ctx: &ExecutionContext,
        phase: Phase,
        names: &[String],
        payload: &Arc<DataBag>,
        persisted: &mut DataBag,
    ) -> Result<(), TransitionError> {
        for name in names {
            let action = self
                .inner
                .registry
                .action(name)
                .map_err(|source| TransitionError::not_found(phase, name, source))?;

            debug!(%phase, action = %name, "Executing action");
            let update = ctx
                .run(action(ctx.clone(), Arc::clone(payload)))
                .await
                .map_err(|source| TransitionError::Interrupted {
                    phase,
                    callback: name.clone(),
                    source,
                })?
                .map_err(|source| TransitionError::callback(phase, name, source))?;

            if let Some(update) = update {
                debug!(
                    %phase,
                    action = %name,
                    keys = ?update.keys().collect::<Vec<_>>(),
                    "Action updated data"
                );
                persisted.extend(update);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("definition", &self.inner.definition)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

/// Remove and return a usable target override. Anything other than a
/// non-empty string is left in place and ignored.
fn take_override(data: &mut DataBag) -> Option<String> {
    match data.get(NEXT_STATE_OVERRIDE) {
        Some(Value::String(target)) if !target.is_empty() => {}
        _ => return None,
    }
    match data.remove(NEXT_STATE_OVERRIDE) {
        Some(Value::String(target)) => Some(target),
        _ => None,
    }
}
