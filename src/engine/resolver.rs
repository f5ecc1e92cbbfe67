//! Transition resolution.
//!
//! A single transition declared for an event is always chosen without
//! consulting its guards here; the pipeline evaluates them afterwards like
//! for any other transition. Competing transitions for one event form a
//! prioritized guard chain: declaration order is priority order and the
//! first candidate whose guards all pass wins.

use super::error::ResolveError;
use crate::context::ExecutionContext;
use crate::core::{DataBag, State, Transition};
use crate::registry::Registry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pick the transition of `state` to run for `event`.
pub(crate) async fn resolve<'a>(
    state: &'a State,
    event: &str,
    registry: &Registry,
    ctx: &ExecutionContext,
    payload: &Arc<DataBag>,
) -> Result<&'a Transition, ResolveError> {
    let candidates: Vec<&'a Transition> = state
        .transitions
        .iter()
        .filter(|t| t.event == event)
        .collect();

    match candidates.as_slice() {
        [] => {
            return Err(ResolveError::TransitionNotFound {
                event: event.to_string(),
            })
        }
        [only] => return Ok(*only),
        _ => {}
    }

    for candidate in candidates {
        if candidate.conditions.is_empty()
            || guards_pass(candidate, registry, ctx, payload).await?
        {
            debug!(event, target = %candidate.target, "Resolved conditional transition");
            return Ok(candidate);
        }
    }

    Err(ResolveError::NoMatchingTransition {
        event: event.to_string(),
    })
}

/// Evaluate a candidate's guards for disambiguation.
///
/// A guard that returns an error only disqualifies its candidate; missing
/// guards and interruptions still abort resolution.
async fn guards_pass(
    candidate: &Transition,
    registry: &Registry,
    ctx: &ExecutionContext,
    payload: &Arc<DataBag>,
) -> Result<bool, ResolveError> {
    for name in &candidate.conditions {
        let guard = registry
            .guard(name)
            .map_err(|source| ResolveError::GuardNotFound {
                guard: name.clone(),
                source,
            })?;

        let interrupted = |source| ResolveError::Interrupted {
            guard: name.clone(),
            source,
        };

        match ctx.run(guard(ctx.clone(), Arc::clone(payload))).await {
            Err(reason) => return Err(interrupted(reason)),
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                debug!(
                    condition = %name,
                    target = %candidate.target,
                    "Candidate rejected by condition"
                );
                return Ok(false);
            }
            Ok(Err(err)) => {
                if let Some(reason) = err.interruption() {
                    return Err(interrupted(reason));
                }
                warn!(
                    condition = %name,
                    target = %candidate.target,
                    error = %err,
                    "Condition failed during resolution, skipping candidate"
                );
                return Ok(false);
            }
        }
    }

    Ok(true)
}
