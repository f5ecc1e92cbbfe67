//! Side Quests
//!
//! This example diverts a support ticket into a review state and returns to
//! wherever it came from.
//!
//! Key concepts:
//! - Pushing the current state onto the workflow stack before diverting
//! - Returning with the built-in return action and an empty target
//! - Redirecting with the next-state override
//! - Bounding a transition with a deadline
//!
//! Run with: cargo run --example side_quest

use machina::side_quest::{self, NEXT_STATE_OVERRIDE, WORKFLOW_STACK};
use machina::{
    CallbackError, DataBag, ExecutionContext, Registry, State, StateMachine, Transition,
    WorkflowDefinition,
};
use serde_json::Value;
use std::error::Error;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn definition() -> WorkflowDefinition {
    WorkflowDefinition::new()
        .with_initial_state("open")
        .with_state(
            State::new("open")
                .transition(Transition::new("work", "in_progress"))
                .transition(Transition::new("review", "review").action("rememberState")),
        )
        .with_state(
            State::new("in_progress")
                .transition(Transition::new("resolve", "resolved").action("routeEscalations"))
                .transition(Transition::new("review", "review").action("rememberState")),
        )
        .with_state(
            State::new("review")
                .side_quest()
                .on_enter("slowAudit")
                .transition(Transition::return_to_previous("approve")),
        )
        .with_state(State::new("resolved"))
        .with_state(State::new("escalated"))
}

fn registry() -> Result<Registry, Box<dyn Error>> {
    let registry = Registry::new();

    registry.register_action("rememberState", |_ctx, data| async move {
        let Some(current) = data.get("state").and_then(Value::as_str) else {
            return Err(CallbackError::msg("ticket has no current state"));
        };
        Ok(Some(side_quest::push_return_state(&data, current)))
    })?;

    registry.register_action("slowAudit", |ctx, _data| async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(20)) => Ok(None),
            reason = ctx.done() => Err(CallbackError::Interrupted(reason)),
        }
    })?;

    registry.register_action("routeEscalations", |_ctx, data| async move {
        let priority = data.get("priority").and_then(Value::as_str).unwrap_or("normal");
        if priority != "urgent" {
            return Ok(None);
        }
        let mut update = DataBag::new();
        update.insert(NEXT_STATE_OVERRIDE.into(), Value::from("escalated"));
        Ok(Some(update))
    })?;

    Ok(registry)
}

async fn step(
    machine: &StateMachine,
    ctx: &ExecutionContext,
    state: &mut String,
    data: &mut DataBag,
    event: &str,
) -> Result<(), Box<dyn Error>> {
    data.insert("state".into(), Value::from(state.as_str()));
    let outcome = machine.trigger(ctx, state, event, data).await?;
    println!(
        "{state} --{event}--> {}  stack={}",
        outcome.new_state(),
        outcome.data().get(WORKFLOW_STACK).cloned().unwrap_or(Value::Null)
    );
    *state = outcome.new_state().to_string();
    *data = outcome.into_data();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Side Quests ===\n");

    let machine = StateMachine::new(definition(), registry()?)?;
    let ctx = ExecutionContext::new();

    let mut state = machine.initial_state().unwrap_or("open").to_string();
    let mut data = DataBag::new();
    data.insert("priority".into(), Value::from("urgent"));

    step(&machine, &ctx, &mut state, &mut data, "work").await?;
    step(&machine, &ctx, &mut state, &mut data, "review").await?;
    step(&machine, &ctx, &mut state, &mut data, "approve").await?;
    step(&machine, &ctx, &mut state, &mut data, "resolve").await?;
    println!("\nFinal state: {state}");

    println!("\nReturning without a recorded state:");
    match machine
        .trigger(&ctx, "review", "approve", &DataBag::new())
        .await
    {
        Ok(outcome) => println!("  unexpected success: {}", outcome.new_state()),
        Err(err) => println!("  {err} [{}]", err.category()),
    }

    println!("\nEntering review with a 5ms deadline:");
    let mut data = DataBag::new();
    data.insert("state".into(), Value::from("open"));
    let hurried = ctx.with_timeout(Duration::from_millis(5));
    match machine.trigger(&hurried, "open", "review", &data).await {
        Ok(outcome) => println!("  unexpected success: {}", outcome.new_state()),
        Err(err) => println!("  {err} [{}]", err.category()),
    }

    Ok(())
}
