//! Conditional Branching
//!
//! This example routes a number down one of two branches with a guard chain.
//!
//! Key concepts:
//! - Several transitions for one event, tried in declaration order
//! - Guards that read the data bag
//! - A guarded single transition that still has to pass its guard
//!
//! Run with: cargo run --example conditional

use machina::{
    DataBag, ExecutionContext, Registry, State, StateMachine, Transition, WorkflowDefinition,
};
use serde_json::Value;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn number(data: &DataBag) -> Option<i64> {
    data.get("number").and_then(Value::as_i64)
}

fn definition() -> WorkflowDefinition {
    WorkflowDefinition::new()
        .with_initial_state("A")
        .with_state(
            State::new("A")
                .transition(Transition::new("process", "B").guard("isEven"))
                .transition(Transition::new("process", "C").guard("isOdd")),
        )
        .with_state(State::new("B").on_enter("logState").transition(Transition::new("next", "D")))
        .with_state(State::new("C").on_enter("logState").transition(Transition::new("next", "E")))
        .with_state(State::new("D").on_enter("logState").transition(Transition::new("next", "E")))
        .with_state(State::new("E").on_enter("logState"))
}

fn registry() -> Result<Registry, Box<dyn Error>> {
    let registry = Registry::new();
    registry.register_guard("isEven", |_ctx, data| async move {
        Ok(number(&data).is_some_and(|n| n % 2 == 0))
    })?;
    registry.register_guard("isOdd", |_ctx, data| async move {
        Ok(number(&data).is_some_and(|n| n % 2 != 0))
    })?;
    registry.register_action("logState", |_ctx, data| async move {
        println!("  visiting with number {:?}", number(&data));
        Ok(None)
    })?;
    Ok(registry)
}

async fn run(machine: &StateMachine, value: i64) -> Result<Vec<String>, Box<dyn Error>> {
    let ctx = ExecutionContext::new();
    let mut state = machine.initial_state().unwrap_or("A").to_string();
    let mut data = DataBag::new();
    data.insert("number".into(), Value::from(value));

    let mut path = vec![state.clone()];
    let mut event = "process";
    while machine.definition().state(&state).is_some_and(|s| !s.transitions.is_empty()) {
        let outcome = machine.trigger(&ctx, &state, event, &data).await?;
        state = outcome.new_state().to_string();
        data = outcome.into_data();
        path.push(state.clone());
        event = "next";
    }
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Conditional Branching ===\n");

    let machine = StateMachine::new(definition(), registry()?)?;

    for value in [4, 7] {
        println!("Starting with {value}");
        let path = run(&machine, value).await?;
        println!("Path: {}\n", path.join(" -> "));
    }

    Ok(())
}
