//! Linear Workflow
//!
//! This example walks an order through a fixed pipeline loaded from YAML.
//!
//! Key concepts:
//! - Loading a workflow definition from a document
//! - OnEnter actions that record progress in the data bag
//! - Following auto events until the workflow settles
//!
//! Run with: cargo run --example linear

use machina::config;
use machina::{DataBag, ExecutionContext, Registry, StateMachine};
use serde_json::Value;
use std::error::Error;
use tracing_subscriber::EnvFilter;

const WORKFLOW: &str = r#"
initialState: received
states:
  received:
    name: received
    transitions:
      - event: validate
        target: validated
        autoEvent: pack
  validated:
    name: validated
    onEnter: [logState]
    transitions:
      - event: pack
        target: packed
        autoEvent: ship
  packed:
    name: packed
    onEnter: [logState]
    transitions:
      - event: ship
        target: shipped
  shipped:
    name: shipped
    onEnter: [logState, stampShipped]
"#;

fn register_callbacks(registry: &Registry) -> Result<(), Box<dyn Error>> {
    registry.register_action("logState", |_ctx, data| async move {
        let order = data.get("orderId").and_then(Value::as_str).unwrap_or("?");
        println!("  order {order}: entered next stage");
        Ok(None)
    })?;

    registry.register_action("stampShipped", |_ctx, _data| async move {
        let mut update = DataBag::new();
        update.insert("shipped".into(), Value::Bool(true));
        Ok(Some(update))
    })?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Linear Workflow ===\n");

    let definition = config::from_yaml_str(WORKFLOW)?;
    let registry = Registry::new();
    register_callbacks(&registry)?;
    let machine = StateMachine::new(definition, registry)?;

    let ctx = ExecutionContext::new();
    let mut state = machine.initial_state().unwrap_or("received").to_string();
    let mut data = DataBag::new();
    data.insert("orderId".into(), Value::from("12345"));

    let mut event = Some("validate".to_string());
    while let Some(current_event) = event.take() {
        let outcome = machine.trigger(&ctx, &state, &current_event, &data).await?;
        println!("{state} --{current_event}--> {}", outcome.new_state());

        let (new_state, auto_event, new_data) = outcome.into_parts();
        state = new_state;
        event = auto_event;
        data = new_data;
    }

    println!("\nFinal state: {state}");
    println!("Final data: {}", Value::Object(data));
    Ok(())
}
