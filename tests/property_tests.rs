//! Property-based tests for resolution, data merging and the side-quest stack.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use machina::core::DefinitionError;
use machina::engine::ResolveError;
use machina::side_quest::{self, NEXT_STATE_OVERRIDE};
use machina::{
    DataBag, ExecutionContext, Registry, State, StateMachine, Transition, TransitionError,
    WorkflowDefinition,
};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;

fn block_on<F: Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(fut)
}

fn guard_registry() -> Registry {
    let registry = Registry::new();
    registry.register_guard("pass", |_, _| async { Ok(true) }).unwrap();
    registry.register_guard("fail", |_, _| async { Ok(false) }).unwrap();
    registry
}

prop_compose! {
    fn state_name()(suffix in "[a-z0-9_]{0,8}") -> String {
        format!("s{suffix}")
    }
}

prop_compose! {
    fn data_bag()(
        entries in prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..6)
    ) -> DataBag {
        entries
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()
    }
}

proptest! {
    #[test]
    fn first_passing_candidate_wins(outcomes in prop::collection::vec(any::<bool>(), 2..6)) {
        let mut source = State::new("source");
        let mut definition = WorkflowDefinition::new();
        for (index, passes) in outcomes.iter().enumerate() {
            let target = format!("t{index}");
            let guard = if *passes { "pass" } else { "fail" };
            source = source.transition(Transition::new("go", target.as_str()).guard(guard));
            definition = definition.with_state(State::new(target));
        }
        let definition = definition.with_state(source);
        let machine = StateMachine::new(definition, guard_registry()).unwrap();

        let ctx = ExecutionContext::new();
        let result = block_on(machine.trigger(&ctx, "source", "go", &DataBag::new()));

        match outcomes.iter().position(|passes| *passes) {
            Some(index) => {
                let outcome = result.unwrap();
                let expected = format!("t{index}");
                prop_assert_eq!(outcome.new_state(), expected.as_str());
            }
            None => {
                let is_no_match = matches!(
                    result,
                    Err(TransitionError::Resolution {
                        source: ResolveError::NoMatchingTransition { .. },
                        ..
                    })
                );
                prop_assert!(is_no_match);
            }
        }
    }

    #[test]
    fn outcome_data_is_input_extended_by_updates(
        input in data_bag(),
        first in data_bag(),
        second in data_bag(),
    ) {
        let registry = Registry::new();
        let update = first.clone();
        registry
            .register_action("first", move |_, _| {
                let update = update.clone();
                async move { Ok(Some(update)) }
            })
            .unwrap();
        let update = second.clone();
        registry
            .register_action("second", move |_, _| {
                let update = update.clone();
                async move { Ok(Some(update)) }
            })
            .unwrap();

        let definition = WorkflowDefinition::new()
            .with_state(State::new("a").transition(Transition::new("go", "b").action("first")))
            .with_state(State::new("b").on_enter("second"));
        let machine = StateMachine::new(definition, registry).unwrap();

        let ctx = ExecutionContext::new();
        let outcome = block_on(machine.trigger(&ctx, "a", "go", &input)).unwrap();

        let mut expected = input.clone();
        expected.extend(first);
        expected.extend(second);
        prop_assert_eq!(outcome.data(), &expected);
    }

    #[test]
    fn override_selects_any_defined_state(
        targets in prop::collection::btree_set(state_name(), 1..5),
    ) {
        let targets: Vec<String> = targets.into_iter().collect();
        for target in &targets {
            let registry = Registry::new();
            let chosen = target.clone();
            registry
                .register_action("route", move |_, _| {
                    let mut update = DataBag::new();
                    update.insert(NEXT_STATE_OVERRIDE.to_string(), Value::from(chosen.clone()));
                    async move { Ok(Some(update)) }
                })
                .unwrap();

            let mut definition = WorkflowDefinition::new()
                .with_state(
                    State::new("origin")
                        .transition(Transition::new("go", "fallback").action("route")),
                )
                .with_state(State::new("fallback"));
            for name in &targets {
                definition = definition.with_state(State::new(name.as_str()));
            }
            let machine = StateMachine::new(definition, registry).unwrap();

            let ctx = ExecutionContext::new();
            let outcome =
                block_on(machine.trigger(&ctx, "origin", "go", &DataBag::new())).unwrap();
            prop_assert_eq!(outcome.new_state(), target.as_str());
            prop_assert!(!outcome.data().contains_key(NEXT_STATE_OVERRIDE));
        }
    }

    #[test]
    fn workflow_stack_pops_in_reverse_push_order(
        states in prop::collection::vec(state_name(), 1..8),
    ) {
        let mut data = DataBag::new();
        for state in &states {
            let update = side_quest::push_return_state(&data, state);
            data.extend(update);
        }

        let mut popped = Vec::new();
        while let Ok(update) = side_quest::pop_return_state(&data) {
            popped.push(update[NEXT_STATE_OVERRIDE].as_str().unwrap().to_string());
            data.extend(update);
        }

        let mut expected = states.clone();
        expected.reverse();
        prop_assert_eq!(popped, expected);
        prop_assert_eq!(side_quest::workflow_stack(&data), Some(Vec::new()));
    }

    #[test]
    fn empty_target_is_valid_only_with_return_action(
        with_return in any::<bool>(),
        event in state_name(),
    ) {
        let transition = if with_return {
            Transition::return_to_previous(event.as_str())
        } else {
            Transition::new(event.as_str(), "")
        };
        let definition = WorkflowDefinition::new()
            .with_state(State::new("detour").side_quest().transition(transition));

        let result = definition.validate();
        if with_return {
            prop_assert!(result.is_ok());
        } else {
            let is_missing_target = matches!(result, Err(DefinitionError::MissingTarget { .. }));
            prop_assert!(is_missing_target);
        }
    }

    #[test]
    fn validation_succeeds_iff_names_match_and_initial_state_exists(
        entries in prop::collection::btree_map("[a-d]", "[a-d]", 1..5),
        initial in prop::option::of("[a-e]?"),
    ) {
        let states: BTreeMap<String, State> = entries
            .iter()
            .map(|(key, name)| (key.clone(), State::new(name.as_str())))
            .collect();
        let definition = WorkflowDefinition {
            states,
            initial_state: initial.clone(),
        };

        let names_match = entries.iter().all(|(key, name)| key == name);
        let initial_exists = initial
            .as_deref()
            .map_or(true, |name| name.is_empty() || entries.contains_key(name));

        prop_assert_eq!(definition.validate().is_ok(), names_match && initial_exists);
    }

    #[test]
    fn identical_triggers_produce_identical_outcomes(
        input in data_bag(),
        threshold in any::<i64>(),
    ) {
        let registry = Registry::new();
        registry
            .register_guard("aboveThreshold", move |_, data| async move {
                Ok(data.values().filter_map(Value::as_i64).any(|n| n > threshold))
            })
            .unwrap();
        registry
            .register_action("summarize", |_, data| async move {
                let total: i64 = data.values().filter_map(Value::as_i64).fold(0, i64::wrapping_add);
                let mut update = DataBag::new();
                update.insert("total".to_string(), Value::from(total));
                update.insert("keys".to_string(), Value::from(data.len()));
                Ok(Some(update))
            })
            .unwrap();

        let definition = WorkflowDefinition::new()
            .with_state(
                State::new("a")
                    .transition(
                        Transition::new("go", "high")
                            .guard("aboveThreshold")
                            .action("summarize"),
                    )
                    .transition(
                        Transition::new("go", "low")
                            .action("summarize")
                            .auto_event("retry"),
                    ),
            )
            .with_state(State::new("high").on_enter("summarize"))
            .with_state(State::new("low"));
        let machine = StateMachine::new(definition, registry).unwrap();

        let ctx = ExecutionContext::new();
        let first = block_on(machine.trigger(&ctx, "a", "go", &input)).unwrap();
        let second = block_on(machine.trigger(&ctx, "a", "go", &input)).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn builtins_install_once_across_machines(count in 1usize..5) {
        let registry = Registry::new();
        for _ in 0..count {
            let definition = WorkflowDefinition::new().with_state(State::new("only"));
            StateMachine::new(definition, registry.clone()).unwrap();
        }

        let actions = registry.names(machina::registry::CallbackKind::Action);
        prop_assert_eq!(actions, vec![side_quest::RETURN_TO_PREVIOUS_STATE.to_string()]);
    }
}
