//! Named callback implementations.
//!
//! Workflow definitions only refer to guards and actions by name. The
//! [`Registry`] maps those names to the host application's implementations:
//! - a **guard** decides whether a transition may proceed
//! - an **action** performs side effects and may return data-bag updates
//!
//! Registration takes a write lock and is expected at startup; lookups take a
//! read lock and are safe from any number of concurrent transitions.

mod error;

pub use error::{CallbackError, RegistryError};

use crate::context::ExecutionContext;
use crate::core::DataBag;
use crate::side_quest::{self, RETURN_TO_PREVIOUS_STATE};
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future produced by a guard.
pub type GuardFuture = BoxFuture<'static, Result<bool, CallbackError>>;

/// Future produced by an action. `None` means there is nothing to merge.
pub type ActionFuture = BoxFuture<'static, Result<Option<DataBag>, CallbackError>>;

/// Type-erased guard implementation.
pub type GuardFn = Arc<dyn Fn(ExecutionContext, Arc<DataBag>) -> GuardFuture + Send + Sync>;

/// Type-erased action implementation.
pub type ActionFn = Arc<dyn Fn(ExecutionContext, Arc<DataBag>) -> ActionFuture + Send + Sync>;

/// The two callback shapes a registry stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    Guard,
    Action,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guard => f.write_str("Condition"),
            Self::Action => f.write_str("Action"),
        }
    }
}

#[derive(Default)]
struct Callbacks {
    guards: HashMap<String, GuardFn>,
    actions: HashMap<String, ActionFn>,
}

/// Thread-safe name to implementation store.
///
/// Cloning a registry yields another handle to the same store.
///
/// # Example
///
/// ```rust
/// use machina::registry::{CallbackKind, Registry};
/// use machina::core::DataBag;
///
/// let registry = Registry::new();
/// registry
///     .register_guard("isAdult", |_ctx, data| async move {
///         Ok(data.get("age").and_then(|v| v.as_u64()).unwrap_or(0) >= 18)
///     })
///     .unwrap();
/// registry
///     .register_action("greet", |_ctx, _data| async move {
///         let mut update = DataBag::new();
///         update.insert("greeted".into(), true.into());
///         Ok(Some(update))
///     })
///     .unwrap();
///
/// assert!(registry.contains(CallbackKind::Guard, "isAdult"));
/// assert!(registry.register_guard("isAdult", |_, _| async { Ok(true) }).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<Callbacks>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guard under `name`.
    pub fn register_guard<F, Fut>(
        &self,
        name: impl Into<String>,
        guard: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(ExecutionContext, Arc<DataBag>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, CallbackError>> + Send + 'static,
    {
        let guard: GuardFn =
            Arc::new(move |ctx: ExecutionContext, data: Arc<DataBag>| guard(ctx, data).boxed());
        self.insert_guard(name.into(), guard)
    }

    /// Register an already type-erased guard.
    pub fn insert_guard(&self, name: String, guard: GuardFn) -> Result<(), RegistryError> {
        let mut callbacks = self.inner.write();
        if callbacks.guards.contains_key(&name) {
            return Err(RegistryError::DuplicateRegistration {
                kind: CallbackKind::Guard,
                name,
            });
        }
        callbacks.guards.insert(name, guard);
        Ok(())
    }

    /// Register an action under `name`.
    ///
    /// The name of the built-in return action is reserved and rejected.
    pub fn register_action<F, Fut>(
        &self,
        name: impl Into<String>,
        action: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(ExecutionContext, Arc<DataBag>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<DataBag>, CallbackError>> + Send + 'static,
    {
        let action: ActionFn =
            Arc::new(move |ctx: ExecutionContext, data: Arc<DataBag>| action(ctx, data).boxed());
        self.insert_action(name.into(), action)
    }

    /// Register an already type-erased action.
    pub fn insert_action(&self, name: String, action: ActionFn) -> Result<(), RegistryError> {
        if name == RETURN_TO_PREVIOUS_STATE {
            return Err(RegistryError::Reserved { name });
        }

        let mut callbacks = self.inner.write();
        if callbacks.actions.contains_key(&name) {
            return Err(RegistryError::DuplicateRegistration {
                kind: CallbackKind::Action,
                name,
            });
        }
        callbacks.actions.insert(name, action);
        Ok(())
    }

    /// Look up a guard. The returned handle does not hold the lock.
    pub fn guard(&self, name: &str) -> Result<GuardFn, RegistryError> {
        self.inner
            .read()
            .guards
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: CallbackKind::Guard,
                name: name.to_string(),
            })
    }

    /// Look up an action. The returned handle does not hold the lock.
    pub fn action(&self, name: &str) -> Result<ActionFn, RegistryError> {
        self.inner
            .read()
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: CallbackKind::Action,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, kind: CallbackKind, name: &str) -> bool {
        let callbacks = self.inner.read();
        match kind {
            CallbackKind::Guard => callbacks.guards.contains_key(name),
            CallbackKind::Action => callbacks.actions.contains_key(name),
        }
    }

    /// Registered names of one kind, sorted.
    pub fn names(&self, kind: CallbackKind) -> Vec<String> {
        let callbacks = self.inner.read();
        let mut names: Vec<String> = match kind {
            CallbackKind::Guard => callbacks.guards.keys().cloned().collect(),
            CallbackKind::Action => callbacks.actions.keys().cloned().collect(),
        };
        names.sort();
        names
    }

    /// Install the built-in actions. Idempotent, so several machines can
    /// share one registry.
    pub(crate) fn install_builtins(&self) {
        let mut callbacks = self.inner.write();
        if callbacks.actions.contains_key(RETURN_TO_PREVIOUS_STATE) {
            return;
        }

        let builtin: ActionFn = Arc::new(|_ctx: ExecutionContext, data: Arc<DataBag>| {
            future::ready(side_quest::pop_return_state(&data).map(Some)).boxed()
        });
        callbacks
            .actions
            .insert(RETURN_TO_PREVIOUS_STATE.to_string(), builtin);
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("guards", &self.names(CallbackKind::Guard))
            .field("actions", &self.names(CallbackKind::Action))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> Arc<DataBag> {
        match value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn registered_guard_can_be_looked_up_and_called() {
        let registry = Registry::new();
        registry
            .register_guard("isPositive", |_ctx, data| async move {
                Ok(data.get("n").and_then(|v| v.as_i64()).unwrap_or(0) > 0)
            })
            .unwrap();

        let guard = registry.guard("isPositive").unwrap();
        assert!(guard(ExecutionContext::new(), bag(json!({"n": 3}))).await.unwrap());
        assert!(!guard(ExecutionContext::new(), bag(json!({"n": -1}))).await.unwrap());
    }

    #[tokio::test]
    async fn registered_action_returns_updates() {
        let registry = Registry::new();
        registry
            .register_action("stamp", |_ctx, _data| async move {
                let mut update = DataBag::new();
                update.insert("stamped".into(), json!(true));
                Ok(Some(update))
            })
            .unwrap();

        let action = registry.action("stamp").unwrap();
        let update = action(ExecutionContext::new(), Arc::new(DataBag::new()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.get("stamped"), Some(&json!(true)));
    }

    #[test]
    fn duplicate_guard_is_rejected() {
        let registry = Registry::new();
        registry.register_guard("g", |_, _| async { Ok(true) }).unwrap();

        let err = registry
            .register_guard("g", |_, _| async { Ok(false) })
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateRegistration {
                kind: CallbackKind::Guard,
                name: "g".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_action_is_rejected() {
        let registry = Registry::new();
        registry.register_action("a", |_, _| async { Ok(None) }).unwrap();

        assert!(matches!(
            registry.register_action("a", |_, _| async { Ok(None) }),
            Err(RegistryError::DuplicateRegistration {
                kind: CallbackKind::Action,
                ..
            })
        ));
    }

    #[test]
    fn guards_and_actions_have_separate_namespaces() {
        let registry = Registry::new();
        registry.register_guard("same", |_, _| async { Ok(true) }).unwrap();
        registry.register_action("same", |_, _| async { Ok(None) }).unwrap();

        assert!(registry.contains(CallbackKind::Guard, "same"));
        assert!(registry.contains(CallbackKind::Action, "same"));
    }

    #[test]
    fn missing_callbacks_report_not_found() {
        let registry = Registry::new();

        assert!(matches!(
            registry.guard("nope"),
            Err(RegistryError::NotFound { kind: CallbackKind::Guard, name }) if name == "nope"
        ));
        assert!(matches!(
            registry.action("nope"),
            Err(RegistryError::NotFound { kind: CallbackKind::Action, .. })
        ));
    }

    #[test]
    fn builtin_name_is_reserved() {
        let registry = Registry::new();
        let result = registry.register_action(RETURN_TO_PREVIOUS_STATE, |_, _| async { Ok(None) });

        assert!(matches!(result, Err(RegistryError::Reserved { .. })));
    }

    #[test]
    fn install_builtins_is_idempotent() {
        let registry = Registry::new();
        registry.install_builtins();
        registry.install_builtins();

        assert_eq!(
            registry.names(CallbackKind::Action),
            vec![RETURN_TO_PREVIOUS_STATE.to_string()]
        );
    }

    #[test]
    fn clones_share_one_store() {
        let registry = Registry::new();
        let handle = registry.clone();
        handle.register_guard("shared", |_, _| async { Ok(true) }).unwrap();

        assert!(registry.contains(CallbackKind::Guard, "shared"));
    }

    #[test]
    fn concurrent_registration_and_lookup() {
        let registry = Registry::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .register_guard(format!("g{i}"), |_, _| async { Ok(true) })
                        .unwrap();
                    registry.guard(&format!("g{i}")).is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(registry.names(CallbackKind::Guard).len(), 8);
    }
}
