//! The experiment design: one script, one closed set of arms.

use super::condition::ConditionSet;
use super::resolver::ConditionResolver;
use super::script::{Script, ScriptStore};

/// Everything a session needs to run, shared read-only across sessions.
#[derive(Debug)]
pub struct ExperimentDesign {
    store: ScriptStore,
    conditions: ConditionSet,
    resolver: ConditionResolver,
}

impl ExperimentDesign {
    /// Bundles a script store with its condition set. The resolver falls back
    /// to the set's default condition.
    #[must_use]
    pub fn new(store: ScriptStore, conditions: ConditionSet) -> Self {
        let resolver = ConditionResolver::new(conditions.default_condition().clone());
        Self {
            store,
            conditions,
            resolver,
        }
    }

    /// The script store (including any load fallback error).
    #[must_use]
    pub fn store(&self) -> &ScriptStore {
        &self.store
    }

    /// The active script.
    #[must_use]
    pub fn script(&self) -> &Script {
        self.store.script()
    }

    /// The configured arms.
    #[must_use]
    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    /// The resolver bound to the default arm.
    #[must_use]
    pub fn resolver(&self) -> &ConditionResolver {
        &self.resolver
    }
}
