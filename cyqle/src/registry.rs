//! Process-wide metadata lookup tables.
//!
//! Factories and model constructors are registered once at startup and read
//! for the life of the process; the build path never writes here. Named
//! references ([`crate::FactoryRef::Named`], [`crate::ModelRef::Deferred`])
//! resolve through these tables, which is also what lets metadata graphs
//! contain cycles.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::metadata::factory::Factory;
use crate::model::ModelCtor;

static FACTORIES: Lazy<RwLock<HashMap<String, Arc<Factory>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static MODELS: Lazy<RwLock<HashMap<String, ModelCtor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a factory under its own name. Re-registering a name replaces
/// the previous entry.
pub fn register_factory(factory: Arc<Factory>) -> Arc<Factory> {
    FACTORIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(factory.name().to_string(), factory.clone());
    factory
}

/// Look up a registered factory.
pub fn factory(name: &str) -> Option<Arc<Factory>> {
    FACTORIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Register a model constructor under a name, the target of
/// [`crate::ModelRef::Deferred`] references.
pub fn register_model(name: impl Into<String>, ctor: ModelCtor) {
    MODELS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.into(), ctor);
}

/// Look up a registered model constructor.
pub fn model(name: &str) -> Option<ModelCtor> {
    MODELS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .copied()
}
