//! Model contract and model-type references.
//!
//! A model is whatever application type a factory materializes rows into.
//! Instead of looking setters up by name at call time, models implement a
//! small capability trait: the assembler hands them carrier names and typed
//! values and the model routes them to its own fields.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::registry;
use crate::value::Value;

/// Shared handle to a materialized model. Builds are single-threaded, so
/// plain reference counting with interior mutability is enough; the same
/// handle is stored in the model map and attached into parent models.
pub type ModelHandle = Rc<RefCell<dyn Model>>;

/// Constructor for a model type: takes the internal row identity.
pub type ModelCtor = fn(Key) -> ModelHandle;

/// Capability trait the assembler drives models through.
pub trait Model: Any + fmt::Debug {
    /// Apply one scalar component value. Called once per fetched row per
    /// requested component; reapplication onto the same instance must be
    /// harmless.
    fn set_value(&mut self, carrier: &str, value: Value) -> Result<()>;

    /// Attach a to-one child.
    fn set_child(&mut self, carrier: &str, child: ModelHandle) -> Result<()>;

    /// Attach the full ordered list of matched to-many children.
    fn set_children(&mut self, carrier: &str, children: Vec<ModelHandle>) -> Result<()>;

    /// Invoke a zero-argument named method, used by name-based processors.
    fn call(&mut self, method: &str) -> Result<()> {
        Err(Error::model(format!("no method named '{}'", method)))
    }

    fn as_any(&self) -> &dyn Any;
}

/// Borrow a handle as a concrete model type.
pub fn downcast<T: Model>(handle: &ModelHandle) -> Option<Ref<'_, T>> {
    Ref::filter_map(handle.borrow(), |model| model.as_any().downcast_ref::<T>()).ok()
}

/// Reference to the model type a factory instantiates: either a direct
/// constructor or a name resolved through the model registry on first use.
#[derive(Clone)]
pub enum ModelRef {
    Ctor { key: &'static str, ctor: ModelCtor },
    Deferred(String),
}

impl ModelRef {
    /// The key naming this model type's bucket in the per-build model map.
    pub fn model_key(&self) -> &str {
        match self {
            Self::Ctor { key, .. } => key,
            Self::Deferred(name) => name,
        }
    }

    /// Resolve to a constructor. Deferred references that name nothing in
    /// the model registry are resolution errors.
    pub(crate) fn resolve(&self) -> Result<ModelCtor> {
        match self {
            Self::Ctor { ctor, .. } => Ok(*ctor),
            Self::Deferred(name) => {
                registry::model(name).ok_or_else(|| Error::resolution(name.clone()))
            }
        }
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ctor { key, .. } => f.debug_struct("Ctor").field("key", key).finish(),
            Self::Deferred(name) => f.debug_tuple("Deferred").field(name).finish(),
        }
    }
}
