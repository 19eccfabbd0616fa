use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::model::ModelHandle;

#[derive(Clone)]
enum Callback {
    Closure(Arc<dyn Fn(&ModelHandle) + Send + Sync>),
    Method(String),
}

/// Per-level post-build hook.
///
/// During assembly every model built at the processor's level is queued (one
/// entry per fetched row); once the level and all its descendants are
/// complete, the callback runs over the queue in order. Queue state lives in
/// per-build scratch, never on the processor, so every build starts fresh.
#[derive(Clone)]
pub struct Processor {
    callback: Callback,
}

impl Processor {
    /// A processor backed by a closure taking the model handle.
    pub fn new(callback: impl Fn(&ModelHandle) + Send + Sync + 'static) -> Self {
        Self {
            callback: Callback::Closure(Arc::new(callback)),
        }
    }

    /// A processor that invokes a zero-argument named method on each model.
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            callback: Callback::Method(name.into()),
        }
    }

    pub(crate) fn run(&self, queue: &[ModelHandle]) -> Result<()> {
        for model in queue {
            match &self.callback {
                Callback::Closure(callback) => callback(model),
                Callback::Method(name) => model.borrow_mut().call(name)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.callback {
            Callback::Closure(_) => f.write_str("Processor(closure)"),
            Callback::Method(name) => write!(f, "Processor(method {})", name),
        }
    }
}
