use std::sync::Arc;

use crate::error::{Error, Result};
use crate::metadata::factory::Factory;
use crate::metadata::join::Join;
use crate::registry;

/// Reference to a child factory: a shared instance, or a name resolved
/// through the registry at build time. Named references are what allow a
/// metadata graph to contain cycles.
#[derive(Clone)]
pub enum FactoryRef {
    Direct(Arc<Factory>),
    Named(String),
}

impl FactoryRef {
    pub fn resolve(&self) -> Result<Arc<Factory>> {
        match self {
            Self::Direct(factory) => Ok(factory.clone()),
            Self::Named(name) => {
                registry::factory(name).ok_or_else(|| Error::resolution(name.clone()))
            }
        }
    }
}

impl From<Arc<Factory>> for FactoryRef {
    fn from(factory: Arc<Factory>) -> Self {
        Self::Direct(factory)
    }
}

impl From<&str> for FactoryRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for FactoryRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// One relationship edge from a parent factory to a child factory.
///
/// `single` relationships attach at most one child (the carrier receives
/// the sole model); otherwise the carrier receives the full ordered list of
/// matched children.
#[derive(Clone)]
pub struct Inventory {
    name: String,
    factory: FactoryRef,
    join: Join,
    carrier: String,
    single: bool,
}

impl Inventory {
    pub fn new(
        name: impl Into<String>,
        factory: impl Into<FactoryRef>,
        join: Join,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            factory: factory.into(),
            join,
            carrier: carrier.into(),
            single: false,
        }
    }

    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factory(&self) -> &FactoryRef {
        &self.factory
    }

    pub fn join(&self) -> &Join {
        &self.join
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn is_single(&self) -> bool {
        self.single
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.name.is_empty() {
            errors.push("inventory is missing [name]".to_string());
        }
        if self.carrier.is_empty() {
            errors.push(format!("inventory '{}' is missing [carrier]", self.name));
        }
        if let FactoryRef::Named(name) = &self.factory {
            if name.is_empty() {
                errors.push(format!("inventory '{}' is missing [factory]", self.name));
            }
        }
        self.join.validate(errors);
    }
}
