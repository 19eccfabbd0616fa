//! cyqle builds trees of populated model instances from a relational data
//! source and a declarative, hierarchical selection spec (an "order").
//!
//! Application code declares, per entity, a [`Factory`]: which table and
//! columns feed which model ([`Component`]s) and how child entities nest
//! under parents ([`Inventory`] edges backed by [`Join`]s). A build walks
//! the normalized order depth-first and issues exactly one query per
//! nesting level — nested levels filter through correlated subqueries that
//! re-derive the parent chain's id set from the root identifiers, so the
//! query count never depends on row counts or relationship fan-out.
//!
//! Fetched rows are deduplicated by the synthetic `__id__` projection,
//! mapped onto models through the [`Model`] capability trait, bucketed by
//! `__pid__` and attached to their parents (to-one or to-many per the
//! inventory), with per-level [`Processor`] hooks running once the level
//! and its descendants are complete.

pub mod definition;
pub mod error;
pub mod key;
pub mod metadata;
pub mod model;
pub mod order;
pub mod registry;
pub mod source;
pub mod value;

pub use error::{Error, Result};
pub use key::Key;
pub use metadata::component::{Component, ComponentType};
pub use metadata::factory::{Factory, FactoryBuilder, ID_COLUMN, PID_COLUMN};
pub use metadata::inventory::{FactoryRef, Inventory};
pub use metadata::join::Join;
pub use metadata::processor::Processor;
pub use model::{downcast, Model, ModelCtor, ModelHandle, ModelRef};
pub use order::{Order, COMPONENTS_KEY};
pub use source::{Binds, DataSource};
pub use value::{Row, Value};
