//! Metadata entities: the immutable value structs a factory tree is made
//! of, and the factory itself with its compile and build algorithms.

pub mod component;
pub mod factory;
pub mod inventory;
pub mod join;
pub mod processor;

pub use component::{Component, ComponentType};
pub use factory::{Factory, FactoryBuilder};
pub use inventory::{FactoryRef, Inventory};
pub use join::Join;
pub use processor::Processor;
