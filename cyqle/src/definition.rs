//! Serde mirror of the metadata definition format.
//!
//! One record per entity: table and key metadata, a model name (resolved
//! through the model registry), component definitions and inventory
//! definitions whose child factories are named registry references. There
//! is no file I/O here; callers hand in already-parsed JSON values.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::metadata::component::{Component, ComponentType};
use crate::metadata::factory::Factory;
use crate::metadata::inventory::Inventory;
use crate::metadata::join::Join;
use crate::model::ModelRef;
use crate::registry;

/// One entity record.
#[derive(Debug, Deserialize)]
pub struct FactoryDef {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    pub model: String,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDef>,
    #[serde(default)]
    pub inventory: BTreeMap<String, InventoryDef>,
}

#[derive(Debug, Deserialize)]
pub struct ComponentDef {
    pub column: String,
    pub carrier: String,
    #[serde(rename = "type", default)]
    pub ctype: ComponentType,
}

#[derive(Debug, Deserialize)]
pub struct InventoryDef {
    /// Name of the child factory, resolved through the registry.
    pub factory: String,
    pub join: JoinDef,
    pub carrier: String,
    #[serde(default)]
    pub single: bool,
}

/// A join spec: raw override text, raw override lines, or a structured
/// table/alias/on record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JoinDef {
    Raw(String),
    Lines(Vec<String>),
    Structured {
        table: String,
        #[serde(default)]
        alias: Option<String>,
        on: String,
    },
}

impl From<JoinDef> for Join {
    fn from(def: JoinDef) -> Self {
        match def {
            JoinDef::Raw(text) => Join::raw(text),
            JoinDef::Lines(lines) => Join::raw_lines(&lines),
            JoinDef::Structured { table, alias, on } => {
                let join = Join::new(table, on);
                match alias {
                    Some(alias) => join.with_alias(alias),
                    None => join,
                }
            }
        }
    }
}

impl FactoryDef {
    pub fn into_factory(self) -> Result<Arc<Factory>> {
        let mut builder = Factory::builder(self.name, self.table)
            .model(ModelRef::Deferred(self.model));
        if let Some(alias) = self.alias {
            builder = builder.alias(alias);
        }
        if let Some(primary_key) = self.primary_key {
            builder = builder.primary_key(primary_key);
        }
        for (name, def) in self.components {
            builder = builder
                .component(Component::new(name, def.column, def.carrier).with_type(def.ctype));
        }
        for (name, def) in self.inventory {
            builder = builder.inventory(
                Inventory::new(name, def.factory, def.join.into(), def.carrier)
                    .single(def.single),
            );
        }
        builder.build()
    }
}

/// Build a factory from a parsed definition value and register it.
pub fn from_value(value: JsonValue) -> Result<Arc<Factory>> {
    let def: FactoryDef = serde_json::from_value(value)
        .map_err(|err| Error::config(format!("invalid factory definition: {}", err)))?;
    Ok(registry::register_factory(def.into_factory()?))
}

/// Build a factory from definition JSON text and register it.
pub fn from_json_str(text: &str) -> Result<Arc<Factory>> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|err| Error::config(format!("invalid factory definition: {}", err)))?;
    from_value(value)
}
