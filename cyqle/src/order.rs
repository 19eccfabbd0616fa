//! Order normalization.
//!
//! Callers hand in a shorthand selection spec as JSON: a list of component
//! names, optionally mixed with nested maps for relationships, or a map
//! whose integer-like keys denote positional component names. Normalization
//! turns either shape into the canonical recursive [`Order`].

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// Reserved key that holds the component-name list in the canonical
/// mapping encoding.
pub const COMPONENTS_KEY: &str = "__components__";

/// Canonical selection spec: the component names requested at this level
/// and one sub-order per requested relationship.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    pub components: Vec<String>,
    pub children: BTreeMap<String, Order>,
}

impl Order {
    /// Normalize a shorthand spec. Idempotent: normalizing the canonical
    /// encoding of an order yields an equal order.
    pub fn normalize(spec: &JsonValue) -> Result<Self> {
        match spec {
            JsonValue::Array(items) => Self::from_sequence(items),
            JsonValue::Object(map) => Self::from_mapping(map),
            other => Err(Error::config(format!(
                "order must be a sequence or a mapping, got {}",
                other
            ))),
        }
    }

    /// The canonical JSON encoding: `__components__` plus one entry per
    /// relationship.
    pub fn to_value(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert(
            COMPONENTS_KEY.to_string(),
            JsonValue::Array(
                self.components
                    .iter()
                    .map(|name| JsonValue::String(name.clone()))
                    .collect(),
            ),
        );
        for (name, child) in &self.children {
            map.insert(name.clone(), child.to_value());
        }
        JsonValue::Object(map)
    }

    fn from_sequence(items: &[JsonValue]) -> Result<Self> {
        let mut order = Order::default();
        for item in items {
            match item {
                JsonValue::String(name) => order.components.push(name.clone()),
                JsonValue::Object(map) => {
                    for (key, value) in map {
                        if key == COMPONENTS_KEY {
                            order.components.extend(component_list(value)?);
                        } else {
                            order.children.insert(key.clone(), Self::normalize(value)?);
                        }
                    }
                }
                other => {
                    return Err(Error::config(format!(
                        "order entries must be component names or relationship maps, got {}",
                        other
                    )))
                }
            }
        }
        Ok(order)
    }

    fn from_mapping(map: &Map<String, JsonValue>) -> Result<Self> {
        let mut order = Order::default();
        // Integer-like keys carry positional component names; collect and
        // sort them numerically since JSON maps do not preserve positions.
        let mut positional: Vec<(i64, String)> = Vec::new();
        for (key, value) in map {
            if key == COMPONENTS_KEY {
                order.components.extend(component_list(value)?);
            } else if let Ok(index) = key.parse::<i64>() {
                match value {
                    JsonValue::String(name) => positional.push((index, name.clone())),
                    other => {
                        return Err(Error::config(format!(
                            "positional order entry {} must be a component name, got {}",
                            index, other
                        )))
                    }
                }
            } else {
                order.children.insert(key.clone(), Self::normalize(value)?);
            }
        }
        positional.sort_by_key(|(index, _)| *index);
        order
            .components
            .extend(positional.into_iter().map(|(_, name)| name));
        Ok(order)
    }
}

fn component_list(value: &JsonValue) -> Result<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        Error::config(format!("{} must hold a list of names", COMPONENTS_KEY))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::config(format!("component names must be strings, got {}", item))
            })
        })
        .collect()
}
