use serde::{Deserialize, Serialize};

/// Logical type tag of a component, carried through from the metadata
/// definition; the core treats values opaquely and only records the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Binary,
}

/// One scalar column-to-model-attribute mapping. `name` is the public key
/// used in orders and result rows; `carrier` names the setter the
/// assembler invokes with the fetched value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: String,
    column: String,
    carrier: String,
    ctype: ComponentType,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            carrier: carrier.into(),
            ctype: ComponentType::default(),
        }
    }

    pub fn with_type(mut self, ctype: ComponentType) -> Self {
        self.ctype = ctype;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn ctype(&self) -> ComponentType {
        self.ctype
    }

    /// Render this component's SELECT expression.
    pub(crate) fn format_column(&self, prefix: &str) -> String {
        format!("{}.{} AS {}", prefix, self.column, self.name)
    }
}
