//! Join descriptions and alias-collision accounting.

use std::collections::HashMap;

/// Per-compilation accounting of join references. One scope covers one
/// compiled query tree (a level's query including its chain of correlated
/// subqueries); occurrences are counted in emission order.
#[derive(Debug, Default)]
pub(crate) struct AliasScope {
    seen: HashMap<String, usize>,
}

impl AliasScope {
    /// Record one more occurrence of a reference and return its ordinal
    /// (1 for the first occurrence).
    pub(crate) fn occurrence(&mut self, reference: &str) -> usize {
        let count = self.seen.entry(reference.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// Describes how a level's query brings the parent table into scope:
/// either a structured table/alias/ON template, or a raw override emitted
/// verbatim.
///
/// ON templates reference tables or aliases through `{name}` placeholders,
/// e.g. `"{wheel}.bicycle_id = {bicycle}.id"`. When the same reference is
/// joined more than once within a compiled query tree, the second and later
/// occurrences are renamed `<table><ordinal>` and the template placeholder
/// for that reference follows the rename; everything else resolves to
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    table: String,
    alias: Option<String>,
    on: Option<String>,
    raw: Option<String>,
}

impl Join {
    pub fn new(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            on: Some(on.into()),
            raw: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// A raw override, emitted verbatim with no placeholder substitution.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            table: String::new(),
            alias: None,
            on: None,
            raw: Some(text.into()),
        }
    }

    /// A raw override supplied as separate lines.
    pub fn raw_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self::raw(
            lines
                .iter()
                .map(|line| line.as_ref())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name this join is referred to by: alias if declared, else table.
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.raw.is_some() {
            return;
        }
        if self.table.is_empty() {
            errors.push("join is missing [table]".to_string());
        }
        if self.on.as_deref().unwrap_or("").is_empty() {
            errors.push("join is missing [on]".to_string());
        }
    }

    /// Emit the JOIN clause, consulting the scope for collision renames.
    pub(crate) fn compile(&self, scope: &mut AliasScope) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }

        let on_template = self.on.as_deref().unwrap_or("");
        let occurrence = scope.occurrence(self.reference());
        if occurrence > 1 {
            let renamed = format!("{}{}", self.table, occurrence);
            let on = resolve_template(on_template, self.reference(), &renamed);
            format!("JOIN {} {} ON {}", self.table, renamed, on)
        } else {
            let alias = match &self.alias {
                Some(alias) => format!(" {}", alias),
                None => String::new(),
            };
            let on = resolve_template(on_template, self.reference(), self.reference());
            format!("JOIN {}{} ON {}", self.table, alias, on)
        }
    }
}

/// Substitute `{name}` placeholders: the renamed reference maps to its
/// replacement, every other name maps to itself.
fn resolve_template(template: &str, reference: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        match rest[start..].find('}') {
            Some(offset) => {
                let name = &rest[start + 1..start + offset];
                if name == reference {
                    out.push_str(replacement);
                } else {
                    out.push_str(name);
                }
                rest = &rest[start + offset + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
