//! The central metadata unit and its algorithms: query compilation and
//! recursive build/assembly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::metadata::component::Component;
use crate::metadata::inventory::Inventory;
use crate::metadata::join::AliasScope;
use crate::metadata::processor::Processor;
use crate::model::{ModelCtor, ModelHandle, ModelRef};
use crate::order::Order;
use crate::source::{Binds, DataSource};
use crate::value::Value;

/// Column alias carrying the per-row internal identity.
pub const ID_COLUMN: &str = "__id__";

/// Column alias carrying the per-row parent identity.
pub const PID_COLUMN: &str = "__pid__";

const INDENT: &str = "    ";

/// Metadata and algorithms for one entity: its table, columns,
/// relationships, and how to build model instances of it.
///
/// Factories are immutable once built. All per-build state (binds, model
/// map, parent links) lives in context threaded through the recursion, so
/// one shared factory tree supports any number of concurrent builds.
pub struct Factory {
    name: String,
    table: String,
    alias: Option<String>,
    primary_key: Option<String>,
    model: ModelRef,
    resolved: OnceCell<ModelCtor>,
    components: BTreeMap<String, Component>,
    inventories: BTreeMap<String, Inventory>,
    filters: Vec<String>,
    processors: Vec<Processor>,
}

/// Parent-link chain for one in-progress build, threaded on the stack
/// through the recursion. The chain is what the correlated-subquery filter
/// walks when re-deriving the parent id set.
pub(crate) struct ParentLink<'a> {
    pub(crate) factory: &'a Factory,
    pub(crate) inventory: &'a Inventory,
    pub(crate) next: Option<&'a ParentLink<'a>>,
}

/// Per-build scratch state: the root bind parameters and the model map
/// keyed by model key, then by internal id.
struct BuildContext {
    binds: Binds,
    models: HashMap<String, HashMap<Key, ModelHandle>>,
}

impl Factory {
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> FactoryBuilder {
        FactoryBuilder {
            name: name.into(),
            table: table.into(),
            alias: None,
            primary_key: None,
            model: None,
            components: BTreeMap::new(),
            inventories: BTreeMap::new(),
            filters: Vec::new(),
            processors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// The name result columns are qualified with: alias if declared,
    /// else the table name.
    pub fn prefix(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// The key naming this factory's bucket in the per-build model map.
    pub fn model_key(&self) -> &str {
        self.model.model_key()
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn inventory(&self, name: &str) -> Option<&Inventory> {
        self.inventories.get(name)
    }

    pub fn has_inventory_item(&self, name: &str) -> bool {
        self.inventories.contains_key(name)
    }

    fn resolve_model(&self) -> Result<ModelCtor> {
        self.resolved
            .get_or_try_init(|| self.model.resolve())
            .copied()
    }

    // ---- bind-parameter construction ------------------------------------

    /// Convert root identifiers into ordered named bind parameters:
    /// `id0`, `id1`, ... matching the input order.
    pub fn binds(ids: Option<&[Key]>) -> Binds {
        match ids {
            None => Vec::new(),
            Some(ids) => ids
                .iter()
                .enumerate()
                .map(|(index, id)| (format!("id{}", index), Value::from(id.clone())))
                .collect(),
        }
    }

    // ---- query compilation ----------------------------------------------

    /// Compile this factory's root-level query for the given component
    /// names and bind parameters.
    pub fn query(&self, components: &[String], binds: &Binds) -> Result<String> {
        let mut scope = AliasScope::default();
        self.compile(Some(components), binds, 0, None, &mut scope)
    }

    /// Compile one level. `components` in id-only mode (`None`) produces
    /// the DISTINCT identifier projection used by correlated subqueries.
    fn compile(
        &self,
        components: Option<&[String]>,
        binds: &Binds,
        depth: usize,
        parent: Option<&ParentLink<'_>>,
        scope: &mut AliasScope,
    ) -> Result<String> {
        let mut lines = vec![
            format!("SELECT {}", self.compile_select(components, parent)?),
            format!("FROM {}", self.compile_from()),
        ];
        if let Some(link) = parent {
            lines.push(link.inventory.join().compile(scope));
        }
        lines.push(format!(
            "WHERE {}",
            self.compile_where(binds, depth, parent, scope)?
        ));
        for predicate in &self.filters {
            lines.push(format!("AND {}", predicate));
        }

        let tabs = INDENT.repeat(depth);
        Ok(format!("{}{}", tabs, lines.join(&format!("\n{}", tabs))))
    }

    fn compile_select(
        &self,
        components: Option<&[String]>,
        parent: Option<&ParentLink<'_>>,
    ) -> Result<String> {
        let mut select = match components {
            Some(_) => vec![self.id_column(Some(&format!("\"{}\"", ID_COLUMN)))],
            None => vec![format!("DISTINCT {}", self.id_column(None))],
        };

        if let (Some(names), Some(link)) = (components, parent) {
            if !names.is_empty() {
                select.push(link.factory.id_column(Some(&format!("\"{}\"", PID_COLUMN))));
            }
        }

        if let Some(names) = components {
            for name in names {
                let component = self
                    .component(name)
                    .ok_or_else(|| Error::config(format!("invalid component [{}]", name)))?;
                select.push(component.format_column(self.prefix()));
            }
        }

        Ok(select.join("\n,    "))
    }

    fn compile_from(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", self.table, alias),
            None => self.table.clone(),
        }
    }

    /// The identifier expression: the declared primary key, or a
    /// row-identity pseudo-column converted to a comparable form.
    fn id_column(&self, alias: Option<&str>) -> String {
        let expr = match &self.primary_key {
            Some(pk) => format!("{}.{}", self.prefix(), pk),
            None => format!("ROWIDTOCHAR({}.ROWID)", self.prefix()),
        };
        match alias {
            Some(alias) => format!("{} AS {}", expr, alias),
            None => expr,
        }
    }

    /// Root levels filter directly on the bound ids; nested levels filter
    /// through a correlated subquery that re-derives the parent chain's id
    /// set from the same root binds.
    fn compile_where(
        &self,
        binds: &Binds,
        depth: usize,
        parent: Option<&ParentLink<'_>>,
        scope: &mut AliasScope,
    ) -> Result<String> {
        if binds.is_empty() {
            return Ok("1=1".to_string());
        }

        match parent {
            None => {
                let placeholders = binds
                    .iter()
                    .map(|(name, _)| format!(":{}", name))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!(
                    "{}.{} IN ({})",
                    self.prefix(),
                    self.primary_key.as_deref().unwrap_or("ROWID"),
                    placeholders
                ))
            }
            Some(link) => {
                let parent_factory = link.factory;
                let subquery =
                    parent_factory.compile(None, binds, depth + 1, link.next, scope)?;
                Ok(format!(
                    "{}.{} IN (\n{}\n{})",
                    parent_factory.table(),
                    parent_factory.primary_key().unwrap_or("ROWID"),
                    subquery,
                    INDENT.repeat(depth)
                ))
            }
        }
    }

    // ---- recursive build / row assembly ---------------------------------

    /// Build models for the given order and root identifiers.
    ///
    /// `ids = None` returns every materialized root model (unordered);
    /// `ids = Some(list)` returns the matched models in the list's order,
    /// skipping ids with no match.
    pub fn build(
        &self,
        source: &mut dyn DataSource,
        spec: &JsonValue,
        ids: Option<&[Key]>,
    ) -> Result<Vec<ModelHandle>> {
        let order = Order::normalize(spec)?;
        let mut ctx = BuildContext {
            binds: Self::binds(ids),
            models: HashMap::new(),
        };
        self.build_level(source, &order, &mut ctx, None)?;

        let bucket = ctx.models.remove(self.model_key()).unwrap_or_default();
        match ids {
            None => Ok(bucket.into_values().collect()),
            Some(ids) => Ok(ids
                .iter()
                .filter_map(|id| bucket.get(id).cloned())
                .collect()),
        }
    }

    /// Build for a single root identifier, expecting exactly one match.
    pub fn build_one(
        &self,
        source: &mut dyn DataSource,
        spec: &JsonValue,
        id: Key,
    ) -> Result<ModelHandle> {
        let mut models = self.build(source, spec, Some(std::slice::from_ref(&id)))?;
        if models.len() != 1 {
            return Err(Error::Cardinality {
                found: models.len(),
            });
        }
        Ok(models.remove(0))
    }

    fn build_level(
        &self,
        source: &mut dyn DataSource,
        order: &Order,
        ctx: &mut BuildContext,
        parent: Option<&ParentLink<'_>>,
    ) -> Result<()> {
        let ctor = self.resolve_model()?;
        ctx.models.entry(self.model_key().to_string()).or_default();

        let mut scope = AliasScope::default();
        let query = self.compile(Some(&order.components), &ctx.binds, 0, parent, &mut scope)?;
        log::debug!("factory '{}' level query:\n{}", self.name, query);
        source.execute(&query, &ctx.binds)?;
        let rows = source.fetch_rows()?;
        log::debug!("factory '{}' fetched {} row(s)", self.name, rows.len());
        if rows.is_empty() {
            return Ok(());
        }

        let mut queues: Vec<Vec<ModelHandle>> = vec![Vec::new(); self.processors.len()];
        let mut payloads: HashMap<Key, Vec<ModelHandle>> = HashMap::new();

        for row in &rows {
            let id_cell = row
                .get(ID_COLUMN)
                .ok_or_else(|| Error::missing_column(ID_COLUMN))?;
            let id = Key::try_from(id_cell)?;

            let model = {
                let bucket = ctx
                    .models
                    .get_mut(self.model_key())
                    .ok_or_else(|| Error::config(format!("no model bucket for '{}'", self.name)))?;
                match bucket.get(&id) {
                    Some(existing) => existing.clone(),
                    None => {
                        let created = ctor(id.clone());
                        bucket.insert(id, created.clone());
                        created
                    }
                }
            };

            for name in &order.components {
                let component = self
                    .component(name)
                    .ok_or_else(|| Error::config(format!("invalid component [{}]", name)))?;
                let value = row
                    .get(name)
                    .ok_or_else(|| Error::missing_column(name.clone()))?
                    .clone();
                model.borrow_mut().set_value(component.carrier(), value)?;
            }

            for queue in &mut queues {
                queue.push(model.clone());
            }

            if parent.is_some() {
                let pid_cell = row
                    .get(PID_COLUMN)
                    .ok_or_else(|| Error::missing_column(PID_COLUMN))?;
                let pid = Key::try_from(pid_cell)?;
                payloads.entry(pid).or_default().push(model);
            }
        }

        for (name, child_order) in &order.children {
            let inventory = self.inventory(name).ok_or_else(|| {
                Error::config(format!(
                    "inventory item '{}' not defined on factory '{}'",
                    name, self.name
                ))
            })?;
            let child = inventory.factory().resolve()?;
            let link = ParentLink {
                factory: self,
                inventory,
                next: parent,
            };
            child.build_level(source, child_order, ctx, Some(&link))?;
        }

        for (processor, queue) in self.processors.iter().zip(&queues) {
            processor.run(queue)?;
        }

        if let Some(link) = parent {
            let carrier = link.inventory.carrier();
            if let Some(parent_bucket) = ctx.models.get(link.factory.model_key()) {
                for (pid, children) in payloads {
                    // Parent rows filtered out upstream leave orphan ids;
                    // those are skipped silently.
                    if let Some(parent_model) = parent_bucket.get(&pid) {
                        if link.inventory.is_single() {
                            parent_model
                                .borrow_mut()
                                .set_child(carrier, children[0].clone())?;
                        } else {
                            parent_model.borrow_mut().set_children(carrier, children)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.is_empty() {
            errors.push("missing name".to_string());
        }
        if self.table.is_empty() {
            errors.push("missing table".to_string());
        }
        for inventory in self.inventories.values() {
            inventory.validate(&mut errors);
        }
        errors
    }
}

/// Builder for [`Factory`]; `build` validates and yields a shared,
/// immutable factory.
pub struct FactoryBuilder {
    name: String,
    table: String,
    alias: Option<String>,
    primary_key: Option<String>,
    model: Option<ModelRef>,
    components: BTreeMap<String, Component>,
    inventories: BTreeMap<String, Inventory>,
    filters: Vec<String>,
    processors: Vec<Processor>,
}

impl FactoryBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn model(mut self, model: ModelRef) -> Self {
        self.model = Some(model);
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.components
            .insert(component.name().to_string(), component);
        self
    }

    pub fn components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        for component in components {
            self = self.component(component);
        }
        self
    }

    pub fn inventory(mut self, inventory: Inventory) -> Self {
        self.inventories
            .insert(inventory.name().to_string(), inventory);
        self
    }

    /// Raw filter predicate appended to this factory's WHERE clause with
    /// `AND`.
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    pub fn processor(mut self, processor: Processor) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn build(self) -> Result<Arc<Factory>> {
        let model = self
            .model
            .ok_or_else(|| Error::config(format!("factory '{}' -> missing model", self.name)))?;
        let factory = Factory {
            name: self.name,
            table: self.table,
            alias: self.alias,
            primary_key: self.primary_key,
            model,
            resolved: OnceCell::new(),
            components: self.components,
            inventories: self.inventories,
            filters: self.filters,
            processors: self.processors,
        };
        let errors = factory.validate();
        if !errors.is_empty() {
            return Err(Error::config(format!(
                "invalid factory '{}' -> {}",
                factory.name,
                errors.join(", ")
            )));
        }
        Ok(Arc::new(factory))
    }
}
