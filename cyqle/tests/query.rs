//! Compiled SQL shape tests.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cyqle::{
    Component, Error, Factory, Key, Model, ModelHandle, ModelRef, Result as CyqleResult, Value,
};

/// Collapse whitespace the way downstream consumers compare query text:
/// semantically equal queries must match after normalization.
fn format_query(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" ,", ",").replace(", ", ",")
}

#[derive(Debug, Default)]
struct Bicycle;

impl Model for Bicycle {
    fn set_value(&mut self, _carrier: &str, _value: Value) -> CyqleResult<()> {
        Ok(())
    }

    fn set_child(&mut self, _carrier: &str, _child: ModelHandle) -> CyqleResult<()> {
        Ok(())
    }

    fn set_children(&mut self, _carrier: &str, _children: Vec<ModelHandle>) -> CyqleResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn bicycle_model(_id: Key) -> ModelHandle {
    Rc::new(RefCell::new(Bicycle))
}

const BICYCLE_MODEL: ModelRef = ModelRef::Ctor {
    key: "Bicycle",
    ctor: bicycle_model,
};

fn bicycle_factory() -> Arc<Factory> {
    Factory::builder("bicycle-factory", "bicycle")
        .primary_key("id")
        .model(BICYCLE_MODEL)
        .component(Component::new("tire", "tire", "set_tire"))
        .component(Component::new("seat", "seat", "set_seat"))
        .component(Component::new("pedal", "pedal", "set_pedal"))
        .build()
        .unwrap()
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn unfiltered_root_query_shape() {
    let factory = bicycle_factory();
    let query = factory.query(&names(&["tire"]), &Vec::new()).unwrap();
    assert_eq!(
        format_query(&query),
        format_query(
            r#"
            SELECT bicycle.id AS "__id__"
            ,   bicycle.tire AS tire
            FROM bicycle
            WHERE 1=1
            "#
        )
    );
}

#[test]
fn filtered_root_query_shape() {
    let factory = bicycle_factory();
    let binds = Factory::binds(Some(&[Key::from(42)]));
    let query = factory.query(&names(&["seat", "pedal"]), &binds).unwrap();
    assert_eq!(
        format_query(&query),
        format_query(
            r#"
            SELECT bicycle.id AS "__id__"
            ,   bicycle.seat AS seat
            ,   bicycle.pedal AS pedal
            FROM bicycle
            WHERE bicycle.id IN (:id0)
            "#
        )
    );
}

#[test]
fn multiple_ids_bind_in_order() {
    let factory = bicycle_factory();
    let binds = Factory::binds(Some(&[Key::from(1), Key::from(2), Key::from(3)]));
    let query = factory.query(&names(&["tire"]), &binds).unwrap();
    assert!(format_query(&query).ends_with("WHERE bicycle.id IN (:id0,:id1,:id2)"));
}

#[test]
fn raw_filter_predicates_append_after_where() {
    let factory = Factory::builder("bicycle-factory", "bicycle")
        .primary_key("id")
        .model(BICYCLE_MODEL)
        .component(Component::new("tire", "tire", "set_tire"))
        .filter("bicycle.tire LIKE 'michelin'")
        .build()
        .unwrap();
    let query = factory.query(&names(&["tire"]), &Vec::new()).unwrap();
    assert_eq!(
        format_query(&query),
        format_query(
            r#"
            SELECT bicycle.id AS "__id__"
            ,   bicycle.tire AS tire
            FROM bicycle
            WHERE 1=1
            AND bicycle.tire LIKE 'michelin'
            "#
        )
    );
}

#[test]
fn declared_alias_prefixes_every_column() {
    let factory = Factory::builder("bicycle-factory", "bicycle")
        .alias("b")
        .primary_key("id")
        .model(BICYCLE_MODEL)
        .component(Component::new("tire", "tire", "set_tire"))
        .build()
        .unwrap();
    let binds = Factory::binds(Some(&[Key::from(7)]));
    let query = factory.query(&names(&["tire"]), &binds).unwrap();
    assert_eq!(
        format_query(&query),
        format_query(
            r#"
            SELECT b.id AS "__id__"
            ,   b.tire AS tire
            FROM bicycle b
            WHERE b.id IN (:id0)
            "#
        )
    );
}

#[test]
fn missing_primary_key_falls_back_to_row_identity() {
    let factory = Factory::builder("bicycle-factory", "bicycle")
        .model(BICYCLE_MODEL)
        .component(Component::new("tire", "tire", "set_tire"))
        .build()
        .unwrap();
    let binds = Factory::binds(Some(&[Key::from("AAB")]));
    let query = factory.query(&names(&["tire"]), &binds).unwrap();
    assert_eq!(
        format_query(&query),
        format_query(
            r#"
            SELECT ROWIDTOCHAR(bicycle.ROWID) AS "__id__"
            ,   bicycle.tire AS tire
            FROM bicycle
            WHERE bicycle.ROWID IN (:id0)
            "#
        )
    );
}

#[test]
fn unknown_component_is_a_configuration_error() {
    let factory = bicycle_factory();
    let err = factory
        .query(&names(&["handlebar"]), &Vec::new())
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }), "got {:?}", err);
}
