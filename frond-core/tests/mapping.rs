use std::collections::BTreeMap;

use indexmap::IndexMap;

use frond_core::{MapKey, Value, flatten, structure};

fn int(value: i64) -> Value {
    Value::new(value)
}

fn ints(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .map(|value| *value.downcast_ref::<i64>().expect("i64 leaf"))
        .collect()
}

#[test]
fn hash_map_flattens_in_sorted_key_order() {
    frond_testhelpers::setup();

    let tree = Value::map([("b", int(1)), ("a", int(2))]);
    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [2, 1]);
    insta::assert_snapshot!(def.to_string(), @r#"TreeDef({"a": *, "b": *})"#);
}

#[test]
fn insertion_order_does_not_leak_into_the_structure() {
    frond_testhelpers::setup();

    let forward = Value::map([("a", int(1)), ("b", int(2)), ("c", int(3))]);
    let backward = Value::map([("c", int(3)), ("b", int(2)), ("a", int(1))]);
    assert_eq!(structure(&forward), structure(&backward));
    assert_eq!(ints(&flatten(&forward).0), ints(&flatten(&backward).0));
}

#[test]
fn integer_keys_sort_numerically_and_before_strings() {
    frond_testhelpers::setup();

    let tree = Value::map([
        (MapKey::from("a"), int(1)),
        (MapKey::from(10i64), int(2)),
        (MapKey::from(2i64), int(3)),
    ]);
    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [3, 2, 1]);
    insta::assert_snapshot!(def.to_string(), @r#"TreeDef({2: *, 10: *, "a": *})"#);
}

#[test]
fn hash_map_round_trips() {
    frond_testhelpers::setup();

    let tree = Value::map([("lr", int(1)), ("step", int(2))]);
    let (flat, def) = flatten(&tree);
    let scaled = flat
        .iter()
        .map(|leaf| int(leaf.downcast_ref::<i64>().unwrap() * 10));
    let rebuilt = def.unflatten(scaled).unwrap();

    let map = rebuilt
        .downcast_ref::<std::collections::HashMap<MapKey, Value>>()
        .unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(
        map[&MapKey::from("lr")].downcast_ref::<i64>(),
        Some(&10),
    );
    assert_eq!(
        map[&MapKey::from("step")].downcast_ref::<i64>(),
        Some(&20),
    );
}

#[test]
fn btree_map_flattens_in_its_own_order() {
    frond_testhelpers::setup();

    let mut map = BTreeMap::new();
    map.insert(MapKey::from("b"), int(1));
    map.insert(MapKey::from("a"), int(2));
    let tree = Value::new(map);

    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [2, 1]);
    insta::assert_snapshot!(def.to_string(), @r#"TreeDef(BTreeMap({"a": *, "b": *}))"#);

    let rebuilt = def.unflatten(flat).unwrap();
    assert!(rebuilt.is::<BTreeMap<MapKey, Value>>());
}

#[test]
fn index_map_preserves_insertion_order() {
    frond_testhelpers::setup();

    let mut map = IndexMap::new();
    map.insert(MapKey::from("b"), int(1));
    map.insert(MapKey::from("a"), int(2));
    let tree = Value::new(map);

    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [1, 2]);
    insta::assert_snapshot!(def.to_string(), @r#"TreeDef(IndexMap({"b": *, "a": *}))"#);
}

#[test]
fn index_maps_with_different_orders_differ_structurally() {
    frond_testhelpers::setup();

    let mut forward = IndexMap::new();
    forward.insert(MapKey::from("a"), int(1));
    forward.insert(MapKey::from("b"), int(2));

    let mut backward = IndexMap::new();
    backward.insert(MapKey::from("b"), int(2));
    backward.insert(MapKey::from("a"), int(1));

    assert_ne!(structure(&Value::new(forward)), structure(&Value::new(backward)));
}

#[test]
fn hash_map_and_btree_map_are_different_node_types() {
    frond_testhelpers::setup();

    let hash = Value::map([("a", int(1))]);
    let mut btree = BTreeMap::new();
    btree.insert(MapKey::from("a"), int(1));

    assert_ne!(structure(&hash), structure(&Value::new(btree)));
}
