use frond_core::{Record, TreeError, Value, flatten, leaves, structure, unflatten};

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
fn nested_tree_round_trips() {
    frond_testhelpers::setup();

    let tree = Value::list([
        int(1),
        Value::tuple([int(2), int(3)]),
        Value::map([("b", int(5)), ("a", int(4))]),
    ]);

    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [1, 2, 3, 4, 5]);
    assert_eq!(def.num_leaves(), 5);

    let rebuilt = def.unflatten(flat).unwrap();
    let (again, def_again) = flatten(&rebuilt);
    assert_eq!(ints(&again), [1, 2, 3, 4, 5]);
    assert_eq!(def, def_again);
}

#[test]
fn records_round_trip_with_their_shape() {
    frond_testhelpers::setup();

    let tree = Value::record("Point", [("x", int(1)), ("y", int(2))]);
    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [1, 2]);

    let rebuilt = def.unflatten([int(10), int(20)]).unwrap();
    let point = rebuilt.downcast_ref::<Record>().unwrap();
    assert_eq!(point.name(), "Point");
    assert_eq!(point.fields(), ["x", "y"]);
    assert_eq!(point.get("x").and_then(|v| v.downcast_ref::<i64>()), Some(&10));
    assert_eq!(point.get("y").and_then(|v| v.downcast_ref::<i64>()), Some(&20));
}

#[test]
fn flattening_is_deterministic() {
    frond_testhelpers::setup();

    let tree = Value::map([
        ("gamma", Value::list([int(1), int(2)])),
        ("alpha", int(3)),
        ("beta", Value::tuple([int(4)])),
    ]);

    let (first_leaves, first_def) = flatten(&tree);
    let (second_leaves, second_def) = flatten(&tree);
    assert_eq!(ints(&first_leaves), ints(&second_leaves));
    assert_eq!(first_def, second_def);
}

#[test]
fn a_lone_value_is_its_own_tree() {
    frond_testhelpers::setup();

    let (flat, def) = flatten(&int(7));
    assert_eq!(ints(&flat), [7]);
    assert!(def.is_leaf());
    assert!(def.is_strict_leaf());

    let rebuilt = unflatten(&def, flat).unwrap();
    assert_eq!(rebuilt.downcast_ref::<i64>(), Some(&7));
}

#[test]
fn empty_containers_have_no_leaves() {
    frond_testhelpers::setup();

    let tree = Value::list([Value::new(Vec::<Value>::new()), Value::tuple([int(1)])]);
    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&flat), [1]);
    assert_eq!(def.num_leaves(), 1);
    assert_eq!(def.to_string(), "TreeDef([[], (*,)])");

    let empty = structure(&Value::new(Vec::<Value>::new()));
    assert!(empty.is_leaf());
    assert!(!empty.is_strict_leaf());
    assert_eq!(empty.num_leaves(), 0);
}

#[test]
fn unflatten_rejects_wrong_leaf_counts() {
    frond_testhelpers::setup();

    let def = structure(&Value::list([int(1), int(2), int(3)]));
    let err = def.unflatten([int(9)]).unwrap_err();
    assert_eq!(err, TreeError::LeafCount { expected: 3, got: 1 });

    let err = def.unflatten([int(1), int(2), int(3), int(4)]).unwrap_err();
    assert_eq!(err, TreeError::LeafCount { expected: 3, got: 4 });
}

#[test]
fn unflatten_accepts_any_leaf_types() {
    frond_testhelpers::setup();

    let def = structure(&Value::list([int(1), int(2)]));
    let rebuilt = def
        .unflatten([Value::new(String::from("a")), int(2)])
        .unwrap();
    let flat = leaves(&rebuilt);
    assert_eq!(flat[0].downcast_ref::<String>().map(String::as_str), Some("a"));
    assert_eq!(flat[1].downcast_ref::<i64>(), Some(&2));
}

#[test]
fn leaves_and_structure_agree_with_flatten() {
    frond_testhelpers::setup();

    let tree = Value::tuple([int(1), Value::list([int(2), int(3)])]);
    let (flat, def) = flatten(&tree);
    assert_eq!(ints(&leaves(&tree)), ints(&flat));
    assert_eq!(structure(&tree), def);
}
