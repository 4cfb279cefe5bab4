use frond_core::{Key, Value, leaves, register_node, register_node_with_keys, register_static};
use frond_path::{child_keys, flatten_with_paths, key_paths, key_paths_with, tree_map_with_path};

fn int(value: i64) -> Value {
    Value::new(value)
}

fn get(value: &Value) -> i64 {
    *value.downcast_ref::<i64>().expect("i64 leaf")
}

fn rendered(tree: &Value) -> Vec<(String, i64)> {
    key_paths(tree)
        .iter()
        .map(|(path, leaf)| (path.to_string(), get(leaf)))
        .collect()
}

#[test]
fn builtin_containers_use_their_natural_keys() {
    frond_testhelpers::setup();

    let tree = Value::list([
        Value::map([("lr", int(1))]),
        Value::tuple([int(2), int(3)]),
        Value::record("Point", [("x", int(4)), ("y", int(5))]),
    ]);

    assert_eq!(
        rendered(&tree),
        [
            (String::from("[0][\"lr\"]"), 1),
            (String::from("[1][0]"), 2),
            (String::from("[1][1]"), 3),
            (String::from("[2].x"), 4),
            (String::from("[2].y"), 5),
        ],
    );
}

#[test]
fn paths_line_up_with_flatten_order() {
    frond_testhelpers::setup();

    let tree = Value::map([
        ("b", Value::list([int(1), int(2)])),
        ("a", int(3)),
    ]);

    let paths = key_paths(&tree);
    let flat = leaves(&tree);
    assert_eq!(paths.len(), flat.len());
    for ((_, keyed_leaf), leaf) in paths.iter().zip(&flat) {
        assert!(keyed_leaf.ptr_eq(leaf));
    }
}

#[test]
fn the_root_leaf_has_an_empty_path() {
    frond_testhelpers::setup();

    let paths = key_paths(&int(7));
    assert_eq!(paths.len(), 1);
    assert!(paths[0].0.is_empty());
    assert_eq!(get(&paths[0].1), 7);
}

#[test]
fn keyed_registrations_supply_their_own_keys() {
    frond_testhelpers::setup();

    struct Layer {
        weights: Value,
        bias: Value,
    }

    register_node_with_keys::<Layer, ()>(
        |layer| {
            (
                vec![
                    (Key::attr("weights"), layer.weights.clone()),
                    (Key::attr("bias"), layer.bias.clone()),
                ],
                (),
            )
        },
        |_, mut children| {
            let bias = children.pop().unwrap();
            let weights = children.pop().unwrap();
            Layer { weights, bias }
        },
    );

    let tree = Value::new(Layer {
        weights: Value::list([int(1), int(2)]),
        bias: int(3),
    });
    assert_eq!(
        rendered(&tree),
        [
            (String::from(".weights[0]"), 1),
            (String::from(".weights[1]"), 2),
            (String::from(".bias"), 3),
        ],
    );

    assert_eq!(
        child_keys(&tree),
        Some(vec![Key::attr("weights"), Key::attr("bias")]),
    );
}

#[test]
fn keyless_registrations_fall_back_to_flat_indices() {
    frond_testhelpers::setup();

    struct Pair(Value, Value);

    register_node::<Pair, ()>(
        |pair| (vec![pair.0.clone(), pair.1.clone()], ()),
        |_, mut children| {
            let second = children.pop().unwrap();
            let first = children.pop().unwrap();
            Pair(first, second)
        },
    );

    let tree = Value::new(Pair(int(1), int(2)));
    assert_eq!(
        rendered(&tree),
        [
            (String::from("[<flat index 0>]"), 1),
            (String::from("[<flat index 1>]"), 2),
        ],
    );

    assert_eq!(child_keys(&tree), Some(vec![Key::Flat(0), Key::Flat(1)]));
}

#[test]
fn static_values_contribute_no_paths() {
    frond_testhelpers::setup();

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Marker(u8);

    register_static::<Marker>();

    let tree = Value::list([int(1), Value::new(Marker(0))]);
    assert_eq!(rendered(&tree), [(String::from("[0]"), 1)]);
    assert_eq!(child_keys(&Value::new(Marker(0))), Some(Vec::new()));
}

#[test]
fn child_keys_is_none_for_leaves() {
    frond_testhelpers::setup();

    assert_eq!(child_keys(&int(1)), None);
    assert_eq!(
        child_keys(&Value::list([int(1), int(2)])),
        Some(vec![Key::Seq(0), Key::Seq(1)]),
    );
}

#[test]
fn predicate_leaves_keep_their_path() {
    frond_testhelpers::setup();

    let tree = Value::list([Value::list([int(1), int(2)]), int(3)]);
    let paths = key_paths_with(&tree, |value| {
        value.is::<Vec<Value>>() && !value.ptr_eq(&tree)
    });

    let display: Vec<String> = paths.iter().map(|(path, _)| path.to_string()).collect();
    assert_eq!(display, ["[0]", "[1]"]);
    assert!(paths[0].1.is::<Vec<Value>>());
}

#[test]
fn map_with_path_sees_the_address_of_each_leaf() {
    frond_testhelpers::setup();

    let tree = Value::map([("a", Value::list([int(1), int(2)]))]);
    let mapped = tree_map_with_path(
        |path, leaf| {
            if path.to_string().ends_with("[1]") {
                int(get(leaf) * 100)
            } else {
                leaf.clone()
            }
        },
        &tree,
    )
    .unwrap();

    let flat: Vec<i64> = leaves(&mapped).iter().map(get).collect();
    assert_eq!(flat, [1, 200]);
}

#[test]
fn flatten_with_paths_returns_the_same_structure() {
    frond_testhelpers::setup();

    let tree = Value::tuple([int(1), Value::list([int(2)])]);
    let (pairs, def) = flatten_with_paths(&tree);
    assert_eq!(def, frond_core::structure(&tree));
    assert_eq!(pairs.len(), def.num_leaves());
    assert!(def.unflatten(pairs.into_iter().map(|(_, leaf)| leaf)).is_ok());
}
