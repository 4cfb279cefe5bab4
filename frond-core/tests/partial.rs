use frond_core::{Partial, PartialFn, Value, flatten, leaves, structure, tree_map};

fn int(value: i64) -> Value {
    Value::new(value)
}

fn get(value: &Value) -> i64 {
    *value.downcast_ref::<i64>().expect("i64 leaf")
}

fn sum(args: &[Value]) -> Value {
    int(args.iter().map(get).sum())
}

#[test]
fn bound_arguments_are_the_children() {
    frond_testhelpers::setup();

    let partial = Value::new(Partial::new(sum, [int(1), Value::list([int(2), int(3)])]));
    let (flat, def) = flatten(&partial);
    assert_eq!(flat.iter().map(get).collect::<Vec<_>>(), [1, 2, 3]);

    let rebuilt = def.unflatten(flat).unwrap();
    let partial = rebuilt.downcast_ref::<Partial>().unwrap();
    assert_eq!(partial.args().len(), 2);
}

#[test]
fn rebuilt_partials_still_call_the_function() {
    frond_testhelpers::setup();

    let tree = Value::new(Partial::new(sum, [int(1), int(2)]));
    let doubled = tree_map(|leaf| int(get(leaf) * 2), &tree);

    let partial = doubled.downcast_ref::<Partial>().unwrap();
    let result = partial.call(&[int(10)]);
    assert_eq!(get(&result), 16);
}

#[test]
fn the_function_is_structure_not_data() {
    frond_testhelpers::setup();

    let func = PartialFn::new(sum);
    let a = Value::new(Partial::from_fn(func.clone(), [int(1)]));
    let b = Value::new(Partial::from_fn(func, [int(2)]));

    // Same callable, same structure; the bound argument is just a leaf.
    assert_eq!(structure(&a), structure(&b));

    // A separate wrapping of the same function is a different callable.
    let c = Value::new(Partial::new(sum, [int(1)]));
    assert_ne!(structure(&a), structure(&c));
}

#[test]
fn nested_partials_flatten_depth_first() {
    frond_testhelpers::setup();

    let inner = Partial::new(sum, [int(2), int(3)]);
    let outer = Value::new(Partial::new(sum, [int(1), Value::new(inner)]));

    let flat = leaves(&outer);
    assert_eq!(flat.iter().map(get).collect::<Vec<_>>(), [1, 2, 3]);
}
