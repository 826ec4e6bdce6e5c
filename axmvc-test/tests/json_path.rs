use axmvc_test::resolve_path;
use serde_json::{json, Value};

#[test]
fn test_resolve_simple_field() {
    let v = json!({"name": "Alice"});
    assert_eq!(resolve_path(&v, "name"), json!("Alice"));
}

#[test]
fn test_resolve_nested_field() {
    let v = json!({"user": {"name": "Bob"}});
    assert_eq!(resolve_path(&v, "user.name"), json!("Bob"));
}

#[test]
fn test_resolve_array_index() {
    let v = json!({"ids": [3, null, 5]});
    assert_eq!(resolve_path(&v, "ids[0]"), json!(3));
    assert_eq!(resolve_path(&v, "ids[1]"), Value::Null);
    assert_eq!(resolve_path(&v, "ids[2]"), json!(5));
}

#[test]
fn test_resolve_root_index() {
    let v = json!([{"id": 1}, {"id": 2}]);
    assert_eq!(resolve_path(&v, "[1].id"), json!(2));
}

#[test]
fn test_resolve_len() {
    let v = json!({"items": [1, 2, 3], "meta": {"a": 1}});
    assert_eq!(resolve_path(&v, "items.len()"), json!(3));
    assert_eq!(resolve_path(&v, "meta.len()"), json!(1));
}

#[test]
fn test_resolve_missing_field() {
    let v = json!({"name": "Alice"});
    assert_eq!(resolve_path(&v, "missing"), Value::Null);
    assert_eq!(resolve_path(&v, "missing.deeper[0]"), Value::Null);
}

#[test]
fn test_resolve_keys_with_slashes() {
    let v = json!({"a/b": {"~x": 1}});
    assert_eq!(resolve_path(&v, "a/b.~x"), json!(1));
}
