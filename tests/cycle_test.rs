/*!
 * Cycle Detection Tests
 * Self-referential graphs terminate with back-reference markers
 */

use jetjson::{json_record, to_string, to_string_with, Features, SerializeError};
use std::sync::{Arc, OnceLock};

struct TreeNode {
    name: String,
    next: OnceLock<Arc<TreeNode>>,
}
json_record!(TreeNode { name, next });

#[test]
fn test_self_cycle_emits_root_reference() {
    let node = Arc::new(TreeNode {
        name: String::from("loop"),
        next: OnceLock::new(),
    });
    node.next.set(Arc::clone(&node)).ok().unwrap();

    let json = to_string(&node).unwrap();
    assert_eq!(json, "{\"name\":\"loop\",\"next\":{\"$ref\":\"$\"}}");
}

#[test]
fn test_two_node_cycle_references_ancestor() {
    let a = Arc::new(TreeNode {
        name: String::from("a"),
        next: OnceLock::new(),
    });
    let b = Arc::new(TreeNode {
        name: String::from("b"),
        next: OnceLock::new(),
    });
    a.next.set(Arc::clone(&b)).ok().unwrap();
    b.next.set(Arc::clone(&a)).ok().unwrap();

    let json = to_string(&a).unwrap();
    assert_eq!(
        json,
        "{\"name\":\"a\",\"next\":{\"name\":\"b\",\"next\":{\"$ref\":\"$\"}}}"
    );
}

#[test]
fn test_shared_but_acyclic_value_serialized_twice() {
    struct Pair {
        left: Arc<String>,
        right: Arc<String>,
    }
    json_record!(Pair { left, right });

    // the same allocation twice as siblings is sharing, not a cycle:
    // the first occurrence is popped before the second is visited
    let shared = Arc::new(String::from("same"));
    let pair = Pair {
        left: Arc::clone(&shared),
        right: shared,
    };
    assert_eq!(
        to_string(&pair).unwrap(),
        "{\"left\":\"same\",\"right\":\"same\"}"
    );
}

#[test]
fn test_cycle_inside_list_path() {
    struct Registry {
        entries: Vec<Arc<TreeNode>>,
    }
    json_record!(Registry { entries });

    let node = Arc::new(TreeNode {
        name: String::from("n"),
        next: OnceLock::new(),
    });
    node.next.set(Arc::clone(&node)).ok().unwrap();

    let registry = Registry {
        entries: vec![Arc::clone(&node)],
    };
    let json = to_string(&registry).unwrap();
    assert_eq!(
        json,
        "{\"entries\":[{\"name\":\"n\",\"next\":{\"$ref\":\"$.entries[0]\"}}]}"
    );
}

#[test]
fn test_deep_acyclic_nesting_hits_depth_ceiling() {
    // 600 levels of nested vectors, no cycle anywhere
    let mut value: Box<dyn jetjson::Node> = Box::new(vec![1i64]);
    for _ in 0..600 {
        value = Box::new(vec![value]);
    }
    let err = to_string(&*value).unwrap_err();
    assert!(matches!(err, SerializeError::DepthExceeded { .. }));
}

#[test]
fn test_depth_ceiling_configurable() {
    let mut value: Box<dyn jetjson::Node> = Box::new(vec![1i64]);
    for _ in 0..20 {
        value = Box::new(vec![value]);
    }
    let mut w = jetjson::JsonWriter::new().with_max_depth(10);
    assert!(matches!(
        w.write_value(&*value),
        Err(SerializeError::DepthExceeded { limit: 10 })
    ));

    let mut w = jetjson::JsonWriter::new().with_max_depth(64);
    assert!(w.write_value(&*value).is_ok());
}

#[test]
fn test_context_unwinds_after_error() {
    let mut value: Box<dyn jetjson::Node> = Box::new(vec![1i64]);
    for _ in 0..20 {
        value = Box::new(vec![value]);
    }
    let mut w = jetjson::JsonWriter::new().with_max_depth(10);
    assert!(w.write_value(&*value).is_err());
    // every frame was popped on the error path
    assert_eq!(w.context().depth(), 0);
}

#[test]
fn test_disable_detection_skips_bookkeeping_for_acyclic_input() {
    let f = Features::default() | Features::DISABLE_CYCLE_DETECTION;
    let value = vec![vec![1i64, 2], vec![3]];
    assert_eq!(to_string_with(&value, f).unwrap(), "[[1,2],[3]]");
}
