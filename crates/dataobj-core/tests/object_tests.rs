/// Node contract tests: construction, typed access, re-typing rules,
/// child access, structural mutation, copy/replace and equality.
use dataobj_core::{DataObject, DataObjectError, DataType, Handle};

/// `{"a":1,"b":"two","c":true}` built in insertion order.
fn abc() -> DataObject {
    let mut root = DataObject::with_type(DataType::Object);
    root.add_child(Handle::new(DataObject::keyed("a", 1))).unwrap();
    root.add_child(Handle::new(DataObject::keyed("b", "two"))).unwrap();
    root.add_child(Handle::new(DataObject::keyed("c", true))).unwrap();
    root
}

fn keys(node: &DataObject) -> Vec<String> {
    node.keys().map(str::to_string).collect()
}

// ============================================================================
// Construction and typed access
// ============================================================================

#[test]
fn new_node_is_uninitialized() {
    let node = DataObject::new();
    assert_eq!(node.kind(), DataType::Uninitialized);
    assert_eq!(node.key(), "");
    assert!(node.is_empty());
    assert!(!node.is_autosort());
    assert!(!node.is_overwritable());
}

#[test]
fn with_type_starts_scalars_at_zero() {
    assert_eq!(DataObject::with_type(DataType::Integer).as_int().unwrap(), 0);
    assert_eq!(DataObject::with_type(DataType::String).as_string().unwrap(), "");
    assert!(!DataObject::with_type(DataType::Bool).as_bool().unwrap());
}

#[test]
fn from_conversions_set_kind_and_value() {
    assert_eq!(DataObject::from(7i64).as_int().unwrap(), 7);
    assert_eq!(DataObject::from(-3i32).as_int().unwrap(), -3);
    assert_eq!(DataObject::from("hi").as_string().unwrap(), "hi");
    assert_eq!(DataObject::from(String::from("owned")).kind(), DataType::String);
    assert!(DataObject::from(true).as_bool().unwrap());
}

#[test]
fn keyed_sets_key() {
    let node = DataObject::keyed("name", "Alice");
    assert_eq!(node.key(), "name");
    assert_eq!(node.as_string().unwrap(), "Alice");
}

#[test]
fn as_int_on_string_is_type_mismatch() {
    let node = DataObject::keyed("s", "text");
    match node.as_int() {
        Err(DataObjectError::TypeMismatch { expected, node, .. }) => {
            assert_eq!(expected, "int");
            assert_eq!(node.key, "s");
            assert_eq!(node.kind, DataType::String);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn as_bool_on_null_is_type_mismatch() {
    let node = DataObject::with_type(DataType::Null);
    assert!(matches!(
        node.as_bool(),
        Err(DataObjectError::TypeMismatch { .. })
    ));
}

#[test]
fn as_string_mut_edits_in_place() {
    let mut node = DataObject::from("abc");
    node.as_string_mut().unwrap().push('d');
    assert_eq!(node.as_string().unwrap(), "abcd");
    match DataObject::from(1).as_string_mut() {
        Err(DataObjectError::TypeMismatch { op, node, .. }) => {
            assert_eq!(op, "DataObject::as_string_mut");
            assert_eq!(node.kind, DataType::Integer);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    let mut fresh = DataObject::with_type(DataType::String);
    fresh.as_string_mut().unwrap().push_str("new");
    assert_eq!(fresh.as_string().unwrap(), "new");
}

#[test]
fn as_string_anyway_never_fails() {
    assert_eq!(DataObject::from("x").as_string_anyway(), "x");
    assert_eq!(DataObject::from(-12).as_string_anyway(), "-12");
    assert_eq!(DataObject::from(true).as_string_anyway(), "true");
    assert_eq!(DataObject::with_type(DataType::Array).as_string_anyway(), "Array");
    assert_eq!(DataObject::with_type(DataType::Object).as_string_anyway(), "Object");
    assert_eq!(DataObject::with_type(DataType::Null).as_string_anyway(), "Null");
    assert_eq!(DataObject::new().as_string_anyway(), "Not initialized");
}

#[test]
fn error_message_carries_key_type_and_json() {
    let err = DataObject::keyed("n", 5).as_string().unwrap_err();
    let text = err.to_string();
    assert!(text.contains("DataObject::as_string"), "{text}");
    assert!(text.contains("key: 'n' type: 'int'"), "{text}");
    assert!(text.contains("\"n\" : 5"), "{text}");
}

// ============================================================================
// Re-typing and overwrite permission
// ============================================================================

#[test]
fn uninitialized_accepts_any_scalar() {
    let mut node = DataObject::new();
    node.set_int(5).unwrap();
    assert_eq!(node.kind(), DataType::Integer);
    assert_eq!(node.as_int().unwrap(), 5);
}

#[test]
fn same_kind_assignment_is_allowed() {
    let mut node = DataObject::from("a");
    node.set_string("b").unwrap();
    assert_eq!(node.as_string().unwrap(), "b");
}

#[test]
fn retype_without_overwrite_is_violation() {
    let mut node = DataObject::from(1);
    match node.set_string("x") {
        Err(DataObjectError::OverwriteViolation { reason, .. }) => {
            assert!(reason.contains("string"), "{reason}");
        }
        other => panic!("expected OverwriteViolation, got {other:?}"),
    }
    assert_eq!(node.as_int().unwrap(), 1);
}

#[test]
fn retype_with_overwrite_drops_children() {
    let mut node = abc();
    node.set_overwrite(true);
    node.set_bool(true).unwrap();
    assert_eq!(node.kind(), DataType::Bool);
    assert!(node.is_empty());
    assert!(!node.contains_key("a"));
    assert!(node.index_is_consistent());
}

#[test]
fn clear_resets_to_bare_kind() {
    let mut node = abc();
    node.set_key("root");
    node.set_autosort(true);
    node.clear(DataType::Array);
    assert_eq!(node.kind(), DataType::Array);
    assert_eq!(node.key(), "");
    assert!(node.is_empty());
    assert!(node.is_autosort());
}

// ============================================================================
// Child access
// ============================================================================

#[test]
fn at_and_at_key_agree() {
    let root = abc();
    assert_eq!(root.len(), 3);
    assert_eq!(root.at(1).unwrap().as_string().unwrap(), "two");
    assert_eq!(root.at_key("b").unwrap(), root.at(1).unwrap());
    assert!(root.contains_key("c"));
    assert!(!root.contains_key("z"));
}

#[test]
fn at_past_end_is_out_of_range() {
    let root = abc();
    match root.at(3) {
        Err(DataObjectError::OutOfRange { index, len, .. }) => {
            assert_eq!(index, 3);
            assert_eq!(len, 3);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn missing_key_is_key_not_found() {
    let root = abc();
    match root.at_key("zzz") {
        Err(DataObjectError::KeyNotFound { missing, .. }) => assert_eq!(missing, "zzz"),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[test]
fn last_child_of_empty_is_out_of_range() {
    let root = DataObject::with_type(DataType::Array);
    assert!(matches!(
        root.last_child(),
        Err(DataObjectError::OutOfRange { .. })
    ));
    assert_eq!(abc().last_child().unwrap().key(), "c");
}

#[test]
fn at_key_mut_edits_child() {
    let mut root = abc();
    root.at_key_mut("a").unwrap().set_int(100).unwrap();
    root.last_child_mut().unwrap().set_bool(false).unwrap();
    root.at_mut(1).unwrap().set_string("deux").unwrap();
    assert_eq!(root.as_json(false, false), r#"{"a":100,"b":"deux","c":false}"#);
}

#[test]
fn key_index_lists_keys_in_ascending_order() {
    let mut root = DataObject::with_type(DataType::Object);
    for key in ["zeta", "alpha", "mid"] {
        root.add_child(Handle::new(DataObject::keyed(key, 0))).unwrap();
    }
    let indexed: Vec<&str> = root.key_index().map(|(k, _)| k).collect();
    assert_eq!(indexed, ["alpha", "mid", "zeta"]);
    assert_eq!(keys(&root), ["zeta", "alpha", "mid"]);
}

// ============================================================================
// Attaching children
// ============================================================================

#[test]
fn add_child_promotes_uninitialized_to_object() {
    let mut root = DataObject::new();
    root.add_child(Handle::new(DataObject::keyed("k", 1))).unwrap();
    assert_eq!(root.kind(), DataType::Object);
}

#[test]
fn add_child_to_scalar_is_type_mismatch() {
    let mut node = DataObject::from(1);
    assert!(matches!(
        node.add_child(Handle::new(DataObject::keyed("k", 1))),
        Err(DataObjectError::TypeMismatch { .. })
    ));
}

#[test]
fn add_child_keyed_overrides_child_key() {
    let mut root = DataObject::new();
    root.add_child_keyed("renamed", Handle::new(DataObject::keyed("orig", 1)))
        .unwrap();
    assert_eq!(keys(&root), ["renamed"]);
    assert_eq!(root.at_key("renamed").unwrap().as_int().unwrap(), 1);
}

#[test]
fn add_child_with_empty_handle_fails() {
    let mut root = DataObject::new();
    assert!(matches!(
        root.add_child(Handle::empty()),
        Err(DataObjectError::EmptyHandle(_))
    ));
}

#[test]
fn duplicate_key_is_overwrite_violation() {
    let mut root = abc();
    match root.add_child(Handle::new(DataObject::keyed("b", 9))) {
        Err(DataObjectError::OverwriteViolation { reason, .. }) => {
            assert!(reason.contains("'b'"), "{reason}");
        }
        other => panic!("expected OverwriteViolation, got {other:?}"),
    }
    assert_eq!(root.len(), 3);
    assert_eq!(root.at_key("b").unwrap().as_string().unwrap(), "two");
}

#[test]
fn duplicate_key_with_overwrite_replaces_in_place() {
    let mut root = abc();
    root.set_overwrite(true);
    root.add_child(Handle::new(DataObject::keyed("b", 9))).unwrap();
    assert_eq!(keys(&root), ["a", "b", "c"]);
    assert_eq!(root.at(1).unwrap().as_int().unwrap(), 9);
    assert!(root.index_is_consistent());
}

#[test]
fn array_elements_append_in_order() {
    let mut arr = DataObject::new();
    for i in 0..4 {
        arr.add_array_element(Handle::new(DataObject::from(i))).unwrap();
    }
    assert_eq!(arr.kind(), DataType::Array);
    assert_eq!(arr.as_json(false, false), "[0,1,2,3]");
}

#[test]
fn add_array_element_to_object_is_type_mismatch() {
    let mut root = abc();
    assert!(matches!(
        root.add_array_element(Handle::new(DataObject::from(1))),
        Err(DataObjectError::TypeMismatch { .. })
    ));
}

#[test]
fn add_child_on_array_appends_keyed_element() {
    let mut arr = DataObject::with_type(DataType::Array);
    arr.add_child(Handle::new(DataObject::keyed("x", 1))).unwrap();
    arr.add_child(Handle::new(DataObject::keyed("x", 2))).unwrap();
    assert_eq!(arr.len(), 2);
    assert!(arr.index_is_consistent());
}

#[test]
fn entry_creates_uninitialized_slot_once() {
    let mut root = DataObject::new();
    assert_eq!(root.entry("slot").unwrap().kind(), DataType::Uninitialized);
    root.entry("slot").unwrap().set_int(3).unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(root.at_key("slot").unwrap().as_int().unwrap(), 3);
}

#[test]
fn entry_on_array_is_type_mismatch() {
    let mut arr = DataObject::with_type(DataType::Array);
    assert!(arr.entry("k").is_err());
}

// ============================================================================
// Removal, renaming and relocation
// ============================================================================

#[test]
fn remove_key_keeps_order_and_index() {
    let mut root = abc();
    root.remove_key("a").unwrap();
    assert_eq!(keys(&root), ["b", "c"]);
    assert!(root.at_key("c").unwrap().as_bool().unwrap());
    assert!(root.index_is_consistent());
}

#[test]
fn remove_absent_key_is_noop() {
    let mut root = abc();
    root.remove_key("nope").unwrap();
    assert_eq!(root.len(), 3);
}

#[test]
fn remove_key_on_array_is_type_mismatch() {
    let mut arr = DataObject::with_type(DataType::Array);
    assert!(matches!(
        arr.remove_key("a"),
        Err(DataObjectError::TypeMismatch { .. })
    ));
}

#[test]
fn rename_key_keeps_position() {
    let mut root = abc();
    root.rename_key("a", "z").unwrap();
    assert_eq!(keys(&root), ["z", "b", "c"]);
    assert!(!root.contains_key("a"));
    assert_eq!(root.at_key("z").unwrap().as_int().unwrap(), 1);
    assert!(root.index_is_consistent());
}

#[test]
fn rename_onto_existing_key_is_violation() {
    let mut root = abc();
    assert!(matches!(
        root.rename_key("a", "b"),
        Err(DataObjectError::OverwriteViolation { .. })
    ));
    assert_eq!(keys(&root), ["a", "b", "c"]);
}

#[test]
fn rename_key_renames_own_key() {
    let mut node = DataObject::keyed("old", 1);
    node.rename_key("old", "new").unwrap();
    assert_eq!(node.key(), "new");
}

#[test]
fn set_child_key_updates_index() {
    let mut root = abc();
    root.set_child_key(2, "see").unwrap();
    assert_eq!(keys(&root), ["a", "b", "see"]);
    assert!(root.contains_key("see"));
    assert!(root.index_is_consistent());
    assert!(matches!(
        root.set_child_key(9, "x"),
        Err(DataObjectError::OutOfRange { .. })
    ));
}

#[test]
fn set_key_pos_moves_child() {
    let mut root = abc();
    root.set_key_pos("c", 0).unwrap();
    assert_eq!(keys(&root), ["c", "a", "b"]);
    root.set_key_pos("c", 1).unwrap();
    assert_eq!(keys(&root), ["a", "c", "b"]);
    assert!(root.index_is_consistent());
}

#[test]
fn set_key_pos_past_end_moves_to_end() {
    let mut root = abc();
    root.set_key_pos("a", 10).unwrap();
    assert_eq!(keys(&root), ["b", "c", "a"]);
    assert_eq!(root.at_key("a").unwrap().as_int().unwrap(), 1);
}

#[test]
fn set_key_pos_on_missing_key_is_key_not_found() {
    let mut root = abc();
    assert!(matches!(
        root.set_key_pos("zz", 0),
        Err(DataObjectError::KeyNotFound { .. })
    ));
}

// ============================================================================
// Re-keying through child borrows
// ============================================================================

#[test]
fn copy_from_through_entry_moves_index_entry() {
    let mut root = DataObject::new();
    root.entry("a")
        .unwrap()
        .copy_from(&DataObject::keyed("b", 1))
        .unwrap();
    assert!(root.index_is_consistent());
    assert_eq!(keys(&root), ["b"]);
    assert!(!root.contains_key("a"));
    assert_eq!(root.at_key("b").unwrap().as_int().unwrap(), 1);
}

#[test]
fn clear_through_at_key_mut_drops_index_entry() {
    let mut root = abc();
    root.at_key_mut("b").unwrap().clear(DataType::Null);
    assert!(root.index_is_consistent());
    assert_eq!(root.len(), 3);
    assert!(!root.contains_key("b"));
    assert_eq!(root.at(1).unwrap().kind(), DataType::Null);
    assert_eq!(root.at(1).unwrap().key(), "");
}

#[test]
fn replace_through_at_mut_takes_source_key() {
    let mut root = abc();
    root.at_mut(0).unwrap().replace(&DataObject::keyed("z", 26));
    assert!(root.index_is_consistent());
    assert_eq!(keys(&root), ["z", "b", "c"]);
    assert_eq!(root.at_key("z").unwrap().as_int().unwrap(), 26);
}

#[test]
fn set_key_through_last_child_mut_renames_slot() {
    let mut root = abc();
    root.last_child_mut().unwrap().set_key("d");
    assert!(root.index_is_consistent());
    assert_eq!(keys(&root), ["a", "b", "d"]);
    assert!(root.at_key("d").unwrap().as_bool().unwrap());
}

#[test]
fn rekeying_onto_sibling_key_restores_previous_key() {
    let mut root = abc();
    root.at_key_mut("c").unwrap().set_key("a");
    root.at_mut(1)
        .unwrap()
        .copy_from(&DataObject::keyed("a", 0))
        .unwrap();
    assert!(root.index_is_consistent());
    assert_eq!(keys(&root), ["a", "b", "c"]);
    assert_eq!(root.at_key("a").unwrap().as_int().unwrap(), 1);
    assert_eq!(root.at_key("b").unwrap().as_int().unwrap(), 0);
}

#[test]
fn anonymous_child_gains_index_entry_when_keyed() {
    let mut root = DataObject::with_type(DataType::Object);
    root.add_child(Handle::new(DataObject::from(5))).unwrap();
    assert!(!root.contains_key("five"));
    root.at_mut(0).unwrap().set_key("five");
    assert!(root.index_is_consistent());
    assert_eq!(root.at_key("five").unwrap().as_int().unwrap(), 5);
}

#[test]
fn rekeying_guard_returned_by_add_child() {
    let mut root = abc();
    {
        let mut added = root
            .add_child(Handle::new(DataObject::keyed("d", 4)))
            .unwrap();
        assert_eq!(added.position(), 3);
        added.set_key("e");
    }
    assert!(root.index_is_consistent());
    assert_eq!(keys(&root), ["a", "b", "c", "e"]);
}

#[test]
fn rekeying_nested_child_keeps_every_level_consistent() {
    let mut root = DataObject::new();
    root.entry("outer")
        .unwrap()
        .entry("inner")
        .unwrap()
        .set_key("renamed");
    assert!(root.index_is_consistent());
    assert!(root.at_key("outer").unwrap().contains_key("renamed"));
}

#[test]
fn rekeying_array_element_leaves_array_alone() {
    let mut arr = DataObject::with_type(DataType::Array);
    arr.add_array_element(Handle::new(DataObject::from(1))).unwrap();
    arr.at_mut(0).unwrap().set_key("k");
    assert!(arr.index_is_consistent());
    assert_eq!(arr.at(0).unwrap().key(), "k");
}

// ============================================================================
// Copy, replace, equality
// ============================================================================

#[test]
fn copy_is_independent() {
    let original = abc();
    let mut copy = original.copy();
    assert_eq!(copy, original);
    copy.at_key_mut("a").unwrap().set_int(42).unwrap();
    assert_eq!(original.at_key("a").unwrap().as_int().unwrap(), 1);
    assert_ne!(copy, original);
}

#[test]
fn clone_shares_but_writes_do_not_leak() {
    let original = abc();
    let mut shallow = original.clone();
    shallow.at_key_mut("b").unwrap().set_string("changed").unwrap();
    assert_eq!(original.at_key("b").unwrap().as_string().unwrap(), "two");
}

#[test]
fn copy_drops_overwrite_and_keeps_autosort() {
    let mut node = abc();
    node.set_overwrite(true);
    node.set_autosort(true);
    let copy = node.copy();
    assert!(!copy.is_overwritable());
    assert!(copy.is_autosort());
}

#[test]
fn copy_from_keeps_own_key_when_source_has_none() {
    let mut target = DataObject::keyed("mine", 0);
    target.copy_from(&abc()).unwrap();
    assert_eq!(target.key(), "mine");
    assert_eq!(target.kind(), DataType::Object);
    assert_eq!(target.as_json(false, true), r#"{"a":1,"b":"two","c":true}"#);
}

#[test]
fn copy_from_into_sorted_target_orders_children() {
    let mut source = DataObject::new();
    for key in ["b", "c", "a"] {
        source.add_child(Handle::new(DataObject::keyed(key, 0))).unwrap();
    }
    let mut target = DataObject::new();
    target.set_autosort(true);
    target.copy_from(&source).unwrap();
    assert_eq!(keys(&target), ["a", "b", "c"]);
}

#[test]
fn replace_substitutes_content() {
    let mut node = DataObject::from(1);
    node.replace(&abc());
    assert_eq!(node, abc());
}

#[test]
fn equality_ignores_flags_but_not_keys() {
    let mut sorted = abc();
    sorted.set_autosort(true);
    assert_eq!(sorted, abc());

    let mut renamed = abc();
    renamed.rename_key("a", "x").unwrap();
    assert_ne!(renamed, abc());
}

#[test]
fn equality_is_order_sensitive() {
    let mut moved = abc();
    moved.set_key_pos("a", 2).unwrap();
    assert_ne!(moved, abc());
}

#[test]
fn null_and_uninitialized_differ() {
    assert_ne!(DataObject::with_type(DataType::Null), DataObject::new());
}

#[test]
fn display_is_pretty_json() {
    let node = abc();
    assert_eq!(
        node.to_string(),
        "{\n    \"a\" : 1,\n    \"b\" : \"two\",\n    \"c\" : true\n}"
    );
}
