//! Deep-merge policy used to fold `$merge` chains and `$include` splices.

use serde_json::map::Entry;
use serde_json::{Map, Value};

/// Key identifying array elements across layers.
pub const IDENTITY_KEY: &str = "name";

/// Overlay `layer` onto `target`, updating `target` in place.
///
/// Behaviour:
/// - Objects merge recursively: shared keys recurse, new keys are appended
///   after the existing ones in the layer's order.
/// - Arrays merge by element identity: an object element carrying a `name`
///   merges into the first base element with the same `name`, keeping the
///   base position. Other layer elements are appended in order, and base
///   elements without a counterpart are kept.
/// - A `null` layer never erases an existing value.
/// - Any other combination replaces `target` wholesale.
///
/// # Examples
///
/// ```rust
/// use boot_config::compose::merge_value;
/// use serde_json::json;
///
/// let mut base = json!([{"name": "x", "p": 1}, {"name": "y", "p": 2}]);
/// merge_value(&mut base, json!([{"name": "x", "p": 9}, {"name": "z", "p": 3}]));
/// assert_eq!(
///     base,
///     json!([{"name": "x", "p": 9}, {"name": "y", "p": 2}, {"name": "z", "p": 3}])
/// );
/// ```
pub fn merge_value(target: &mut Value, layer: Value) {
    match layer {
        Value::Null if !target.is_null() => {}
        Value::Object(map) => merge_object(target, map),
        Value::Array(items) => merge_array(target, items),
        _ => *target = layer,
    }
}

fn merge_object(target: &mut Value, map: Map<String, Value>) {
    let Value::Object(target_map) = target else {
        *target = Value::Object(map);
        return;
    };
    for (key, value) in map {
        merge_member(target_map, key, value);
    }
}

/// Merges `value` into the member `key` of `map`, appending it when new.
pub(super) fn merge_member(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.entry(key) {
        Entry::Occupied(mut existing) => merge_value(existing.get_mut(), value),
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
    }
}

fn merge_array(target: &mut Value, items: Vec<Value>) {
    let Value::Array(base) = target else {
        *target = Value::Array(items);
        return;
    };
    let base_len = base.len();
    for item in items {
        let position = identity(&item).and_then(|name| {
            base.iter()
                .take(base_len)
                .position(|candidate| identity(candidate) == Some(name))
        });
        match position.and_then(|index| base.get_mut(index)) {
            Some(existing) => merge_value(existing, item),
            None => base.push(item),
        }
    }
}

/// The `name` of an object element, used to match array elements.
pub(super) fn identity(value: &Value) -> Option<&Value> {
    value.as_object().and_then(|map| map.get(IDENTITY_KEY))
}

#[cfg(test)]
mod tests {
    use super::merge_value;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case::array_by_name(
        json!([{"name": "x", "p": 1}, {"name": "y", "p": 2}]),
        json!([{"name": "x", "p": 9}, {"name": "z", "p": 3}]),
        json!([{"name": "x", "p": 9}, {"name": "y", "p": 2}, {"name": "z", "p": 3}])
    )]
    #[case::nested_properties_extend(
        json!([{"name": "shell", "factory": "f", "properties": {"a": 1}}]),
        json!([{"name": "shell", "properties": {"port": "8011"}}]),
        json!([{"name": "shell", "factory": "f", "properties": {"a": 1, "port": "8011"}}])
    )]
    #[case::unnamed_elements_append(
        json!([1, {"k": 1}]),
        json!([1, {"k": 1}]),
        json!([1, {"k": 1}, 1, {"k": 1}])
    )]
    #[case::objects_union(
        json!({"a": 1, "b": {"x": 1}}),
        json!({"b": {"y": 2}, "c": 3}),
        json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3})
    )]
    #[case::scalar_overrides(json!({"a": {"x": 1}}), json!({"a": 5}), json!({"a": 5}))]
    #[case::object_replaces_scalar(json!({"a": 5}), json!({"a": {"x": 1}}), json!({"a": {"x": 1}}))]
    #[case::null_keeps_base(json!({"a": 1}), json!({"a": null}), json!({"a": 1}))]
    #[case::null_adds_missing_key(json!({"a": 1}), json!({"b": null}), json!({"a": 1, "b": null}))]
    #[case::array_replaces_object(json!({"a": {"x": 1}}), json!({"a": [1]}), json!({"a": [1]}))]
    fn applies_merge_policy(#[case] base: Value, #[case] layer: Value, #[case] expected: Value) {
        let mut target = base;
        merge_value(&mut target, layer);
        assert_eq!(target, expected);
    }

    #[test]
    fn new_keys_follow_existing_order() {
        let mut target = json!({"b": 1, "a": 1});
        merge_value(&mut target, json!({"c": 1, "a": 2}));
        let keys: Vec<&str> = target
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn duplicate_overlay_names_fold_into_one_base_entry() {
        let mut target = json!([{"name": "x", "p": 1}]);
        merge_value(
            &mut target,
            json!([{"name": "x", "q": 2}, {"name": "x", "r": 3}]),
        );
        assert_eq!(target, json!([{"name": "x", "p": 1, "q": 2, "r": 3}]));
    }
}
