//! Default/override parameter merging and path lookup.
//!
//! The merged tree is built once at construction and never mutated. Overrides
//! win per leaf: a nested mapping in the overrides is merged key-wise into the
//! matching default mapping, so overriding one option keeps its siblings.

use serde_json::{Map, Value};

use crate::core::error::ConfigError;
use crate::core::key_path::KeyPath;

/// Immutable view over defaults merged with user overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    merged: Value,
}

impl ParameterStore {
    /// Merge `overrides` onto `defaults` and check that every `required` path
    /// resolves to a value.
    pub fn new(
        defaults: &Value,
        overrides: &Value,
        required: &[KeyPath],
    ) -> Result<Self, ConfigError> {
        if !overrides.is_object() {
            return Err(ConfigError::InvalidValue {
                path: KeyPath::root(),
                expected: "a mapping",
            });
        }
        let store = Self {
            merged: merge(defaults, overrides),
        };
        for path in required {
            store.get(path)?;
        }
        Ok(store)
    }

    /// Look up the merged value at `path`.
    pub fn get(&self, path: &KeyPath) -> Result<&Value, ConfigError> {
        let mut current = &self.merged;
        for key in path.keys() {
            current = current
                .as_object()
                .and_then(|map| map.get(key))
                .ok_or_else(|| ConfigError::MissingDefault { path: path.clone() })?;
        }
        Ok(current)
    }

    pub fn get_bool(&self, path: &KeyPath) -> Result<bool, ConfigError> {
        self.get(path)?
            .as_bool()
            .ok_or_else(|| ConfigError::InvalidValue {
                path: path.clone(),
                expected: "true or false",
            })
    }

    pub fn get_str(&self, path: &KeyPath) -> Result<&str, ConfigError> {
        self.get(path)?
            .as_str()
            .ok_or_else(|| ConfigError::InvalidValue {
                path: path.clone(),
                expected: "a string",
            })
    }

    /// Look up a string value where `null` or `""` means "not supplied".
    pub fn get_optional_str(&self, path: &KeyPath) -> Result<Option<&str>, ConfigError> {
        match self.get(path)? {
            Value::Null => Ok(None),
            Value::String(value) if value.trim().is_empty() => Ok(None),
            Value::String(value) => Ok(Some(value.as_str())),
            _ => Err(ConfigError::InvalidValue {
                path: path.clone(),
                expected: "a string or null",
            }),
        }
    }

    /// Merged parameters for `rule`; empty when the rule has no entry.
    pub fn rule_params(&self, rule: &str) -> Map<String, Value> {
        self.merged
            .get(rule)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    pub fn merged(&self) -> &Value {
        &self.merged
    }
}

/// Recursively merge `overrides` onto `defaults`.
///
/// Mappings merge key-wise; any other override value replaces the default.
/// Keys only present in `overrides` are appended after the default keys.
pub fn merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(base), Value::Object(top)) => {
            let mut merged = base.clone();
            for (key, value) in top {
                let next = match base.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, top) => top.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Value {
        json!({
            "metagenomes": "metagenomes.txt",
            "iqtree": {"threads": 5, "-m": "MFP", "run": false},
            "fasttree": {"run": true, "threads": 5},
            "grouped": {"outer": {"a": 1, "b": 2}, "c": 3},
        })
    }

    #[test]
    fn override_wins_over_default() {
        let store = ParameterStore::new(&defaults(), &json!({"iqtree": {"run": true}}), &[])
            .expect("store");
        assert!(store.get_bool(&KeyPath::from(["iqtree", "run"])).expect("run"));
    }

    #[test]
    fn partial_override_keeps_sibling_defaults() {
        let store = ParameterStore::new(&defaults(), &json!({"iqtree": {"-m": "LG+G4"}}), &[])
            .expect("store");
        assert_eq!(store.get_str(&KeyPath::from(["iqtree", "-m"])).expect("m"), "LG+G4");
        assert_eq!(
            store.get(&KeyPath::from(["iqtree", "threads"])).expect("threads"),
            &json!(5)
        );
        assert!(!store.get_bool(&KeyPath::from(["iqtree", "run"])).expect("run"));
    }

    #[test]
    fn deep_override_keeps_siblings_at_every_level() {
        let store = ParameterStore::new(
            &defaults(),
            &json!({"grouped": {"outer": {"b": 20}}}),
            &[],
        )
        .expect("store");
        assert_eq!(
            store.get(&KeyPath::from(["grouped", "outer"])).expect("outer"),
            &json!({"a": 1, "b": 20})
        );
        assert_eq!(
            store.get(&KeyPath::from(["grouped", "c"])).expect("c"),
            &json!(3)
        );
    }

    #[test]
    fn default_returned_when_no_override() {
        let store = ParameterStore::new(&defaults(), &json!({}), &[]).expect("store");
        assert_eq!(
            store.get_str(&KeyPath::from(["metagenomes"])).expect("metagenomes"),
            "metagenomes.txt"
        );
    }

    #[test]
    fn missing_path_fails_with_missing_default() {
        let store = ParameterStore::new(&defaults(), &json!({}), &[]).expect("store");
        let path = KeyPath::from(["iqtree", "--bootstrap"]);
        assert_eq!(
            store.get(&path),
            Err(ConfigError::MissingDefault { path: path.clone() })
        );
    }

    #[test]
    fn construction_fails_when_required_path_has_no_default() {
        let required = [KeyPath::from(["fasttree", "run"]), KeyPath::from(["mafft", "run"])];
        let err = ParameterStore::new(&defaults(), &json!({}), &required).expect_err("missing");
        assert_eq!(
            err,
            ConfigError::MissingDefault {
                path: KeyPath::from(["mafft", "run"])
            }
        );
    }

    #[test]
    fn override_can_supply_path_without_default() {
        let required = [KeyPath::from(["mafft", "run"])];
        let store = ParameterStore::new(&defaults(), &json!({"mafft": {"run": true}}), &required)
            .expect("store");
        assert!(store.get_bool(&required[0]).expect("run"));
    }

    #[test]
    fn non_mapping_overrides_are_rejected() {
        let err = ParameterStore::new(&defaults(), &json!(["iqtree"]), &[]).expect_err("array");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                path: KeyPath::root(),
                expected: "a mapping"
            }
        );
    }

    #[test]
    fn optional_str_treats_empty_and_null_as_absent() {
        let store = ParameterStore::new(
            &json!({"a": "x.txt", "b": "", "c": null, "d": 4}),
            &json!({}),
            &[],
        )
        .expect("store");
        assert_eq!(store.get_optional_str(&KeyPath::from(["a"])), Ok(Some("x.txt")));
        assert_eq!(store.get_optional_str(&KeyPath::from(["b"])), Ok(None));
        assert_eq!(store.get_optional_str(&KeyPath::from(["c"])), Ok(None));
        assert!(store.get_optional_str(&KeyPath::from(["d"])).is_err());
    }

    #[test]
    fn get_bool_rejects_non_boolean_leaf() {
        let store =
            ParameterStore::new(&defaults(), &json!({"fasttree": {"run": "yes"}}), &[])
                .expect("store");
        let path = KeyPath::from(["fasttree", "run"]);
        assert_eq!(
            store.get_bool(&path),
            Err(ConfigError::InvalidValue {
                path: path.clone(),
                expected: "true or false"
            })
        );
    }

    #[test]
    fn rule_params_returns_merged_mapping() {
        let store = ParameterStore::new(&defaults(), &json!({"iqtree": {"threads": 12}}), &[])
            .expect("store");
        let params = store.rule_params("iqtree");
        assert_eq!(params.get("threads"), Some(&json!(12)));
        assert_eq!(params.get("-m"), Some(&json!("MFP")));
        assert!(store.rule_params("align_muscle").is_empty());
    }

    #[test]
    fn merge_keeps_default_key_order_then_appends() {
        let merged = merge(&json!({"b": 1, "a": 2}), &json!({"c": 3, "b": 4}));
        let keys: Vec<&str> = merged
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
