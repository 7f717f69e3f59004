//! Structural schema matching over dynamic JSON values.
//!
//! The schema document describes the required shape of a target document:
//! objects match as subsets (extra target keys are ignored), arrays match
//! existentially and order-independently, and scalar leaves must be equal.
//! String leaves in the schema may instead carry a directive: `"=name"`
//! captures the target value under `name`, and `"==name"` asserts the target
//! value equals a previously captured one.
//!
//! Directives are resolved over two sequential passes sharing one variable
//! table: an Assign pass that records captures (back-references are no-ops),
//! then a Verify pass that enforces back-references (captures are no-ops).
//! The split lets a back-reference appear before its capture in document
//! order or in a sibling branch.
use crate::error::{Kind, MatchError};
use crate::path::ValuePath;
use serde_json::Value;
use std::collections::BTreeMap;

/// Captured variables, scoped to one two-pass matching run.
pub type VarTable = BTreeMap<String, Value>;

/// Which of the two passes is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Record `"=name"` captures; ignore `"==name"` back-references.
    Assign,
    /// Enforce `"==name"` back-references; ignore `"=name"` captures.
    Verify,
}

/// Recursively match `target` against `schema`, stopping at the first
/// mismatch on the branch.
///
/// The only side effect is insertion into `vars` for Assign-mode captures.
pub fn check(
    schema: &Value,
    target: &Value,
    vars: &mut VarTable,
    mode: Mode,
    path: &ValuePath,
) -> Result<(), MatchError> {
    if let Value::String(directive) = schema {
        // "==" must be tested before "=": a back-reference also starts
        // with a single '='.
        if let Some(name) = directive.strip_prefix("==") {
            if mode == Mode::Verify {
                let Some(expected) = vars.get(name) else {
                    return Err(MatchError::UnknownVariable {
                        name: name.to_string(),
                    });
                };
                if !values_equal(expected, target) {
                    return Err(MatchError::VariableMismatch {
                        path: path.clone(),
                        expected: expected.clone(),
                        actual: target.clone(),
                    });
                }
            }
            return Ok(());
        }
        if let Some(name) = directive.strip_prefix('=') {
            if mode == Mode::Assign {
                // Last writer wins on reassignment.
                vars.insert(name.to_string(), target.clone());
            }
            return Ok(());
        }
    }

    let expected = Kind::of(schema);
    let actual = Kind::of(target);
    if expected != actual {
        return Err(MatchError::TypeMismatch {
            path: path.clone(),
            expected,
            actual,
        });
    }

    match (schema, target) {
        (Value::Object(schema), Value::Object(target)) => {
            check_map(schema, target, vars, mode, path)
        }
        (Value::Array(schema), Value::Array(target)) => {
            check_slice(schema, target, vars, mode, path)
        }
        _ => {
            if values_equal(schema, target) {
                Ok(())
            } else {
                Err(MatchError::ValueMismatch {
                    path: path.clone(),
                    expected: schema.clone(),
                    actual: target.clone(),
                })
            }
        }
    }
}

/// Subset match: every schema key must be present in the target and match
/// recursively; extra target keys are ignored. Keys are visited in sorted
/// order, so the first error reported is deterministic.
fn check_map(
    schema: &serde_json::Map<String, Value>,
    target: &serde_json::Map<String, Value>,
    vars: &mut VarTable,
    mode: Mode,
    path: &ValuePath,
) -> Result<(), MatchError> {
    for (key, schema_value) in schema {
        let key_path = path.key(key);
        let Some(target_value) = target.get(key) else {
            return Err(MatchError::MissingKey {
                path: key_path,
                expected: schema_value.clone(),
            });
        };
        check(schema_value, target_value, vars, mode, &key_path)?;
    }
    Ok(())
}

/// Existential, order-independent containment: each schema element must
/// match some target element. Matches are non-exclusive — one target
/// element may satisfy several schema elements — and the first matching
/// candidate wins, so any captures inside an array come from the earliest
/// target element that fits.
fn check_slice(
    schema: &[Value],
    target: &[Value],
    vars: &mut VarTable,
    mode: Mode,
    path: &ValuePath,
) -> Result<(), MatchError> {
    if schema.len() > target.len() {
        return Err(MatchError::LengthMismatch {
            path: path.clone(),
            expected_at_least: schema.len(),
            got: target.len(),
        });
    }
    for (i, schema_value) in schema.iter().enumerate() {
        let element_path = path.index(i);
        let found = target
            .iter()
            .any(|candidate| check(schema_value, candidate, vars, mode, &element_path).is_ok());
        if !found {
            return Err(MatchError::SliceMismatch {
                path: element_path,
                expected: schema_value.clone(),
            });
        }
    }
    Ok(())
}

/// Deep equality with numeric normalization: JSON `1` and `1.0` are the
/// same value even though serde_json keeps the representations distinct.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, a)| b.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_root(
        schema: &Value,
        target: &Value,
        vars: &mut VarTable,
        mode: Mode,
    ) -> Result<(), MatchError> {
        check(schema, target, vars, mode, &ValuePath::root())
    }

    fn both_passes(schema: &Value, target: &Value) -> Result<(), MatchError> {
        let mut vars = VarTable::new();
        check_root(schema, target, &mut vars, Mode::Assign)?;
        check_root(schema, target, &mut vars, Mode::Verify)
    }

    #[test]
    fn directive_free_document_matches_itself() {
        let doc = json!({
            "name": "curl",
            "version": 8,
            "licenses": ["MIT", "Apache-2.0"],
            "meta": {"vendored": false, "notes": null}
        });
        assert_eq!(both_passes(&doc, &doc), Ok(()));
    }

    #[test]
    fn object_match_is_subset() {
        assert_eq!(
            both_passes(&json!({"a": 1}), &json!({"a": 1, "b": 2})),
            Ok(())
        );
    }

    #[test]
    fn missing_key_reports_key_path_and_schema_value() {
        let err = both_passes(&json!({"a": 1, "b": 2}), &json!({"a": 1})).unwrap_err();
        assert_eq!(
            err,
            MatchError::MissingKey {
                path: ValuePath::root().key("b"),
                expected: json!(2),
            }
        );
    }

    #[test]
    fn array_match_is_order_independent() {
        assert_eq!(both_passes(&json!([1, 2]), &json!([2, 1, 3])), Ok(()));
    }

    #[test]
    fn longer_schema_array_is_a_length_mismatch() {
        let err = both_passes(&json!([1, 2, 2]), &json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            MatchError::LengthMismatch {
                path: ValuePath::root(),
                expected_at_least: 3,
                got: 2,
            }
        );
    }

    #[test]
    fn unmatched_array_element_is_a_slice_mismatch() {
        let err = both_passes(&json!([5]), &json!([1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            MatchError::SliceMismatch {
                path: ValuePath::root().index(0),
                expected: json!(5),
            }
        );
    }

    #[test]
    fn one_target_element_may_satisfy_several_schema_elements() {
        // Matches are reusable: both schema elements match the single 1.
        assert_eq!(both_passes(&json!([1, 1]), &json!([1, 2])), Ok(()));
    }

    #[test]
    fn capture_then_back_reference_round_trips() {
        let schema = json!({"a": "=x", "b": "==x"});
        assert_eq!(both_passes(&schema, &json!({"a": 7, "b": 7})), Ok(()));
    }

    #[test]
    fn back_reference_mismatch_surfaces_only_on_verify() {
        let schema = json!({"a": "=x", "b": "==x"});
        let target = json!({"a": 7, "b": 8});
        let mut vars = VarTable::new();
        assert_eq!(check_root(&schema, &target, &mut vars, Mode::Assign), Ok(()));
        assert_eq!(vars.get("x"), Some(&json!(7)));
        let err = check_root(&schema, &target, &mut vars, Mode::Verify).unwrap_err();
        assert_eq!(
            err,
            MatchError::VariableMismatch {
                path: ValuePath::root().key("b"),
                expected: json!(7),
                actual: json!(8),
            }
        );
    }

    #[test]
    fn back_reference_to_unassigned_variable_fails_verify() {
        let schema = json!({"b": "==missing"});
        let target = json!({"b": 1});
        let mut vars = VarTable::new();
        assert_eq!(check_root(&schema, &target, &mut vars, Mode::Assign), Ok(()));
        let err = check_root(&schema, &target, &mut vars, Mode::Verify).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnknownVariable {
                name: "missing".to_string(),
            }
        );
    }

    #[test]
    fn back_reference_is_never_parsed_as_a_capture() {
        // "==x" starts with "=" too; the longer prefix must win, so the
        // assign pass records nothing.
        let mut vars = VarTable::new();
        check_root(&json!("==x"), &json!(1), &mut vars, Mode::Assign).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn kind_difference_is_a_type_mismatch() {
        let err = both_passes(&json!({"a": 1}), &json!({"a": "1"})).unwrap_err();
        assert_eq!(
            err,
            MatchError::TypeMismatch {
                path: ValuePath::root().key("a"),
                expected: Kind::Number,
                actual: Kind::String,
            }
        );
    }

    #[test]
    fn unequal_scalars_are_a_value_mismatch() {
        let err = both_passes(&json!({"a": "foo"}), &json!({"a": "bar"})).unwrap_err();
        assert_eq!(
            err,
            MatchError::ValueMismatch {
                path: ValuePath::root().key("a"),
                expected: json!("foo"),
                actual: json!("bar"),
            }
        );
    }

    #[test]
    fn integer_and_float_representations_compare_equal() {
        assert_eq!(both_passes(&json!(1.0), &json!(1)), Ok(()));
        assert_eq!(both_passes(&json!({"n": 2}), &json!({"n": 2.0})), Ok(()));
    }

    #[test]
    fn capture_takes_first_matching_candidate() {
        // First-match semantics: with several structurally equal candidates,
        // the earliest target element wins the capture. Pinned as current
        // behavior; callers should not rely on any other order.
        let schema = json!([{"name": "=n"}]);
        let target = json!([{"name": "first"}, {"name": "second"}]);
        let mut vars = VarTable::new();
        check_root(&schema, &target, &mut vars, Mode::Assign).unwrap();
        assert_eq!(vars.get("n"), Some(&json!("first")));
    }

    #[test]
    fn reassignment_overwrites_previous_capture() {
        // Keys are visited in sorted order, so "b" captures last.
        let schema = json!({"a": "=x", "b": "=x"});
        let target = json!({"a": 1, "b": 2});
        let mut vars = VarTable::new();
        check_root(&schema, &target, &mut vars, Mode::Assign).unwrap();
        assert_eq!(vars.get("x"), Some(&json!(2)));
    }

    #[test]
    fn capture_inside_array_feeds_back_reference_elsewhere() {
        let schema = json!({
            "pkgs": [{"name": "=pkgName", "version": "1.0"}],
            "root": "==pkgName"
        });
        let target = json!({
            "pkgs": [{"name": "curl", "version": "1.0"}],
            "root": "curl"
        });
        assert_eq!(both_passes(&schema, &target), Ok(()));
    }

    #[test]
    fn captured_container_values_compare_deeply() {
        let schema = json!({"a": "=x", "b": "==x"});
        let target = json!({"a": [1, {"k": 2.0}], "b": [1, {"k": 2}]});
        assert_eq!(both_passes(&schema, &target), Ok(()));
    }
}
