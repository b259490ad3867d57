//! Recursive JSON flattening.
//!
//! Reduces one `serde_json::Value` tree to a single-level mapping of
//! path-keys to scalars. Depends on serde_json's `preserve_order` feature:
//! object iteration order is document order, which keeps downstream column
//! order stable.

use serde_json::Value;

/// A flattened cell value. `Nil` doubles as JSON null and as the sentinel
/// substituted for absent cells during table unification.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Nil,
}

/// Literal sentinel rendering used in CSV output and graph parameters.
pub const SENTINEL: &str = "nil";

impl Scalar {
    /// Textual rendering, as written to CSV cells.
    pub fn render(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Nil => SENTINEL.to_string(),
        }
    }

    /// Float view of the scalar, used by amount-style coercions.
    /// `Nil` and `Bool` have no float reading; text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) | Scalar::Nil => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Scalar::Nil)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// One flattened record: ordered path-key → scalar mapping.
///
/// Keys are unique by construction (prefixes are unique within one input
/// value), so a Vec of pairs keeps first-seen order without an index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedRecord {
    entries: Vec<(String, Scalar)>,
}

impl FlattenedRecord {
    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        self.entries.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten one JSON value into a single-level record.
///
/// Rules:
/// - objects recurse with `prefix + "_" + key`
/// - an array whose first element is an object recurses into that first
///   element only (documented lossy behavior: later elements do not surface)
/// - any other array is stored as its JSON text at `prefix`
/// - scalars are stored at `prefix`; null becomes [`Scalar::Nil`]
///
/// Total and pure: the same input always yields the same record, and no
/// value in the result is a container.
pub fn flatten(value: &Value, prefix: &str) -> FlattenedRecord {
    let mut out = FlattenedRecord::default();
    flatten_into(value, prefix, &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut FlattenedRecord) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, &join_key(prefix, key), out);
            }
        }
        Value::Array(items) => match items.first() {
            Some(Value::Object(_)) => flatten_into(&items[0], prefix, out),
            _ => out.insert(leaf_key(prefix), Scalar::Text(value.to_string())),
        },
        Value::String(s) => out.insert(leaf_key(prefix), Scalar::Text(s.clone())),
        Value::Number(n) => out.insert(leaf_key(prefix), Scalar::Number(n.clone())),
        Value::Bool(b) => out.insert(leaf_key(prefix), Scalar::Bool(*b)),
        Value::Null => out.insert(leaf_key(prefix), Scalar::Nil),
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}_{key}")
    }
}

// A scalar record with no surrounding object still needs a column name.
fn leaf_key(prefix: &str) -> &str {
    if prefix.is_empty() {
        "value"
    } else {
        prefix
    }
}

/// Split a top-level value into its record set, unwrapping the paginated
/// API envelope `[metadata, payload]` when present.
///
/// A two-element top-level array is treated as the envelope: element 1 is
/// the payload (an array yields its elements, anything else a single
/// record). Any other array yields its elements; any other value is a
/// single record.
pub fn records(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) if items.len() == 2 => match &items[1] {
            Value::Array(payload) => payload.clone(),
            other => vec![other.clone()],
        },
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Scalar::Text("x".into()), "x")]
    #[test_case(Scalar::Bool(true), "true")]
    #[test_case(Scalar::Number(7.into()), "7")]
    #[test_case(Scalar::Nil, "nil")]
    fn scalars_render_as_csv_cells(scalar: Scalar, expected: &str) {
        assert_eq!(scalar.render(), expected);
    }

    #[test]
    fn flattens_nested_objects_with_underscore_keys() {
        let rec = flatten(&json!({"a": {"b": {"c": 1}}, "d": "x"}), "");
        assert_eq!(rec.get("a_b_c"), Some(&Scalar::Number(1.into())));
        assert_eq!(rec.get("d"), Some(&Scalar::Text("x".into())));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn no_value_remains_a_container() {
        let rec = flatten(
            &json!({
                "a": {"b": [{"c": {"d": 5}}]},
                "e": [1, 2, 3],
                "f": {"g": null}
            }),
            "",
        );
        for (_, v) in rec.iter() {
            // every value renders as a scalar, arrays as their JSON text
            assert!(matches!(
                v,
                Scalar::Text(_) | Scalar::Number(_) | Scalar::Bool(_) | Scalar::Nil
            ));
        }
        assert_eq!(rec.get("a_b_c_d"), Some(&Scalar::Number(5.into())));
        assert_eq!(rec.get("e"), Some(&Scalar::Text("[1,2,3]".into())));
        assert_eq!(rec.get("f_g"), Some(&Scalar::Nil));
    }

    #[test]
    fn array_of_objects_keeps_first_element_only() {
        // documented lossy behavior: later elements do not surface
        let rec = flatten(&json!({"items": [{"a": 1}, {"a": 2}]}), "");
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get("items_a"), Some(&Scalar::Number(1.into())));
    }

    #[test]
    fn empty_array_renders_as_text() {
        let rec = flatten(&json!({"tags": []}), "");
        assert_eq!(rec.get("tags"), Some(&Scalar::Text("[]".into())));
    }

    #[test]
    fn scalar_at_empty_prefix_uses_value_key() {
        let rec = flatten(&json!(42), "");
        assert_eq!(rec.get("value"), Some(&Scalar::Number(42.into())));
    }

    #[test]
    fn flatten_is_deterministic() {
        let v = json!({"z": {"y": 1}, "a": [{"b": true}], "m": [4, 5]});
        let first = flatten(&v, "");
        let second = flatten(&v, "");
        assert_eq!(first, second);
        // key order is document order, both runs
        let keys: Vec<_> = first.keys().collect();
        assert_eq!(keys, vec!["z_y", "a_b", "m"]);
    }

    #[test]
    fn envelope_unwrap_takes_payload_elements() {
        let v = json!([{"page": 1, "pages": 10}, [{"id": "A"}, {"id": "B"}]]);
        let recs = records(&v);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0], json!({"id": "A"}));
    }

    #[test]
    fn envelope_unwrap_wraps_single_object_payload() {
        let v = json!([{"page": 1}, {"id": "only"}]);
        assert_eq!(records(&v), vec![json!({"id": "only"})]);
    }

    #[test]
    fn plain_array_yields_its_elements() {
        let v = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        assert_eq!(records(&v).len(), 3);
    }

    #[test]
    fn plain_object_is_a_single_record() {
        let v = json!({"id": 1});
        assert_eq!(records(&v), vec![v.clone()]);
    }
}
