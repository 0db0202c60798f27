//! Typed store predicates compiled from translated query documents.
//!
//! A predicate document maps field paths to either a literal (equality) or an
//! operator map (`{"$gt": 5, "$lt": 10}`). [`Filter::compile`] validates the
//! document once; [`Filter::matches`] evaluates it against stored records.
//!
//! Query strings carry every value as text, so comparisons coerce the query
//! operand to the stored field's type where that is unambiguous (`"10"`
//! against a stored number compares numerically, `"true"` against a stored
//! boolean compares as a boolean).

use std::cmp::Ordering;

use serde_json::Value;

use crate::geo;
use crate::query::{json_kind, QueryError, OPERATOR_SIGIL};
use crate::types::{Document, GeoPoint};

/// Ordering comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Compiled predicate over a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document (empty predicate).
    True,
    And(Vec<Filter>),
    Cmp {
        path: String,
        op: CmpOp,
        value: Value,
    },
    In {
        path: String,
        values: Vec<Value>,
    },
    Nin {
        path: String,
        values: Vec<Value>,
    },
    /// `$geoWithin: {$centerSphere: [[lng, lat], radius]}`.
    WithinSphere {
        path: String,
        center: GeoPoint,
        radius: f64,
    },
}

impl Filter {
    /// Compiles a predicate document into a [`Filter`].
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownOperator`] for `$`-prefixed keys this
    /// store does not understand, and [`QueryError::InvalidOperand`] when an
    /// operator's operand has the wrong shape.
    pub fn compile(predicate: &Document) -> Result<Self, QueryError> {
        let mut clauses = Vec::new();
        for (path, condition) in predicate {
            if path.starts_with(OPERATOR_SIGIL) {
                return Err(QueryError::UnknownOperator { op: path.clone() });
            }
            compile_field(path, condition, &mut clauses)?;
        }

        Ok(match clauses.len() {
            0 => Self::True,
            1 => clauses.pop().unwrap_or(Self::True),
            _ => Self::And(clauses),
        })
    }

    /// Evaluates this filter against `doc`.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::True => true,
            Self::And(clauses) => clauses.iter().all(|c| c.matches(doc)),
            Self::Cmp { path, op, value } => match lookup(doc, path) {
                Some(stored) => any_element(stored, |v| compare_values(v, *op, value)),
                None => *op == CmpOp::Eq && value.is_null(),
            },
            Self::In { path, values } => in_set(lookup(doc, path), values),
            Self::Nin { path, values } => !in_set(lookup(doc, path), values),
            Self::WithinSphere {
                path,
                center,
                radius,
            } => lookup(doc, path)
                .and_then(geo::point_from_json)
                .is_some_and(|point| geo::within_sphere(*center, *radius, point)),
        }
    }
}

fn compile_field(path: &str, condition: &Value, out: &mut Vec<Filter>) -> Result<(), QueryError> {
    let operators = match condition {
        Value::Object(map) if map.keys().any(|k| k.starts_with(OPERATOR_SIGIL)) => map,
        literal => {
            out.push(Filter::Cmp {
                path: path.to_string(),
                op: CmpOp::Eq,
                value: literal.clone(),
            });
            return Ok(());
        }
    };

    for (op, operand) in operators {
        let path = path.to_string();
        let clause = match op.as_str() {
            "$eq" => cmp(path, CmpOp::Eq, operand),
            "$gt" => cmp(path, CmpOp::Gt, operand),
            "$gte" => cmp(path, CmpOp::Gte, operand),
            "$lt" => cmp(path, CmpOp::Lt, operand),
            "$lte" => cmp(path, CmpOp::Lte, operand),
            "$in" => Filter::In {
                path,
                values: operand_set(operand),
            },
            "$nin" => Filter::Nin {
                path,
                values: operand_set(operand),
            },
            "$geoWithin" => compile_geo_within(path, operand)?,
            _ => return Err(QueryError::UnknownOperator { op: op.clone() }),
        };
        out.push(clause);
    }
    Ok(())
}

fn cmp(path: String, op: CmpOp, operand: &Value) -> Filter {
    Filter::Cmp {
        path,
        op,
        value: operand.clone(),
    }
}

/// A scalar operand to `$in` / `$nin` is treated as a one-element set.
fn operand_set(operand: &Value) -> Vec<Value> {
    match operand {
        Value::Array(items) => items.clone(),
        scalar => vec![scalar.clone()],
    }
}

fn compile_geo_within(path: String, operand: &Value) -> Result<Filter, QueryError> {
    let invalid = |reason: String| QueryError::InvalidOperand {
        op: "$geoWithin".to_string(),
        reason,
    };

    let sphere = operand
        .get("$centerSphere")
        .ok_or_else(|| invalid("expected a `$centerSphere` shape".to_string()))?;
    let [center, radius] = sphere.as_array().map(Vec::as_slice).unwrap_or_default() else {
        return Err(invalid(format!(
            "`$centerSphere` must be [[lng, lat], radius], got {}",
            json_kind(sphere)
        )));
    };
    let center = geo::point_from_json(center)
        .ok_or_else(|| invalid("center must be a [lng, lat] pair".to_string()))?;
    let radius = radius
        .as_f64()
        .ok_or_else(|| invalid("radius must be a number".to_string()))?;

    Ok(Filter::WithinSphere {
        path,
        center,
        radius,
    })
}

/// Resolves a dotted path (`location.state`) through nested objects.
/// A literal key containing dots takes precedence over traversal.
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    match doc.get(head)? {
        Value::Object(inner) => lookup(inner, rest),
        _ => None,
    }
}

/// Array fields match when the whole array or any element satisfies `pred`.
fn any_element(stored: &Value, pred: impl Fn(&Value) -> bool) -> bool {
    if pred(stored) {
        return true;
    }
    match stored {
        Value::Array(items) => items.iter().any(pred),
        _ => false,
    }
}

fn in_set(stored: Option<&Value>, values: &[Value]) -> bool {
    match stored {
        Some(stored) => values
            .iter()
            .any(|candidate| any_element(stored, |v| compare_values(v, CmpOp::Eq, candidate))),
        None => values.iter().any(Value::is_null),
    }
}

fn compare_values(stored: &Value, op: CmpOp, query: &Value) -> bool {
    if op == CmpOp::Eq && stored == query {
        return true;
    }
    order(stored, query).is_some_and(|ordering| op.accepts(ordering))
}

/// Orders `stored` against `query`, coercing the query operand to the
/// stored value's type. `None` means the two are not comparable.
fn order(stored: &Value, query: &Value) -> Option<Ordering> {
    match (stored, query) {
        (Value::Number(a), _) => {
            let b = match query {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            a.as_f64()?.partial_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::String(b)) => match b.as_str() {
            "true" => Some(a.cmp(&true)),
            "false" => Some(a.cmp(&false)),
            _ => None,
        },
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn compile(value: Value) -> Filter {
        Filter::compile(&doc(value)).unwrap()
    }

    fn devworks() -> Document {
        doc(json!({
            "name": "Devworks Bootcamp",
            "averageCost": 10000,
            "housing": true,
            "careers": ["Web Development", "UI/UX", "Business"],
            "location": {
                "type": "Point",
                "coordinates": [-71.104028, 42.350846],
                "state": "MA"
            }
        }))
    }

    #[test]
    fn empty_predicate_matches_everything() {
        assert_eq!(compile(json!({})), Filter::True);
        assert!(compile(json!({})).matches(&devworks()));
    }

    #[test]
    fn literal_equality() {
        assert!(compile(json!({"name": "Devworks Bootcamp"})).matches(&devworks()));
        assert!(!compile(json!({"name": "Other"})).matches(&devworks()));
    }

    #[test]
    fn string_operands_coerce_to_stored_numbers() {
        assert!(compile(json!({"averageCost": {"$lte": "10000"}})).matches(&devworks()));
        assert!(compile(json!({"averageCost": {"$gt": "9999.5"}})).matches(&devworks()));
        assert!(!compile(json!({"averageCost": {"$lt": "10000"}})).matches(&devworks()));
        assert!(compile(json!({"averageCost": "10000"})).matches(&devworks()));
        assert!(!compile(json!({"averageCost": {"$gt": "abc"}})).matches(&devworks()));
    }

    #[test]
    fn numeric_operands_never_match_stored_strings() {
        let zip = doc(json!({"zip": "abc"}));
        assert!(!compile(json!({"zip": {"$gt": 5}})).matches(&zip));
        assert!(!compile(json!({"zip": {"$lt": 5}})).matches(&zip));
        assert!(!compile(json!({"zip": 5})).matches(&zip));
    }

    #[test]
    fn string_operands_coerce_to_stored_booleans() {
        assert!(compile(json!({"housing": "true"})).matches(&devworks()));
        assert!(!compile(json!({"housing": "false"})).matches(&devworks()));
    }

    #[test]
    fn range_on_one_field_is_a_conjunction() {
        let f = compile(json!({"averageCost": {"$gte": "5000", "$lte": "12000"}}));
        assert!(matches!(f, Filter::And(ref c) if c.len() == 2));
        assert!(f.matches(&devworks()));
        let miss = compile(json!({"averageCost": {"$gte": "11000", "$lte": "12000"}}));
        assert!(!miss.matches(&devworks()));
    }

    #[test]
    fn array_fields_match_on_element() {
        assert!(compile(json!({"careers": "Business"})).matches(&devworks()));
        assert!(compile(json!({"careers": {"$in": "Business"}})).matches(&devworks()));
        assert!(compile(json!({"careers": {"$in": ["Data Science", "UI/UX"]}})).matches(&devworks()));
        assert!(!compile(json!({"careers": {"$in": ["Data Science"]}})).matches(&devworks()));
        assert!(compile(json!({"careers": {"$nin": ["Data Science"]}})).matches(&devworks()));
        assert!(!compile(json!({"careers": {"$nin": "Business"}})).matches(&devworks()));
    }

    #[test]
    fn missing_field_semantics() {
        assert!(!compile(json!({"rating": {"$gt": "1"}})).matches(&devworks()));
        assert!(compile(json!({"rating": null})).matches(&devworks()));
        assert!(compile(json!({"rating": {"$nin": ["5"]}})).matches(&devworks()));
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        assert!(compile(json!({"location.state": "MA"})).matches(&devworks()));
        assert!(!compile(json!({"location.state": "NY"})).matches(&devworks()));
        assert!(!compile(json!({"name.first": "x"})).matches(&devworks()));
    }

    #[test]
    fn geo_within_center_sphere() {
        let near = compile(json!({
            "location": {"$geoWithin": {"$centerSphere": [[-71.0589, 42.3601], 10.0 / 3963.0]}}
        }));
        assert!(near.matches(&devworks()));

        let far = compile(json!({
            "location": {"$geoWithin": {"$centerSphere": [[-74.006, 40.7128], 10.0 / 3963.0]}}
        }));
        assert!(!far.matches(&devworks()));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        let err = Filter::compile(&doc(json!({"price": {"$between": 1}}))).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { ref op } if op == "$between"));

        let err = Filter::compile(&doc(json!({"$where": "1"}))).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { .. }));
    }

    #[test]
    fn misspelled_geo_operator_is_rejected() {
        let err = Filter::compile(&doc(json!({
            "location": {"$geoWithine": {"$centerSphere": [[0.0, 0.0], 1.0]}}
        })))
        .unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { .. }));
    }

    #[test]
    fn malformed_center_sphere_is_rejected() {
        for operand in [
            json!({"$box": []}),
            json!({"$centerSphere": [[0.0, 0.0]]}),
            json!({"$centerSphere": [[0.0], 1.0]}),
            json!({"$centerSphere": [[0.0, 0.0], "far"]}),
        ] {
            let err = Filter::compile(&doc(json!({"location": {"$geoWithin": operand}}))).unwrap_err();
            assert!(matches!(err, QueryError::InvalidOperand { .. }));
        }
    }

    #[test]
    fn non_operator_object_is_literal_equality() {
        let f = compile(json!({"meta": {"between": "5"}}));
        assert!(matches!(f, Filter::Cmp { op: CmpOp::Eq, .. }));
        assert!(f.matches(&doc(json!({"meta": {"between": "5"}}))));
    }
}
