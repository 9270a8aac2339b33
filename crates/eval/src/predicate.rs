//! Predicate evaluation over recorded answers.
//!
//! Conditional questions route on predicates against the session's
//! answer map. Evaluation never fails: a missing answer, an
//! uncoercible operand, a malformed range, or a bad regex all make the
//! predicate false. Rule data problems are the ruleset author's to fix
//! (triage-analyze flags them); the running session keeps going.

use std::collections::BTreeMap;

use serde_json::Value;
use triage_rules::{Action, CompareOp, ConditionalRule, Predicate};

/// Evaluate one predicate against the answer map.
///
/// A missing or null answer is false for every operator. When `field`
/// is set, the named member of an object answer is compared instead of
/// the whole answer; a non-object answer cannot satisfy a field
/// predicate at all.
pub fn eval_predicate(pred: &Predicate, answers: &BTreeMap<String, Value>) -> bool {
    let answer = match answers.get(&pred.qid) {
        Some(v) if !v.is_null() => v,
        _ => return false,
    };
    let answer = match (&pred.field, answer) {
        (Some(field), Value::Object(map)) => map.get(field).unwrap_or(&Value::Null),
        (Some(_), _) => return false,
        (None, _) => answer,
    };
    compare(pred.op, answer, &pred.value)
}

/// Evaluate a conditional question's rules in declaration order.
///
/// Returns the first rule whose predicates all hold, else the default
/// action, else `None`. A rule with an empty `when` list always holds.
pub fn eval_conditional<'a>(
    rules: &'a [ConditionalRule],
    default: Option<&'a Action>,
    answers: &BTreeMap<String, Value>,
) -> Option<&'a Action> {
    for rule in rules {
        if rule.when.iter().all(|p| eval_predicate(p, answers)) {
            return Some(&rule.then);
        }
    }
    default
}

/// Apply one comparison operator. Total over all value shapes.
pub fn compare(op: CompareOp, answer: &Value, expected: &Value) -> bool {
    match op {
        CompareOp::Eq => values_equal(answer, expected),
        CompareOp::Ne => !values_equal(answer, expected),
        CompareOp::Lt => numeric_cmp(answer, expected, |a, e| a < e),
        CompareOp::Le => numeric_cmp(answer, expected, |a, e| a <= e),
        CompareOp::Gt => numeric_cmp(answer, expected, |a, e| a > e),
        CompareOp::Ge => numeric_cmp(answer, expected, |a, e| a >= e),
        CompareOp::Between => between(answer, expected),
        CompareOp::Contains => contains_one(answer, expected),
        CompareOp::NotContains => !contains_one(answer, expected),
        CompareOp::ContainsAny => match expected {
            Value::Array(wanted) => wanted.iter().any(|v| contains_one(answer, v)),
            _ => false,
        },
        CompareOp::ContainsAll => match expected {
            Value::Array(wanted) => wanted.iter().all(|v| contains_one(answer, v)),
            _ => false,
        },
        CompareOp::Matches => matches_regex(answer, expected),
        CompareOp::Unknown => {
            tracing::warn!("unknown comparison operator, predicate is false");
            false
        }
    }
}

/// Equality with numeric cross-type tolerance: `5` equals `5.0` and
/// `true` equals `1`, but a string never equals a number.
fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_string() || b.is_string() {
        return a == b;
    }
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn numeric_cmp(answer: &Value, expected: &Value, f: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(answer), as_number(expected)) {
        (Some(a), Some(e)) => f(a, e),
        _ => false,
    }
}

/// Inclusive range check: expected is `[min, max]`.
fn between(answer: &Value, expected: &Value) -> bool {
    let bounds = match expected {
        Value::Array(items) if items.len() >= 2 => items,
        _ => return false,
    };
    match (as_number(answer), as_number(&bounds[0]), as_number(&bounds[1])) {
        (Some(a), Some(lo), Some(hi)) => lo <= a && a <= hi,
        _ => false,
    }
}

/// Membership for list answers, substring for everything else.
fn contains_one(answer: &Value, needle: &Value) -> bool {
    match answer {
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        _ => text_of(answer).contains(&text_of(needle)),
    }
}

fn matches_regex(answer: &Value, pattern: &Value) -> bool {
    let pattern = text_of(pattern);
    match regex::Regex::new(&pattern) {
        Ok(re) => re.is_match(&text_of(answer)),
        Err(err) => {
            tracing::warn!(%pattern, %err, "invalid regex in matches predicate");
            false
        }
    }
}

/// Coerce a JSON value to f64: numbers directly, strings when they
/// parse, booleans as 0/1.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Text rendering for substring and regex operators. Strings are used
/// as-is (no quoting); other values render as their JSON text.
fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
