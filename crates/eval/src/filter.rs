//! Auto-evaluated question resolution: conditionals, age filters, and
//! gender filters. These never reach the caller; the resolve loop
//! evaluates them in place and follows the resulting action.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use triage_rules::{Action, ActionOption, AutoEvalView};

use crate::predicate::eval_conditional;

/// Resolve an auto-evaluated question to its routing action.
///
/// `None` means the question produced no route (no conditional rule
/// matched and no default, or a filter had nothing to go on); the
/// resolve loop discards the question and continues.
pub fn resolve_auto<'a>(
    view: AutoEvalView<'a>,
    answers: &BTreeMap<String, Value>,
    age: Option<f64>,
    gender: Option<&str>,
) -> Option<&'a Action> {
    match view {
        AutoEvalView::Conditional { rules, default } => eval_conditional(rules, default, answers),
        AutoEvalView::AgeFilter { options } => eval_age_filter(options, age),
        AutoEvalView::GenderFilter { options } => eval_gender_filter(options, gender),
    }
}

/// Threshold comparison parsed out of an age-filter option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeArm {
    pub op: AgeOp,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl AgeArm {
    pub fn accepts(&self, age: f64) -> bool {
        match self.op {
            AgeOp::Lt => age < self.threshold,
            AgeOp::Le => age <= self.threshold,
            AgeOp::Gt => age > self.threshold,
            AgeOp::Ge => age >= self.threshold,
        }
    }
}

fn id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(lt|lte|le|gt|gte|ge)_(\d+(?:\.\d+)?)$").unwrap())
}

fn label_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([<>]=?)\s*(\d+(?:\.\d+)?)$").unwrap())
}

/// Parse the threshold comparison encoded in an option's id
/// (`lt_15`, `gte_60`) or, failing that, its label (`< 15`, `>= 60`).
/// Also used by triage-analyze to audit filter coverage.
pub fn parse_age_arm(option: &ActionOption) -> Option<AgeArm> {
    if let Some(caps) = id_pattern().captures(&option.id.to_lowercase()) {
        let op = match &caps[1] {
            "lt" => AgeOp::Lt,
            "lte" | "le" => AgeOp::Le,
            "gt" => AgeOp::Gt,
            _ => AgeOp::Ge,
        };
        let threshold = caps[2].parse().ok()?;
        return Some(AgeArm { op, threshold });
    }
    if let Some(caps) = label_pattern().captures(option.label.trim()) {
        let op = match &caps[1] {
            "<" => AgeOp::Lt,
            "<=" => AgeOp::Le,
            ">" => AgeOp::Gt,
            _ => AgeOp::Ge,
        };
        let threshold = caps[2].parse().ok()?;
        return Some(AgeArm { op, threshold });
    }
    None
}

/// Pick the first option whose parsed threshold accepts the age.
/// Unparseable arms are skipped. When nothing matches, the last option
/// is taken as the fallback arm; an empty list or unknown age yields
/// no route.
pub fn eval_age_filter<'a>(options: &'a [ActionOption], age: Option<f64>) -> Option<&'a Action> {
    let age = match age {
        Some(a) => a,
        None => {
            tracing::warn!("age filter reached without a known patient age");
            return None;
        }
    };
    for option in options {
        if let Some(arm) = parse_age_arm(option) {
            if arm.accepts(age) {
                return Some(&option.action);
            }
        }
    }
    match options.last() {
        Some(last) => {
            tracing::warn!(
                option = %last.id,
                age,
                "no age filter arm matched, taking the last option"
            );
            Some(&last.action)
        }
        None => None,
    }
}

/// Match the patient's gender against option ids and labels,
/// case-insensitively and ignoring surrounding whitespace. No match
/// means no route; there is no fallback arm.
pub fn eval_gender_filter<'a>(
    options: &'a [ActionOption],
    gender: Option<&str>,
) -> Option<&'a Action> {
    let gender = match gender {
        Some(g) => g.trim().to_lowercase(),
        None => {
            tracing::warn!("gender filter reached without a known patient gender");
            return None;
        }
    };
    for option in options {
        if option.id.to_lowercase() == gender || option.label.trim().to_lowercase() == gender {
            return Some(&option.action);
        }
    }
    tracing::warn!(%gender, "no gender filter option matched");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(defs: &[(&str, &str, &str)]) -> Vec<ActionOption> {
        defs.iter()
            .map(|(id, label, target)| {
                serde_json::from_value(json!({
                    "id": id,
                    "label": label,
                    "action": {"action": "goto", "qid": [target]}
                }))
                .unwrap()
            })
            .collect()
    }

    fn target(action: Option<&Action>) -> &str {
        match action {
            Some(Action::Goto { qid }) => &qid[0],
            other => panic!("expected goto, got {:?}", other),
        }
    }

    #[test]
    fn age_filter_routes_on_id_pattern() {
        let opts = options(&[("lt_15", "Under 15", "peds"), ("gte_15", "15 and over", "adult")]);
        assert_eq!(target(eval_age_filter(&opts, Some(10.0))), "peds");
        assert_eq!(target(eval_age_filter(&opts, Some(30.0))), "adult");
        assert_eq!(target(eval_age_filter(&opts, Some(15.0))), "adult");
    }

    #[test]
    fn age_filter_falls_back_to_label_pattern() {
        let opts = options(&[("young", "< 15", "peds"), ("older", ">= 15", "adult")]);
        assert_eq!(target(eval_age_filter(&opts, Some(3.0))), "peds");
        assert_eq!(target(eval_age_filter(&opts, Some(64.0))), "adult");
    }

    #[test]
    fn age_filter_unmatched_takes_last_option() {
        let opts = options(&[("lt_5", "Under 5", "infant"), ("lt_12", "Under 12", "child")]);
        assert_eq!(target(eval_age_filter(&opts, Some(40.0))), "child");
    }

    #[test]
    fn age_filter_without_age_or_options_yields_nothing() {
        let opts = options(&[("lt_15", "Under 15", "peds")]);
        assert!(eval_age_filter(&opts, None).is_none());
        assert!(eval_age_filter(&[], Some(20.0)).is_none());
    }

    #[test]
    fn age_arm_ops_parse_all_spellings() {
        let opts = options(&[
            ("lte_10", "x", "a"),
            ("le_10", "x", "b"),
            ("gt_10", "x", "c"),
            ("gte_10", "x", "d"),
        ]);
        assert_eq!(parse_age_arm(&opts[0]).unwrap().op, AgeOp::Le);
        assert_eq!(parse_age_arm(&opts[1]).unwrap().op, AgeOp::Le);
        assert_eq!(parse_age_arm(&opts[2]).unwrap().op, AgeOp::Gt);
        assert_eq!(parse_age_arm(&opts[3]).unwrap().op, AgeOp::Ge);
        assert!(parse_age_arm(&options(&[("adult", "Adult", "a")])[0]).is_none());
    }

    #[test]
    fn gender_filter_matches_id_or_label_case_insensitively() {
        let opts = options(&[("male", "ชาย", "m_branch"), ("female", "หญิง", "f_branch")]);
        assert_eq!(target(eval_gender_filter(&opts, Some("MALE"))), "m_branch");
        assert_eq!(target(eval_gender_filter(&opts, Some("  female "))), "f_branch");
        assert_eq!(target(eval_gender_filter(&opts, Some("หญิง"))), "f_branch");
    }

    #[test]
    fn gender_filter_has_no_fallback_arm() {
        let opts = options(&[("male", "Male", "m_branch")]);
        assert!(eval_gender_filter(&opts, Some("female")).is_none());
        assert!(eval_gender_filter(&opts, None).is_none());
    }
}
