//! Shared ruleset types and deserialization for the triage engine.
//!
//! The ruleset is authored as one JSON document: reference tables
//! (departments, severity levels, symptoms, underlying diseases), the
//! demographics form, the ER critical and checklist items, and the
//! per-symptom OLDCARTS / OPD question trees. This crate owns the wire
//! types; evaluation lives in triage-eval.

pub mod bundle;
pub mod error;
pub mod types;

pub use bundle::RulesetBundle;
pub use error::RulesetError;
pub use types::{
    Action, ActionOption, AutoEvalView, ChecklistItem, ChoiceOption, CompareOp, ConditionalRule,
    CriticalItem, DemographicField, DemographicKind, Department, DepartmentRef, Predicate,
    Question, QuestionClass, Severity, SeverityRef, Symptom, TerminateMetadata, TextField,
    UnderlyingDisease,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_variants_deserialize_by_tag() {
        let q: Question = serde_json::from_value(json!({
            "question_type": "single_select",
            "qid": "q1",
            "question": "Any fever?",
            "options": [
                {"id": "yes", "label": "Yes", "action": {"action": "goto", "qid": ["q2"]}},
                {"id": "no", "label": "No", "action": {"action": "opd"}}
            ]
        }))
        .unwrap();
        assert_eq!(q.qid(), "q1");
        assert_eq!(q.kind(), "single_select");
        assert!(matches!(q.classify(), QuestionClass::UserFacing));

        let q: Question = serde_json::from_value(json!({
            "question_type": "conditional",
            "qid": "q_cond",
            "question": "",
            "rules": [
                {
                    "when": [{"qid": "q1", "op": "eq", "value": "yes"}],
                    "then": {"action": "goto", "qid": ["q3"]}
                }
            ],
            "default": {"action": "opd"}
        }))
        .unwrap();
        assert!(matches!(q.classify(), QuestionClass::AutoEval(_)));
    }

    #[test]
    fn number_range_defaults_step_to_one() {
        let q: Question = serde_json::from_value(json!({
            "question_type": "number_range",
            "qid": "q_temp",
            "question": "Body temperature?",
            "min_value": 34.0,
            "max_value": 43.0,
            "on_submit": {"action": "opd"}
        }))
        .unwrap();
        match q {
            Question::NumberRange { step, default_value, .. } => {
                assert_eq!(step, 1.0);
                assert!(default_value.is_none());
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn terminate_action_parses_metadata() {
        let a: Action = serde_json::from_value(json!({
            "action": "terminate",
            "reason": "Emergency",
            "metadata": {
                "department": [{"id": "dept001"}],
                "severity": [{"id": "sev001"}]
            }
        }))
        .unwrap();
        match a {
            Action::Terminate { reason, metadata } => {
                assert_eq!(reason.as_deref(), Some("Emergency"));
                assert_eq!(metadata.department[0].id, "dept001");
                assert_eq!(metadata.severity.unwrap()[0].id, "sev001");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn terminate_metadata_sections_default_empty() {
        let a: Action =
            serde_json::from_value(json!({"action": "terminate", "metadata": {}})).unwrap();
        match a {
            Action::Terminate { reason, metadata } => {
                assert!(reason.is_none());
                assert!(metadata.department.is_empty());
                assert!(metadata.severity.is_none());
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn unknown_compare_op_is_absorbed() {
        let p: Predicate = serde_json::from_value(json!({
            "qid": "q1",
            "op": "approximately",
            "value": 5
        }))
        .unwrap();
        assert_eq!(p.op, CompareOp::Unknown);
    }

    #[test]
    fn bundle_accepts_empty_object() {
        let bundle = RulesetBundle::from_json(&json!({})).unwrap();
        assert!(bundle.oldcarts.is_empty());
        assert!(bundle.er_critical.is_empty());
    }

    #[test]
    fn bundle_rejects_duplicate_qids_within_a_tree() {
        let err = RulesetBundle::from_json(&json!({
            "oldcarts": {
                "fever": [
                    {"question_type": "free_text", "qid": "q1", "question": "a",
                     "on_submit": {"action": "opd"}},
                    {"question_type": "free_text", "qid": "q1", "question": "b",
                     "on_submit": {"action": "opd"}}
                ]
            }
        }))
        .unwrap_err();
        assert!(matches!(err, RulesetError::DuplicateQid { .. }));
    }

    #[test]
    fn demographic_field_kind_round_trips() {
        let f: DemographicField = serde_json::from_value(json!({
            "qid": "demo_gender",
            "key": "gender",
            "field_name": "Gender",
            "type": "enum",
            "values": ["male", "female"]
        }))
        .unwrap();
        assert_eq!(f.kind, DemographicKind::Enum);
        assert!(!f.optional);
    }

    #[test]
    fn question_actions_cover_every_routing_edge() {
        let q: Question = serde_json::from_value(json!({
            "question_type": "conditional",
            "qid": "q_cond",
            "question": "",
            "rules": [
                {"when": [{"qid": "a", "op": "eq", "value": 1}],
                 "then": {"action": "goto", "qid": ["x"]}},
                {"when": [{"qid": "b", "op": "eq", "value": 2}],
                 "then": {"action": "goto", "qid": ["y"]}}
            ],
            "default": {"action": "terminate", "metadata": {}}
        }))
        .unwrap();
        assert_eq!(q.actions().len(), 3);
    }
}
