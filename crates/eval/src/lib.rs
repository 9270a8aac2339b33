//! Triage decision-tree resolution engine.
//!
//! A questionnaire session moves through six phases: demographics, the
//! ER critical screen, symptom selection, the ER checklist, OLDCARTS,
//! and OPD. The first four are bulk forms; the last two walk
//! per-symptom question trees one question at a time, auto-resolving
//! conditionals and age/gender filters along the way.
//!
//! The engine is synchronous and holds no per-session state: callers
//! own a [`SessionState`] (and a [`SessionHistory`] for back
//! navigation) and pass both to every call, so one [`Engine`] serves
//! any number of sessions.
//!
//! ```
//! use std::sync::Arc;
//! use triage_eval::{Engine, EngineConfig, RuleIndex, SessionHistory};
//! use triage_rules::RulesetBundle;
//!
//! let bundle = RulesetBundle::from_json(&serde_json::json!({})).unwrap();
//! let engine = Engine::new(Arc::new(RuleIndex::build(bundle)), EngineConfig::default());
//! let mut state = engine.create_session();
//! let mut history = SessionHistory::new();
//! let outcome = engine.submit_answer(&mut state, &mut history, serde_json::json!({}));
//! assert!(outcome.is_ok());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod history;
pub mod index;
pub mod overrides;
pub mod predicate;
pub mod session;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EvalError;
pub use history::{HistoryEntry, SessionHistory};
pub use index::{NamedRef, RuleIndex, Source};
pub use overrides::LabelOverrides;
pub use session::{
    Disposition, NumberConstraints, Phase, QuestionCard, QuestionsStep, SessionState, StepOutcome,
    StepView, TriageResult,
};

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use serde_json::json;
    use triage_rules::RulesetBundle;

    use super::*;

    fn engine() -> Engine {
        let bundle = RulesetBundle::from_json(&json!({
            "departments": [
                {"id": "dept001", "name": "Internal Medicine"},
                {"id": "dept002", "name": "Emergency"}
            ],
            "severity_levels": [
                {"id": "sev002", "name": "Emergent", "rank": 2},
                {"id": "sev003", "name": "Urgent", "rank": 3}
            ],
            "symptoms": [{"name": "headache", "name_th": "ปวดหัว"}],
            "demographics": [
                {"qid": "demo_gender", "key": "gender", "field_name": "Gender",
                 "type": "enum", "values": ["male", "female"]},
                {"qid": "demo_age", "key": "age", "field_name": "Age", "type": "float"}
            ],
            "er_critical": [
                {"qid": "crit_faint", "text": "Loss of consciousness?"}
            ],
            "er_adult": {
                "headache": [
                    {"qid": "chk_thunder", "text": "Sudden worst-ever headache?",
                     "min_severity": {"id": "sev002"},
                     "department": [{"id": "dept002"}]}
                ]
            },
            "oldcarts": {
                "headache": [
                    {"question_type": "single_select", "qid": "old_region",
                     "question": "Where does it hurt?",
                     "options": [
                         {"id": "one_side", "label": "One side",
                          "action": {"action": "goto", "qid": ["old_aura"]}},
                         {"id": "all_over", "label": "All over",
                          "action": {"action": "opd"}}
                     ]},
                    {"question_type": "single_select", "qid": "old_aura",
                     "question": "Visual aura before the pain?",
                     "options": [
                         {"id": "yes", "label": "Yes", "action": {"action": "opd"}},
                         {"id": "no", "label": "No", "action": {"action": "opd"}}
                     ]}
                ]
            },
            "opd": {
                "headache": [
                    {"question_type": "free_text", "qid": "opd_notes",
                     "question": "Anything else?",
                     "on_submit": {"action": "terminate",
                                   "reason": "Routine outpatient referral",
                                   "metadata": {"department": [{"id": "dept001"}],
                                                "severity": [{"id": "sev003"}]}}}
                ]
            }
        }))
        .unwrap();
        Engine::new(Arc::new(RuleIndex::build(bundle)), EngineConfig::default())
    }

    #[test]
    fn full_session_end_to_end() {
        let engine = engine();
        let mut state = engine.create_session();
        let mut history = SessionHistory::new();

        engine
            .submit_answer(
                &mut state,
                &mut history,
                json!({"gender": "female", "age": 34}),
            )
            .unwrap();
        engine
            .submit_answer(&mut state, &mut history, json!({"crit_faint": false}))
            .unwrap();
        engine
            .submit_answer(
                &mut state,
                &mut history,
                json!({"primary_symptom": "headache"}),
            )
            .unwrap();
        let outcome = engine
            .submit_answer(&mut state, &mut history, json!({"chk_thunder": false}))
            .unwrap();
        match &outcome {
            StepOutcome::Questions(step) => {
                assert_eq!(step.phase, Phase::Oldcarts);
                assert_eq!(step.questions[0].qid, "old_region");
            }
            other => panic!("expected questions, got {:?}", other),
        }

        engine
            .submit_answer(&mut state, &mut history, json!("one_side"))
            .unwrap();
        engine
            .submit_answer(&mut state, &mut history, json!("no"))
            .unwrap();
        let outcome = engine
            .submit_answer(&mut state, &mut history, json!("none"))
            .unwrap();
        match outcome {
            StepOutcome::Completed(result) => {
                assert_eq!(result.reason, "Routine outpatient referral");
                assert_eq!(result.departments[0].name, "Internal Medicine");
                assert_eq!(result.severity.unwrap().id, "sev003");
            }
            other => panic!("expected completion, got {:?}", other),
        }

        // Rewind the whole session and land back at the start.
        let steps = history.len();
        for _ in 0..steps {
            assert!(engine.go_back(&mut state, &mut history));
        }
        assert_eq!(state, engine.create_session());
    }

    #[test]
    fn overrides_survive_back_navigation() {
        let engine = engine();
        let mut state = engine.create_session();
        let mut history = SessionHistory::new();
        let mut overrides = LabelOverrides::new();
        overrides.set_question_text("old_region", "Point to where it hurts");

        engine
            .submit_answer(&mut state, &mut history, json!({"gender": "male", "age": 40}))
            .unwrap();
        engine
            .submit_answer(&mut state, &mut history, json!({"crit_faint": false}))
            .unwrap();
        engine
            .submit_answer(
                &mut state,
                &mut history,
                json!({"primary_symptom": "headache"}),
            )
            .unwrap();
        let outcome = engine
            .submit_answer(&mut state, &mut history, json!({"chk_thunder": false}))
            .unwrap();

        let mut step = match outcome {
            StepOutcome::Questions(step) => step,
            other => panic!("expected questions, got {:?}", other),
        };
        overrides.apply_to_step(&mut step);
        assert_eq!(step.questions[0].text, "Point to where it hurts");

        // Overrides live outside the session state; rewinding does not
        // touch them.
        engine.go_back(&mut state, &mut history);
        assert!(!overrides.is_empty());
        let view = engine.current_step(&state);
        if let StepOutcome::Questions(mut step) = view.current {
            overrides.apply_to_step(&mut step);
        }
    }

    #[test]
    fn critical_screen_short_circuits_everything_else() {
        let engine = engine();
        let mut state = engine.create_session();
        let mut history = SessionHistory::new();
        engine
            .submit_answer(&mut state, &mut history, json!({"gender": "male", "age": 50}))
            .unwrap();
        let outcome = engine
            .submit_answer(&mut state, &mut history, json!({"crit_faint": true}))
            .unwrap();
        match outcome {
            StepOutcome::Terminated(result) => {
                assert_eq!(result.reason, "ER critical positive: crit_faint");
                assert_eq!(result.departments[0].id, "dept002");
            }
            other => panic!("expected termination, got {:?}", other),
        }
        assert!(engine
            .submit_answer(&mut state, &mut history, json!({}))
            .is_err());
    }
}
