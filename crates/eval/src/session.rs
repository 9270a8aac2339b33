//! Session state and the step payloads presented to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use triage_rules::{ChoiceOption, TextField};

use crate::index::NamedRef;

/// The six questionnaire phases, in order. Demographics through the ER
/// checklist collect their whole phase in one submission; OLDCARTS and
/// OPD walk their question trees one question at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Demographics,
    ErCritical,
    SymptomSelect,
    ErChecklist,
    Oldcarts,
    Opd,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Demographics => "Demographics",
            Phase::ErCritical => "ER Critical Screen",
            Phase::SymptomSelect => "Symptom Selection",
            Phase::ErChecklist => "ER Checklist",
            Phase::Oldcarts => "OLDCARTS",
            Phase::Opd => "OPD",
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Phase::Demographics => 0,
            Phase::ErCritical => 1,
            Phase::SymptomSelect => 2,
            Phase::ErChecklist => 3,
            Phase::Oldcarts => 4,
            Phase::Opd => 5,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// A terminate action or positive screening item fired before OPD.
    Terminated,
    /// The OPD phase finished, by exhaustion or an in-phase terminate.
    Completed,
}

/// The final triage outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub disposition: Disposition,
    /// Recommended departments, resolved to display records. Empty when
    /// the terminating action named none.
    pub departments: Vec<NamedRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<NamedRef>,
    pub reason: String,
}

/// Complete per-session state. Plain data, cheap to clone; history
/// snapshots are structural copies of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    /// Validated phase-0 values keyed by field key ("gender", ...).
    pub demographics: BTreeMap<String, Value>,
    /// Every recorded answer keyed by qid, across all phases.
    pub answers: BTreeMap<String, Value>,
    pub primary_symptom: Option<String>,
    pub secondary_symptoms: Vec<String>,
    pub er_critical_flags: BTreeMap<String, bool>,
    pub er_checklist_flags: BTreeMap<String, bool>,
    /// FIFO queue of qids awaiting resolution in the sequential phases.
    /// Never contains an already-answered qid.
    pub pending: Vec<String>,
    /// The user-facing question currently awaiting an answer.
    pub current_question: Option<String>,
    pub terminated: bool,
    pub result: Option<TriageResult>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            phase: Phase::Demographics,
            demographics: BTreeMap::new(),
            answers: BTreeMap::new(),
            primary_symptom: None,
            secondary_symptoms: Vec::new(),
            er_critical_flags: BTreeMap::new(),
            er_checklist_flags: BTreeMap::new(),
            pending: Vec::new(),
            current_question: None,
            terminated: false,
            result: None,
        }
    }

    /// Primary symptom first, then secondaries in selection order.
    pub fn selected_symptoms(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(1 + self.secondary_symptoms.len());
        if let Some(p) = &self.primary_symptom {
            out.push(p.as_str());
        }
        for s in &self.secondary_symptoms {
            if Some(s) != self.primary_symptom.as_ref() {
                out.push(s.as_str());
            }
        }
        out
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric input constraints of a number_range card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberConstraints {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
}

/// One question as presented to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCard {
    pub qid: String,
    pub text: String,
    /// Wire-level question kind ("single_select", "yes_no", ...).
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TextField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<NumberConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub optional: bool,
    /// Checklist provenance: which symptom contributed this card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,
}

/// The questions a phase currently presents. Bulk phases list the whole
/// form; sequential phases list exactly one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsStep {
    pub phase: Phase,
    pub questions: Vec<QuestionCard>,
}

/// What a submission produced: more questions or a final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
    Questions(QuestionsStep),
    Terminated(TriageResult),
    Completed(TriageResult),
}

/// Read-only projection of where a session stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub phase: Phase,
    pub phase_name: &'static str,
    pub terminated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TriageResult>,
    pub current: StepOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Demographics < Phase::Opd);
        assert!(Phase::ErChecklist < Phase::Oldcarts);
        assert_eq!(Phase::Opd.index(), 5);
        assert_eq!(Phase::ErCritical.name(), "ER Critical Screen");
    }

    #[test]
    fn selected_symptoms_deduplicates_primary() {
        let mut state = SessionState::new();
        state.primary_symptom = Some("fever".to_string());
        state.secondary_symptoms = vec!["cough".to_string(), "fever".to_string()];
        assert_eq!(state.selected_symptoms(), vec!["fever", "cough"]);
    }

    #[test]
    fn new_session_starts_clean() {
        let state = SessionState::new();
        assert_eq!(state.phase, Phase::Demographics);
        assert!(!state.terminated);
        assert!(state.pending.is_empty());
        assert!(state.current_question.is_none());
    }
}
