//! Typed structs representing the triage ruleset JSON schema.
//!
//! These types cover the superset of fields consumed by triage-eval,
//! triage-analyze, and triage-cli. Question and Action are internally
//! tagged enums dispatched on `question_type` / `action`, matching the
//! discriminated shapes authored in the ruleset files.

use serde::{Deserialize, Serialize};

// ── Reference data ──────────────────────────────────────────────────

/// A hospital department record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_th: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A severity level record. `rank` orders levels from most to least
/// urgent (lower rank is more urgent).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Severity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub rank: u32,
}

/// A presenting symptom that keys the OLDCARTS / OPD question trees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symptom {
    pub name: String,
    #[serde(default)]
    pub name_th: String,
}

/// An underlying disease name accepted by `from_yaml` demographic fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnderlyingDisease {
    pub name: String,
    #[serde(default)]
    pub name_th: String,
}

/// A department reference embedded in actions and checklist items.
/// Only the id is authoritative; display fields resolve through the
/// department table at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartmentRef {
    pub id: String,
}

/// A severity reference embedded in actions and checklist items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityRef {
    pub id: String,
}

// ── Demographics ────────────────────────────────────────────────────

/// Value type of a demographic field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DemographicKind {
    /// ISO-8601 date, must not be in the future (e.g. date of birth).
    Datetime,
    /// One of the declared `values`.
    Enum,
    /// Positive number.
    Float,
    /// List of names drawn from the underlying-disease table.
    FromYaml,
    /// Free-form string.
    Str,
}

impl DemographicKind {
    /// The wire-level `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DemographicKind::Datetime => "datetime",
            DemographicKind::Enum => "enum",
            DemographicKind::Float => "float",
            DemographicKind::FromYaml => "from_yaml",
            DemographicKind::Str => "str",
        }
    }
}

/// One field of the phase-0 demographics form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemographicField {
    pub qid: String,
    /// Storage key in the session demographics map (e.g. "gender").
    pub key: String,
    pub field_name: String,
    #[serde(default)]
    pub field_name_th: String,
    #[serde(rename = "type")]
    pub kind: DemographicKind,
    /// Allowed values for `enum` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default)]
    pub optional: bool,
}

// ── ER screening items ──────────────────────────────────────────────

/// A phase-1 critical yes/no item. Any positive answer terminates the
/// session with the configured ER defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CriticalItem {
    pub qid: String,
    pub text: String,
    #[serde(default)]
    pub text_th: String,
    /// Custom termination reason, used verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A phase-3 checklist yes/no item, keyed by symptom and age bucket.
///
/// Adult items carry `min_severity`, pediatric items carry `severity`;
/// both act as a direct severity override for the termination result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub qid: String,
    pub text: String,
    #[serde(default)]
    pub text_th: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<SeverityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Vec<DepartmentRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ── Actions ─────────────────────────────────────────────────────────

/// Result metadata attached to a terminate action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TerminateMetadata {
    #[serde(default)]
    pub department: Vec<DepartmentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Vec<SeverityRef>>,
}

/// A routing action attached to question options and submit handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Prepend the listed qids to the front of the pending queue.
    Goto { qid: Vec<String> },
    /// Leave the current tree and enter the OPD phase.
    Opd,
    /// End the session with a triage result.
    Terminate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default)]
        metadata: TerminateMetadata,
    },
}

// ── Predicates ──────────────────────────────────────────────────────

/// Comparison operator of a conditional predicate.
///
/// `Unknown` absorbs unrecognized operator strings at deserialization
/// time; such predicates evaluate to false instead of failing the
/// whole bundle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Between,
    Contains,
    NotContains,
    ContainsAny,
    ContainsAll,
    Matches,
    Unknown,
}

impl From<String> for CompareOp {
    fn from(s: String) -> Self {
        match s.as_str() {
            "eq" => CompareOp::Eq,
            "ne" => CompareOp::Ne,
            "lt" => CompareOp::Lt,
            "le" | "lte" => CompareOp::Le,
            "gt" => CompareOp::Gt,
            "ge" | "gte" => CompareOp::Ge,
            "between" => CompareOp::Between,
            "contains" => CompareOp::Contains,
            "not_contains" => CompareOp::NotContains,
            "contains_any" => CompareOp::ContainsAny,
            "contains_all" => CompareOp::ContainsAll,
            "matches" => CompareOp::Matches,
            _ => CompareOp::Unknown,
        }
    }
}

/// A single predicate over a previously recorded answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Predicate {
    /// Question whose answer is inspected.
    pub qid: String,
    /// Sub-field to extract when the answer is an object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub op: CompareOp,
    pub value: serde_json::Value,
}

/// One arm of a conditional question: all predicates must hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionalRule {
    pub when: Vec<Predicate>,
    pub then: Action,
}

// ── Questions ───────────────────────────────────────────────────────

/// A selectable option carrying its own routing action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub label_th: String,
    pub action: Action,
}

/// A selectable option with no action of its own (multi-select).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub label_th: String,
}

/// A named sub-field of a free-text question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub label_th: String,
}

fn default_step() -> f64 {
    1.0
}

/// A node of a per-symptom question tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum Question {
    FreeText {
        qid: String,
        question: String,
        on_submit: Action,
    },
    FreeTextWithFields {
        qid: String,
        question: String,
        fields: Vec<TextField>,
        on_submit: Action,
    },
    NumberRange {
        qid: String,
        question: String,
        min_value: f64,
        max_value: f64,
        #[serde(default = "default_step")]
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<f64>,
        on_submit: Action,
    },
    SingleSelect {
        qid: String,
        question: String,
        options: Vec<ActionOption>,
    },
    MultiSelect {
        qid: String,
        question: String,
        options: Vec<ChoiceOption>,
        next: Action,
    },
    ImageSingleSelect {
        qid: String,
        question: String,
        image: String,
        options: Vec<ActionOption>,
    },
    ImageMultiSelect {
        qid: String,
        question: String,
        image: String,
        options: Vec<ChoiceOption>,
        next: Action,
    },
    /// Auto-evaluated: first rule whose predicates all hold wins,
    /// otherwise the default action.
    Conditional {
        qid: String,
        question: String,
        rules: Vec<ConditionalRule>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Action>,
    },
    /// Auto-evaluated against the patient's gender.
    GenderFilter {
        qid: String,
        question: String,
        options: Vec<ActionOption>,
    },
    /// Auto-evaluated against the patient's age.
    AgeFilter {
        qid: String,
        question: String,
        options: Vec<ActionOption>,
    },
}

/// Borrowed view of an auto-evaluated question's routing data.
#[derive(Debug, Clone, Copy)]
pub enum AutoEvalView<'a> {
    Conditional {
        rules: &'a [ConditionalRule],
        default: Option<&'a Action>,
    },
    AgeFilter {
        options: &'a [ActionOption],
    },
    GenderFilter {
        options: &'a [ActionOption],
    },
}

/// Resolution class of a question: evaluated by the engine without
/// user input, or presented to the caller.
#[derive(Debug, Clone, Copy)]
pub enum QuestionClass<'a> {
    AutoEval(AutoEvalView<'a>),
    UserFacing,
}

impl Question {
    pub fn qid(&self) -> &str {
        match self {
            Question::FreeText { qid, .. }
            | Question::FreeTextWithFields { qid, .. }
            | Question::NumberRange { qid, .. }
            | Question::SingleSelect { qid, .. }
            | Question::MultiSelect { qid, .. }
            | Question::ImageSingleSelect { qid, .. }
            | Question::ImageMultiSelect { qid, .. }
            | Question::Conditional { qid, .. }
            | Question::GenderFilter { qid, .. }
            | Question::AgeFilter { qid, .. } => qid,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Question::FreeText { question, .. }
            | Question::FreeTextWithFields { question, .. }
            | Question::NumberRange { question, .. }
            | Question::SingleSelect { question, .. }
            | Question::MultiSelect { question, .. }
            | Question::ImageSingleSelect { question, .. }
            | Question::ImageMultiSelect { question, .. }
            | Question::Conditional { question, .. }
            | Question::GenderFilter { question, .. }
            | Question::AgeFilter { question, .. } => question,
        }
    }

    /// The wire-level `question_type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Question::FreeText { .. } => "free_text",
            Question::FreeTextWithFields { .. } => "free_text_with_fields",
            Question::NumberRange { .. } => "number_range",
            Question::SingleSelect { .. } => "single_select",
            Question::MultiSelect { .. } => "multi_select",
            Question::ImageSingleSelect { .. } => "image_single_select",
            Question::ImageMultiSelect { .. } => "image_multi_select",
            Question::Conditional { .. } => "conditional",
            Question::GenderFilter { .. } => "gender_filter",
            Question::AgeFilter { .. } => "age_filter",
        }
    }

    /// Classify this question for the resolve loop. The match is
    /// exhaustive, so adding a variant forces a routing decision here.
    pub fn classify(&self) -> QuestionClass<'_> {
        match self {
            Question::Conditional { rules, default, .. } => {
                QuestionClass::AutoEval(AutoEvalView::Conditional {
                    rules,
                    default: default.as_ref(),
                })
            }
            Question::AgeFilter { options, .. } => {
                QuestionClass::AutoEval(AutoEvalView::AgeFilter { options })
            }
            Question::GenderFilter { options, .. } => {
                QuestionClass::AutoEval(AutoEvalView::GenderFilter { options })
            }
            Question::FreeText { .. }
            | Question::FreeTextWithFields { .. }
            | Question::NumberRange { .. }
            | Question::SingleSelect { .. }
            | Question::MultiSelect { .. }
            | Question::ImageSingleSelect { .. }
            | Question::ImageMultiSelect { .. } => QuestionClass::UserFacing,
        }
    }

    /// All actions this question can route through, in declaration order.
    /// Used by static analysis to walk the rule graph.
    pub fn actions(&self) -> Vec<&Action> {
        match self {
            Question::FreeText { on_submit, .. }
            | Question::FreeTextWithFields { on_submit, .. }
            | Question::NumberRange { on_submit, .. } => vec![on_submit],
            Question::SingleSelect { options, .. }
            | Question::ImageSingleSelect { options, .. }
            | Question::GenderFilter { options, .. }
            | Question::AgeFilter { options, .. } => {
                options.iter().map(|o| &o.action).collect()
            }
            Question::MultiSelect { next, .. } | Question::ImageMultiSelect { next, .. } => {
                vec![next]
            }
            Question::Conditional { rules, default, .. } => {
                let mut out: Vec<&Action> = rules.iter().map(|r| &r.then).collect();
                if let Some(d) = default {
                    out.push(d);
                }
                out
            }
        }
    }
}
