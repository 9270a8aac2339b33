//! Read-only lookup structure built once from a ruleset bundle.
//!
//! The engine never walks the raw bundle; everything it needs is
//! indexed here: ordered question trees with O(log n) qid lookup,
//! checklists by (symptom, age bucket), and id → display resolution
//! for departments and severity levels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use triage_rules::{
    ChecklistItem, CriticalItem, DemographicField, Question, RulesetBundle, Symptom,
    UnderlyingDisease,
};

/// Which sequential question tree a qid belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    Oldcarts,
    Opd,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Oldcarts => "oldcarts",
            Source::Opd => "opd",
        }
    }
}

/// A resolved display record for a department or severity id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_th: String,
}

/// One symptom's ordered question list plus a qid lookup table.
#[derive(Debug)]
struct SymptomTree {
    questions: Vec<Question>,
    by_qid: BTreeMap<String, usize>,
}

impl SymptomTree {
    fn build(questions: Vec<Question>) -> Self {
        let by_qid = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.qid().to_string(), i))
            .collect();
        SymptomTree { questions, by_qid }
    }
}

/// Immutable rule lookup shared by every session of an [`crate::Engine`].
#[derive(Debug)]
pub struct RuleIndex {
    oldcarts: BTreeMap<String, SymptomTree>,
    opd: BTreeMap<String, SymptomTree>,
    er_adult: BTreeMap<String, Vec<ChecklistItem>>,
    er_pediatric: BTreeMap<String, Vec<ChecklistItem>>,
    er_critical: Vec<CriticalItem>,
    demographics: Vec<DemographicField>,
    symptoms: Vec<Symptom>,
    underlying_diseases: Vec<UnderlyingDisease>,
    departments: BTreeMap<String, NamedRef>,
    severities: BTreeMap<String, NamedRef>,
}

impl RuleIndex {
    /// Consume a bundle and build the lookup tables.
    pub fn build(bundle: RulesetBundle) -> Self {
        let index_trees = |trees: BTreeMap<String, Vec<Question>>| {
            trees
                .into_iter()
                .map(|(symptom, questions)| (symptom, SymptomTree::build(questions)))
                .collect()
        };
        let departments = bundle
            .departments
            .into_iter()
            .map(|d| {
                (
                    d.id.clone(),
                    NamedRef {
                        id: d.id,
                        name: d.name,
                        name_th: d.name_th,
                    },
                )
            })
            .collect();
        let severities = bundle
            .severity_levels
            .into_iter()
            .map(|s| {
                (
                    s.id.clone(),
                    NamedRef {
                        id: s.id,
                        name: s.name,
                        name_th: s.name_th,
                    },
                )
            })
            .collect();
        RuleIndex {
            oldcarts: index_trees(bundle.oldcarts),
            opd: index_trees(bundle.opd),
            er_adult: bundle.er_adult,
            er_pediatric: bundle.er_pediatric,
            er_critical: bundle.er_critical,
            demographics: bundle.demographics,
            symptoms: bundle.symptoms,
            underlying_diseases: bundle.underlying_diseases,
            departments,
            severities,
        }
    }

    fn trees(&self, source: Source) -> &BTreeMap<String, SymptomTree> {
        match source {
            Source::Oldcarts => &self.oldcarts,
            Source::Opd => &self.opd,
        }
    }

    /// Entry point of a symptom's tree: the first declared question.
    pub fn first_qid(&self, source: Source, symptom: &str) -> Option<&str> {
        self.trees(source)
            .get(symptom)?
            .questions
            .first()
            .map(|q| q.qid())
    }

    /// Look up a question by qid within one (source, symptom) tree.
    pub fn question(&self, source: Source, symptom: &str, qid: &str) -> Option<&Question> {
        let tree = self.trees(source).get(symptom)?;
        tree.by_qid.get(qid).map(|&i| &tree.questions[i])
    }

    /// All questions of one tree in declaration order.
    pub fn tree_questions(&self, source: Source, symptom: &str) -> &[Question] {
        self.trees(source)
            .get(symptom)
            .map(|t| t.questions.as_slice())
            .unwrap_or(&[])
    }

    /// The ER checklist for a symptom in the given age bucket. Symptoms
    /// without a checklist yield an empty slice.
    pub fn checklist(&self, symptom: &str, pediatric: bool) -> &[ChecklistItem] {
        let bucket = if pediatric {
            &self.er_pediatric
        } else {
            &self.er_adult
        };
        bucket.get(symptom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn critical_items(&self) -> &[CriticalItem] {
        &self.er_critical
    }

    pub fn demographic_fields(&self) -> &[DemographicField] {
        &self.demographics
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn underlying_diseases(&self) -> &[UnderlyingDisease] {
        &self.underlying_diseases
    }

    /// Resolve a department id to its display record. Unknown ids
    /// degrade to an id-only record rather than failing the result.
    pub fn resolve_department(&self, id: &str) -> NamedRef {
        self.departments.get(id).cloned().unwrap_or_else(|| {
            tracing::warn!(id, "unknown department id in ruleset, using id as name");
            NamedRef {
                id: id.to_string(),
                name: id.to_string(),
                name_th: String::new(),
            }
        })
    }

    /// Resolve a severity id to its display record, degrading like
    /// [`RuleIndex::resolve_department`].
    pub fn resolve_severity(&self, id: &str) -> NamedRef {
        self.severities.get(id).cloned().unwrap_or_else(|| {
            tracing::warn!(id, "unknown severity id in ruleset, using id as name");
            NamedRef {
                id: id.to_string(),
                name: id.to_string(),
                name_th: String::new(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> RuleIndex {
        let bundle = RulesetBundle::from_json(&json!({
            "departments": [{"id": "dept001", "name": "Emergency", "name_th": "ฉุกเฉิน"}],
            "severity_levels": [{"id": "sev001", "name": "Resuscitation", "rank": 1}],
            "er_adult": {
                "fever": [{"qid": "chk_a1", "text": "Stiff neck?"}]
            },
            "er_pediatric": {
                "fever": [{"qid": "chk_p1", "text": "Seizure?"}]
            },
            "oldcarts": {
                "fever": [
                    {"question_type": "free_text", "qid": "old_1", "question": "Onset?",
                     "on_submit": {"action": "goto", "qid": ["old_2"]}},
                    {"question_type": "free_text", "qid": "old_2", "question": "Duration?",
                     "on_submit": {"action": "opd"}}
                ]
            }
        }))
        .unwrap();
        RuleIndex::build(bundle)
    }

    #[test]
    fn first_qid_is_declaration_order() {
        let idx = index();
        assert_eq!(idx.first_qid(Source::Oldcarts, "fever"), Some("old_1"));
        assert_eq!(idx.first_qid(Source::Opd, "fever"), None);
    }

    #[test]
    fn question_lookup_by_qid() {
        let idx = index();
        let q = idx.question(Source::Oldcarts, "fever", "old_2").unwrap();
        assert_eq!(q.text(), "Duration?");
        assert!(idx.question(Source::Oldcarts, "fever", "missing").is_none());
        assert!(idx.question(Source::Oldcarts, "cough", "old_1").is_none());
    }

    #[test]
    fn checklist_selects_age_bucket() {
        let idx = index();
        assert_eq!(idx.checklist("fever", false)[0].qid, "chk_a1");
        assert_eq!(idx.checklist("fever", true)[0].qid, "chk_p1");
        assert!(idx.checklist("cough", false).is_empty());
    }

    #[test]
    fn unknown_reference_ids_degrade_to_id_only() {
        let idx = index();
        let dept = idx.resolve_department("dept001");
        assert_eq!(dept.name, "Emergency");
        let missing = idx.resolve_department("dept999");
        assert_eq!(missing.id, "dept999");
        assert_eq!(missing.name, "dept999");
        assert_eq!(idx.resolve_severity("sev001").name, "Resuscitation");
    }
}
