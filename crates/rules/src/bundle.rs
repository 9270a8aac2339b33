//! Top-level ruleset bundle and its deserialization entry point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RulesetError;
use crate::types::{
    ChecklistItem, CriticalItem, DemographicField, Department, Question, Severity, Symptom,
    UnderlyingDisease,
};

/// The complete ruleset consumed by the engine: reference tables,
/// screening items, and the per-symptom question trees.
///
/// Question trees are maps from symptom name to an ordered question
/// list; the first list entry is the tree's entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesetBundle {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub severity_levels: Vec<Severity>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub underlying_diseases: Vec<UnderlyingDisease>,
    #[serde(default)]
    pub demographics: Vec<DemographicField>,
    #[serde(default)]
    pub er_critical: Vec<CriticalItem>,
    #[serde(default)]
    pub er_adult: BTreeMap<String, Vec<ChecklistItem>>,
    #[serde(default)]
    pub er_pediatric: BTreeMap<String, Vec<ChecklistItem>>,
    #[serde(default)]
    pub oldcarts: BTreeMap<String, Vec<Question>>,
    #[serde(default)]
    pub opd: BTreeMap<String, Vec<Question>>,
}

impl RulesetBundle {
    /// Parse a bundle from already-loaded JSON and reject trees with
    /// duplicate qids. All sections are optional; an empty object is a
    /// valid (if useless) bundle.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, RulesetError> {
        let bundle: RulesetBundle = serde_json::from_value(value.clone())?;
        bundle.check_unique_qids("oldcarts", &bundle.oldcarts)?;
        bundle.check_unique_qids("opd", &bundle.opd)?;
        Ok(bundle)
    }

    fn check_unique_qids(
        &self,
        source_name: &str,
        trees: &BTreeMap<String, Vec<Question>>,
    ) -> Result<(), RulesetError> {
        for (symptom, questions) in trees {
            let mut seen = std::collections::BTreeSet::new();
            for q in questions {
                if !seen.insert(q.qid()) {
                    return Err(RulesetError::DuplicateQid {
                        source_name: source_name.to_string(),
                        symptom: symptom.clone(),
                        qid: q.qid().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
