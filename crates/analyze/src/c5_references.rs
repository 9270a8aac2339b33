//! C5: department, severity, and symptom references.
//!
//! Terminate actions and checklist items carry ids into the reference
//! tables; the engine degrades unknown ids to id-only display records,
//! so the mismatch only shows up in front of the patient. Tree keys
//! that match no declared symptom are unreachable by selection.

use serde::Serialize;
use triage_rules::{Action, RulesetBundle};

use crate::graph::all_trees;

#[derive(Debug, Clone, Serialize)]
pub struct UnknownRef {
    /// "department" or "severity".
    pub table: String,
    pub id: String,
    /// Where the reference appears (qid or checklist item).
    pub context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct C5Result {
    pub unknown_refs: Vec<UnknownRef>,
    pub unknown_tree_symptoms: Vec<String>,
}

pub fn run(bundle: &RulesetBundle) -> C5Result {
    let departments: std::collections::BTreeSet<&str> =
        bundle.departments.iter().map(|d| d.id.as_str()).collect();
    let severities: std::collections::BTreeSet<&str> =
        bundle.severity_levels.iter().map(|s| s.id.as_str()).collect();
    let mut unknown_refs = Vec::new();

    let check_dept = |id: &str, context: &str, out: &mut Vec<UnknownRef>| {
        if !departments.is_empty() && !departments.contains(id) {
            out.push(UnknownRef {
                table: "department".to_string(),
                id: id.to_string(),
                context: context.to_string(),
            });
        }
    };
    let check_sev = |id: &str, context: &str, out: &mut Vec<UnknownRef>| {
        if !severities.is_empty() && !severities.contains(id) {
            out.push(UnknownRef {
                table: "severity".to_string(),
                id: id.to_string(),
                context: context.to_string(),
            });
        }
    };

    for items in bundle.er_adult.values().chain(bundle.er_pediatric.values()) {
        for item in items {
            for sev in item.min_severity.iter().chain(item.severity.iter()) {
                check_sev(&sev.id, &item.qid, &mut unknown_refs);
            }
            for dept in item.department.iter().flatten() {
                check_dept(&dept.id, &item.qid, &mut unknown_refs);
            }
        }
    }
    for (_, _, questions) in all_trees(bundle) {
        for question in questions {
            for action in question.actions() {
                if let Action::Terminate { metadata, .. } = action {
                    for dept in &metadata.department {
                        check_dept(&dept.id, question.qid(), &mut unknown_refs);
                    }
                    for sev in metadata.severity.iter().flatten() {
                        check_sev(&sev.id, question.qid(), &mut unknown_refs);
                    }
                }
            }
        }
    }

    let symptom_names: std::collections::BTreeSet<&str> =
        bundle.symptoms.iter().map(|s| s.name.as_str()).collect();
    let mut unknown_tree_symptoms: Vec<String> = Vec::new();
    if !symptom_names.is_empty() {
        for key in bundle
            .oldcarts
            .keys()
            .chain(bundle.opd.keys())
            .chain(bundle.er_adult.keys())
            .chain(bundle.er_pediatric.keys())
        {
            if !symptom_names.contains(key.as_str())
                && !unknown_tree_symptoms.contains(key)
            {
                unknown_tree_symptoms.push(key.clone());
            }
        }
    }

    C5Result {
        unknown_refs,
        unknown_tree_symptoms,
    }
}
