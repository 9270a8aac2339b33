//! Aggregated report over the C1-C5 checks.

use serde::Serialize;

use crate::c1_targets::C1Result;
use crate::c2_reachability::C2Result;
use crate::c3_cycles::C3Result;
use crate::c4_filters::C4Result;
use crate::c5_references::C5Result;

/// Severity of a finding. Errors break the engine's behavior (dropped
/// branches, unbounded loops); warnings degrade it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingSeverity {
    Warning,
    Error,
}

/// A notable finding extracted from a check result.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub check: String,
    pub severity: FindingSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qid: Option<String>,
}

/// All check results plus the extracted findings.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub c1_targets: C1Result,
    pub c2_reachability: C2Result,
    pub c3_cycles: C3Result,
    pub c4_filters: C4Result,
    pub c5_references: C5Result,
    pub checks_run: Vec<String>,
    pub findings: Vec<Finding>,
}

impl AnalysisReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Error)
    }

    /// Populate `findings` from the check results.
    pub fn extract_findings(&mut self) {
        self.findings.clear();

        for m in &self.c1_targets.missing {
            self.findings.push(Finding {
                check: "c1".to_string(),
                severity: FindingSeverity::Error,
                message: format!(
                    "goto target '{}' from '{}' does not exist in the {} tree for '{}'",
                    m.target, m.qid, m.source, m.symptom
                ),
                symptom: Some(m.symptom.clone()),
                qid: Some(m.qid.clone()),
            });
        }

        for tree in &self.c2_reachability.trees {
            self.findings.push(Finding {
                check: "c2".to_string(),
                severity: FindingSeverity::Warning,
                message: format!(
                    "{} tree for '{}' has {} unreachable question(s): {}",
                    tree.source,
                    tree.symptom,
                    tree.unreachable.len(),
                    tree.unreachable.join(", ")
                ),
                symptom: Some(tree.symptom.clone()),
                qid: None,
            });
        }

        for tree in &self.c3_cycles.cyclic {
            self.findings.push(Finding {
                check: "c3".to_string(),
                severity: FindingSeverity::Error,
                message: format!(
                    "{} tree for '{}' contains a goto cycle",
                    tree.source, tree.symptom
                ),
                symptom: Some(tree.symptom.clone()),
                qid: None,
            });
        }

        for issue in self
            .c4_filters
            .age_filter_issues
            .iter()
            .chain(self.c4_filters.gender_filter_issues.iter())
        {
            self.findings.push(Finding {
                check: "c4".to_string(),
                severity: FindingSeverity::Warning,
                message: format!("filter '{}': {}", issue.qid, issue.detail),
                symptom: Some(issue.symptom.clone()),
                qid: Some(issue.qid.clone()),
            });
        }

        for r in &self.c5_references.unknown_refs {
            self.findings.push(Finding {
                check: "c5".to_string(),
                severity: FindingSeverity::Warning,
                message: format!("unknown {} id '{}' referenced by '{}'", r.table, r.id, r.context),
                symptom: None,
                qid: Some(r.context.clone()),
            });
        }
        for symptom in &self.c5_references.unknown_tree_symptoms {
            self.findings.push(Finding {
                check: "c5".to_string(),
                severity: FindingSeverity::Warning,
                message: format!("tree key '{}' matches no declared symptom", symptom),
                symptom: Some(symptom.clone()),
                qid: None,
            });
        }

        // Deterministic output ordering.
        self.findings.sort_by(|a, b| {
            a.check
                .cmp(&b.check)
                .then_with(|| b.severity.cmp(&a.severity))
                .then_with(|| a.message.cmp(&b.message))
        });
    }
}
