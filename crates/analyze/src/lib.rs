//! Static well-formedness checks for triage rulesets.
//!
//! The engine degrades gracefully at runtime (unknown qids are
//! skipped, unmatched filters produce no route), which means authoring
//! mistakes surface as silently shortened questionnaires instead of
//! crashes. These checks catch them before a ruleset ships:
//!
//! - C1: goto targets that do not exist in their tree
//! - C2: questions unreachable from the tree entry point
//! - C3: cycles in the goto graph
//! - C4: age/gender filters with coverage gaps
//! - C5: unknown department/severity/symptom references

pub mod c1_targets;
pub mod c2_reachability;
pub mod c3_cycles;
pub mod c4_filters;
pub mod c5_references;
pub mod graph;
pub mod report;

use triage_rules::RulesetBundle;

pub use report::{AnalysisReport, Finding, FindingSeverity};

/// Run every check and collect the findings.
pub fn analyze(bundle: &RulesetBundle) -> AnalysisReport {
    let mut report = AnalysisReport {
        c1_targets: c1_targets::run(bundle),
        c2_reachability: c2_reachability::run(bundle),
        c3_cycles: c3_cycles::run(bundle),
        c4_filters: c4_filters::run(bundle),
        c5_references: c5_references::run(bundle),
        checks_run: ["c1", "c2", "c3", "c4", "c5"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        findings: Vec::new(),
    };
    report.extract_findings();
    report
}
