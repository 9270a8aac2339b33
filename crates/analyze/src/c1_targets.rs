//! C1: every goto target must exist in its own tree.
//!
//! The engine skips unknown pending qids at runtime, so a bad target
//! silently drops a branch of the questionnaire.

use serde::Serialize;
use triage_rules::RulesetBundle;

use crate::graph::{all_trees, goto_targets};

#[derive(Debug, Clone, Serialize)]
pub struct MissingTarget {
    pub source: String,
    pub symptom: String,
    /// The question carrying the dangling edge.
    pub qid: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct C1Result {
    pub missing: Vec<MissingTarget>,
}

pub fn run(bundle: &RulesetBundle) -> C1Result {
    let mut missing = Vec::new();
    for (source, symptom, questions) in all_trees(bundle) {
        let known: std::collections::BTreeSet<&str> =
            questions.iter().map(|q| q.qid()).collect();
        for question in questions {
            for target in goto_targets(question) {
                if !known.contains(target) {
                    missing.push(MissingTarget {
                        source: source.to_string(),
                        symptom: symptom.to_string(),
                        qid: question.qid().to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
    }
    C1Result { missing }
}
