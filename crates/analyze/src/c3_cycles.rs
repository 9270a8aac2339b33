//! C3: cycles in the goto graph.
//!
//! The resolve loop has no cycle guard; its termination argument is
//! that every goto chain is finite. A cyclic tree of auto-evaluated
//! questions would spin the engine forever, so cycles are errors.

use serde::Serialize;
use triage_rules::RulesetBundle;

use crate::graph::{all_trees, has_cycle};

#[derive(Debug, Clone, Serialize)]
pub struct CyclicTree {
    pub source: String,
    pub symptom: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct C3Result {
    pub cyclic: Vec<CyclicTree>,
}

pub fn run(bundle: &RulesetBundle) -> C3Result {
    let cyclic = all_trees(bundle)
        .filter(|(_, _, questions)| has_cycle(questions))
        .map(|(source, symptom, _)| CyclicTree {
            source: source.to_string(),
            symptom: symptom.to_string(),
        })
        .collect();
    C3Result { cyclic }
}
