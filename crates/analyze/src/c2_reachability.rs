//! C2: questions unreachable from their tree's entry point.
//!
//! The first declared question is the only seed; anything the goto
//! graph cannot reach from there is dead weight in the ruleset.

use serde::Serialize;
use triage_rules::RulesetBundle;

use crate::graph::{all_trees, reachable};

#[derive(Debug, Clone, Serialize)]
pub struct TreeReachability {
    pub source: String,
    pub symptom: String,
    pub unreachable: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct C2Result {
    pub trees: Vec<TreeReachability>,
    pub has_unreachable: bool,
}

pub fn run(bundle: &RulesetBundle) -> C2Result {
    let mut trees = Vec::new();
    for (source, symptom, questions) in all_trees(bundle) {
        let seen = reachable(questions);
        let unreachable: Vec<String> = questions
            .iter()
            .map(|q| q.qid())
            .filter(|qid| !seen.contains(qid))
            .map(str::to_string)
            .collect();
        if !unreachable.is_empty() {
            trees.push(TreeReachability {
                source: source.to_string(),
                symptom: symptom.to_string(),
                unreachable,
            });
        }
    }
    let has_unreachable = !trees.is_empty();
    C2Result {
        trees,
        has_unreachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn orphan_questions_are_flagged() {
        let bundle = RulesetBundle::from_json(&json!({
            "oldcarts": {
                "fever": [
                    {"question_type": "free_text", "qid": "q1", "question": "",
                     "on_submit": {"action": "opd"}},
                    {"question_type": "free_text", "qid": "q_orphan", "question": "",
                     "on_submit": {"action": "opd"}}
                ]
            }
        }))
        .unwrap();
        let result = run(&bundle);
        assert!(result.has_unreachable);
        assert_eq!(result.trees[0].unreachable, vec!["q_orphan"]);
    }

    #[test]
    fn fully_connected_tree_is_clean() {
        let bundle = RulesetBundle::from_json(&json!({
            "oldcarts": {
                "fever": [
                    {"question_type": "free_text", "qid": "q1", "question": "",
                     "on_submit": {"action": "goto", "qid": ["q2"]}},
                    {"question_type": "free_text", "qid": "q2", "question": "",
                     "on_submit": {"action": "opd"}}
                ]
            }
        }))
        .unwrap();
        assert!(!run(&bundle).has_unreachable);
    }
}
