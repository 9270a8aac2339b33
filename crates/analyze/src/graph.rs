//! Shared rule-graph helpers for the C1-C5 checks.

use std::collections::{BTreeMap, BTreeSet};

use triage_rules::{Action, Question, RulesetBundle};

/// Every (source, symptom, questions) tree in the bundle, OLDCARTS
/// trees first.
pub fn all_trees(
    bundle: &RulesetBundle,
) -> impl Iterator<Item = (&'static str, &str, &[Question])> {
    bundle
        .oldcarts
        .iter()
        .map(|(s, q)| ("oldcarts", s.as_str(), q.as_slice()))
        .chain(
            bundle
                .opd
                .iter()
                .map(|(s, q)| ("opd", s.as_str(), q.as_slice())),
        )
}

/// All intra-tree goto edges of one question, in declaration order.
pub fn goto_targets(question: &Question) -> Vec<&str> {
    let mut out = Vec::new();
    for action in question.actions() {
        if let Action::Goto { qid } = action {
            out.extend(qid.iter().map(String::as_str));
        }
    }
    out
}

/// Adjacency list of one question tree, keyed by qid.
pub fn adjacency(questions: &[Question]) -> BTreeMap<&str, Vec<&str>> {
    questions
        .iter()
        .map(|q| (q.qid(), goto_targets(q)))
        .collect()
}

/// Qids reachable from the tree's first question by following goto
/// edges (auto-eval routes included).
pub fn reachable(questions: &[Question]) -> BTreeSet<&str> {
    let graph = adjacency(questions);
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&str> = questions.first().map(|q| q.qid()).into_iter().collect();
    while let Some(qid) = stack.pop() {
        if !seen.insert(qid) {
            continue;
        }
        if let Some(next) = graph.get(qid) {
            for &target in next {
                if !seen.contains(target) {
                    stack.push(target);
                }
            }
        }
    }
    seen
}

/// Whether the goto graph of one tree contains a cycle.
pub fn has_cycle(questions: &[Question]) -> bool {
    let graph = adjacency(questions);
    let mut visited = BTreeSet::new();
    let mut in_path = BTreeSet::new();
    for q in questions {
        if !visited.contains(q.qid()) && cycle_dfs(q.qid(), &graph, &mut visited, &mut in_path) {
            return true;
        }
    }
    false
}

fn cycle_dfs<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    visited: &mut BTreeSet<&'a str>,
    in_path: &mut BTreeSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_path.insert(node);
    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if in_path.contains(neighbor)
                || (!visited.contains(neighbor)
                    && cycle_dfs(neighbor, graph, visited, in_path))
            {
                return true;
            }
        }
    }
    in_path.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(doc: serde_json::Value) -> Vec<Question> {
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn reachability_follows_all_action_kinds() {
        let questions = tree(json!([
            {"question_type": "single_select", "qid": "a", "question": "",
             "options": [{"id": "x", "label": "x",
                          "action": {"action": "goto", "qid": ["b"]}}]},
            {"question_type": "conditional", "qid": "b", "question": "",
             "rules": [], "default": {"action": "goto", "qid": ["c"]}},
            {"question_type": "free_text", "qid": "c", "question": "",
             "on_submit": {"action": "opd"}},
            {"question_type": "free_text", "qid": "orphan", "question": "",
             "on_submit": {"action": "opd"}}
        ]));
        let seen = reachable(&questions);
        assert!(seen.contains("c"));
        assert!(!seen.contains("orphan"));
    }

    #[test]
    fn cycle_detection() {
        let cyclic = tree(json!([
            {"question_type": "conditional", "qid": "a", "question": "",
             "rules": [], "default": {"action": "goto", "qid": ["b"]}},
            {"question_type": "conditional", "qid": "b", "question": "",
             "rules": [], "default": {"action": "goto", "qid": ["a"]}}
        ]));
        assert!(has_cycle(&cyclic));

        let acyclic = tree(json!([
            {"question_type": "conditional", "qid": "a", "question": "",
             "rules": [], "default": {"action": "goto", "qid": ["b"]}},
            {"question_type": "free_text", "qid": "b", "question": "",
             "on_submit": {"action": "opd"}}
        ]));
        assert!(!has_cycle(&acyclic));
    }
}
