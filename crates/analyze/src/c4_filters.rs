//! C4: age and gender filter coverage.
//!
//! An age filter whose arms leave gaps resolves those ages through the
//! last-option fallback, which is rarely what the author meant. A
//! gender filter with a single arm stalls the other gender entirely
//! (the engine drops the question and drains the phase).

use serde::Serialize;
use triage_eval::filter::parse_age_arm;
use triage_rules::{Question, RulesetBundle};

use crate::graph::all_trees;

#[derive(Debug, Clone, Serialize)]
pub struct FilterIssue {
    pub source: String,
    pub symptom: String,
    pub qid: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct C4Result {
    pub age_filter_issues: Vec<FilterIssue>,
    pub gender_filter_issues: Vec<FilterIssue>,
}

/// Ages probed for coverage gaps, in half-year steps.
const MAX_PROBE_AGE: u32 = 120;

pub fn run(bundle: &RulesetBundle) -> C4Result {
    let mut age_filter_issues = Vec::new();
    let mut gender_filter_issues = Vec::new();
    for (source, symptom, questions) in all_trees(bundle) {
        for question in questions {
            match question {
                Question::AgeFilter { qid, options, .. } => {
                    let arms: Vec<_> = options.iter().filter_map(parse_age_arm).collect();
                    let detail = if arms.is_empty() {
                        Some("no option encodes an age threshold; every age takes the last-option fallback".to_string())
                    } else if let Some(age) = first_gap(&arms) {
                        Some(format!(
                            "no arm covers age {}; those ages take the last-option fallback",
                            age
                        ))
                    } else {
                        None
                    };
                    if let Some(detail) = detail {
                        age_filter_issues.push(FilterIssue {
                            source: source.to_string(),
                            symptom: symptom.to_string(),
                            qid: qid.clone(),
                            detail,
                        });
                    }
                }
                Question::GenderFilter { qid, options, .. } if options.len() < 2 => {
                    gender_filter_issues.push(FilterIssue {
                        source: source.to_string(),
                        symptom: symptom.to_string(),
                        qid: qid.clone(),
                        detail: format!(
                            "only {} option(s); unmatched genders produce no route",
                            options.len()
                        ),
                    });
                }
                _ => {}
            }
        }
    }
    C4Result {
        age_filter_issues,
        gender_filter_issues,
    }
}

fn first_gap(arms: &[triage_eval::filter::AgeArm]) -> Option<f64> {
    (0..=MAX_PROBE_AGE * 2)
        .map(|half| f64::from(half) / 2.0)
        .find(|&age| !arms.iter().any(|arm| arm.accepts(age)))
}
