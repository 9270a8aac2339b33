//! Display-text overrides applied on top of presented cards.
//!
//! Overrides are deliberately not part of [`crate::SessionState`]:
//! they are never captured by history snapshots and survive a session
//! being reset or rewound.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::{QuestionCard, QuestionsStep};

/// Replacement display strings for question texts and option labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelOverrides {
    questions: BTreeMap<String, String>,
    /// Keyed by `"{qid}/{option_id}"`.
    options: BTreeMap<String, String>,
}

impl LabelOverrides {
    pub fn new() -> Self {
        LabelOverrides::default()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() && self.options.is_empty()
    }

    pub fn set_question_text(&mut self, qid: impl Into<String>, text: impl Into<String>) {
        self.questions.insert(qid.into(), text.into());
    }

    pub fn set_option_label(
        &mut self,
        qid: &str,
        option_id: &str,
        label: impl Into<String>,
    ) {
        self.options
            .insert(format!("{}/{}", qid, option_id), label.into());
    }

    /// Rewrite one card's display strings in place.
    pub fn apply_to_card(&self, card: &mut QuestionCard) {
        if let Some(text) = self.questions.get(&card.qid) {
            card.text = text.clone();
        }
        for option in &mut card.options {
            if let Some(label) = self.options.get(&format!("{}/{}", card.qid, option.id)) {
                option.label = label.clone();
            }
        }
    }

    /// Rewrite every card of a presented step.
    pub fn apply_to_step(&self, step: &mut QuestionsStep) {
        for card in &mut step.questions {
            self.apply_to_card(card);
        }
    }
}
