//! The questionnaire state machine.
//!
//! Phases 0-3 (demographics, ER critical, symptom selection, ER
//! checklist) each collect one bulk submission. Phases 4-5 (OLDCARTS,
//! OPD) walk a per-symptom question tree one question at a time through
//! a FIFO pending queue: auto-evaluated questions resolve in place and
//! their actions are followed immediately; the first user-facing
//! question stops the loop and is presented.
//!
//! The phase-4 to phase-5 advance (and re-entry into phase 5) is a
//! trampoline in [`Engine::resolve_sequential`], so a chain of `opd`
//! actions cannot grow the stack.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use time::{Date, OffsetDateTime};
use triage_rules::{
    Action, ActionOption, ChecklistItem, ChoiceOption, DemographicField, DemographicKind, Question,
    QuestionClass,
};

use crate::config::EngineConfig;
use crate::error::EvalError;
use crate::filter::resolve_auto;
use crate::history::SessionHistory;
use crate::index::{RuleIndex, Source};
use crate::session::{
    Disposition, NumberConstraints, Phase, QuestionCard, QuestionsStep, SessionState, StepOutcome,
    StepView, TriageResult,
};


/// What following an action means for the resolve loop.
enum ActionSignal {
    /// Keep draining the pending queue.
    Continue,
    /// Leave the current tree and enter the OPD phase.
    AdvanceToOpd,
    /// The session is over.
    Terminal(TriageResult),
}

/// The resolution engine. Holds the immutable rule index and config;
/// all per-session data lives in [`SessionState`], so one engine serves
/// any number of concurrent sessions.
#[derive(Debug, Clone)]
pub struct Engine {
    index: Arc<RuleIndex>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(index: Arc<RuleIndex>, config: EngineConfig) -> Self {
        Engine { index, config }
    }

    pub fn index(&self) -> &RuleIndex {
        &self.index
    }

    /// A fresh session at the demographics phase.
    pub fn create_session(&self) -> SessionState {
        SessionState::new()
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit the answer for the current step and advance the session.
    ///
    /// A snapshot of the pre-submission state is pushed to `history`
    /// before any mutation; invalid submissions leave both the state
    /// and the history untouched.
    pub fn submit_answer(
        &self,
        state: &mut SessionState,
        history: &mut SessionHistory,
        value: Value,
    ) -> Result<StepOutcome, EvalError> {
        if state.terminated {
            return Err(EvalError::state("session already finished"));
        }
        let label = match state.phase {
            Phase::Oldcarts | Phase::Opd => state
                .current_question
                .clone()
                .unwrap_or_else(|| state.phase.name().to_string()),
            other => other.name().to_string(),
        };
        history.push_snapshot(label, &value, state);
        let outcome = match state.phase {
            Phase::Demographics => self.submit_demographics(state, value),
            Phase::ErCritical => self.submit_er_critical(state, value),
            Phase::SymptomSelect => self.submit_symptoms(state, value),
            Phase::ErChecklist => self.submit_er_checklist(state, value),
            Phase::Oldcarts | Phase::Opd => self.submit_sequential(state, value),
        };
        if outcome.is_err() {
            history.discard_last();
        }
        outcome
    }

    /// Pop the last history snapshot back into the session. Restoring
    /// a terminal state reopens the session. No-op on empty history.
    pub fn go_back(&self, state: &mut SessionState, history: &mut SessionHistory) -> bool {
        history.pop_restore(state)
    }

    // ── Phase 0: demographics ───────────────────────────────────────

    fn submit_demographics(
        &self,
        state: &mut SessionState,
        value: Value,
    ) -> Result<StepOutcome, EvalError> {
        state.demographics = self.validate_demographics(&value)?;
        state.phase = Phase::ErCritical;
        Ok(StepOutcome::Questions(self.er_critical_step()))
    }

    fn validate_demographics(&self, value: &Value) -> Result<BTreeMap<String, Value>, EvalError> {
        let obj = value
            .as_object()
            .ok_or_else(|| EvalError::answer("demographics", "expected an object"))?;
        let mut out = BTreeMap::new();
        for field in self.index.demographic_fields() {
            let entry = match obj.get(&field.key) {
                Some(v) if !v.is_null() => v,
                _ if field.optional => continue,
                _ => return Err(EvalError::answer(&field.key, "required field is missing")),
            };
            self.validate_field(field, entry)?;
            out.insert(field.key.clone(), entry.clone());
        }
        // Keys outside the declared form (an explicit "age", caller
        // bookkeeping) pass through unvalidated.
        for (key, v) in obj {
            if !v.is_null() && !self.is_declared_field(key) {
                out.insert(key.clone(), v.clone());
            }
        }
        Ok(out)
    }

    fn is_declared_field(&self, key: &str) -> bool {
        self.index
            .demographic_fields()
            .iter()
            .any(|f| f.key == key)
    }

    fn validate_field(&self, field: &DemographicField, value: &Value) -> Result<(), EvalError> {
        match field.kind {
            DemographicKind::Datetime => {
                let s = value
                    .as_str()
                    .ok_or_else(|| EvalError::answer(&field.key, "expected an ISO date string"))?;
                let date = parse_iso_date(s).ok_or_else(|| {
                    EvalError::answer(&field.key, "expected an ISO date (YYYY-MM-DD)")
                })?;
                if date > OffsetDateTime::now_utc().date() {
                    return Err(EvalError::answer(&field.key, "date must not be in the future"));
                }
            }
            DemographicKind::Enum => {
                let s = value
                    .as_str()
                    .ok_or_else(|| EvalError::answer(&field.key, "expected a string"))?;
                if !field.values.is_empty() && !field.values.iter().any(|v| v == s) {
                    return Err(EvalError::answer(
                        &field.key,
                        format!("'{}' is not one of the allowed values", s),
                    ));
                }
            }
            DemographicKind::Float => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| EvalError::answer(&field.key, "expected a number"))?;
                if n <= 0.0 {
                    return Err(EvalError::answer(&field.key, "expected a positive number"));
                }
            }
            DemographicKind::FromYaml => {
                let items = value
                    .as_array()
                    .ok_or_else(|| EvalError::answer(&field.key, "expected a list of names"))?;
                let known = self.index.underlying_diseases();
                for item in items {
                    let name = item
                        .as_str()
                        .ok_or_else(|| EvalError::answer(&field.key, "expected string entries"))?;
                    if !known.is_empty() && !known.iter().any(|d| d.name == name) {
                        return Err(EvalError::answer(
                            &field.key,
                            format!("unknown disease name '{}'", name),
                        ));
                    }
                }
            }
            DemographicKind::Str => {
                if !value.is_string() {
                    return Err(EvalError::answer(&field.key, "expected a string"));
                }
            }
        }
        Ok(())
    }

    // ── Phase 1: ER critical screen ─────────────────────────────────

    fn submit_er_critical(
        &self,
        state: &mut SessionState,
        value: Value,
    ) -> Result<StepOutcome, EvalError> {
        let flags = parse_flag_map(&value, "er_critical")?;
        for (qid, flag) in &flags {
            state.answers.insert(qid.clone(), Value::Bool(*flag));
        }
        state.er_critical_flags = flags;

        let positives: Vec<_> = self
            .index
            .critical_items()
            .iter()
            .filter(|item| state.er_critical_flags.get(&item.qid).copied().unwrap_or(false))
            .collect();
        if !positives.is_empty() {
            let custom: Vec<String> = positives
                .iter()
                .filter_map(|item| item.reason.clone())
                .collect();
            let reason = if custom.is_empty() {
                let qids: Vec<&str> = positives.iter().map(|i| i.qid.as_str()).collect();
                format!("ER critical positive: {}", qids.join(", "))
            } else {
                custom.join("; ")
            };
            let result = TriageResult {
                disposition: Disposition::Terminated,
                departments: vec![self.index.resolve_department(&self.config.default_department)],
                severity: Some(self.index.resolve_severity(&self.config.default_severity)),
                reason,
            };
            return Ok(self.finish(state, result));
        }
        state.phase = Phase::SymptomSelect;
        Ok(StepOutcome::Questions(self.symptom_step()))
    }

    // ── Phase 2: symptom selection ──────────────────────────────────

    fn submit_symptoms(
        &self,
        state: &mut SessionState,
        value: Value,
    ) -> Result<StepOutcome, EvalError> {
        let obj = value
            .as_object()
            .ok_or_else(|| EvalError::answer("symptoms", "expected an object"))?;
        let primary = obj
            .get("primary_symptom")
            .and_then(Value::as_str)
            .ok_or_else(|| EvalError::answer("primary_symptom", "expected a symptom name"))?;
        if !self.known_symptom(primary) {
            return Err(EvalError::UnknownSymptom {
                symptom: primary.to_string(),
            });
        }
        let secondary = match obj.get("secondary_symptoms") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut names = Vec::with_capacity(items.len());
                for item in items {
                    let name = item.as_str().ok_or_else(|| {
                        EvalError::answer("secondary_symptoms", "expected symptom names")
                    })?;
                    if !self.known_symptom(name) {
                        tracing::warn!(symptom = name, "ignoring unknown secondary symptom");
                        continue;
                    }
                    names.push(name.to_string());
                }
                names
            }
            Some(_) => {
                return Err(EvalError::answer("secondary_symptoms", "expected a list"));
            }
        };

        state.primary_symptom = Some(primary.to_string());
        state.secondary_symptoms = secondary;
        state.phase = Phase::ErChecklist;
        Ok(StepOutcome::Questions(self.checklist_step(state)))
    }

    fn known_symptom(&self, name: &str) -> bool {
        let symptoms = self.index.symptoms();
        symptoms.is_empty() || symptoms.iter().any(|s| s.name == name)
    }

    // ── Phase 3: ER checklist ───────────────────────────────────────

    fn submit_er_checklist(
        &self,
        state: &mut SessionState,
        value: Value,
    ) -> Result<StepOutcome, EvalError> {
        let flags = parse_flag_map(&value, "er_checklist")?;
        for (qid, flag) in &flags {
            state.answers.insert(qid.clone(), Value::Bool(*flag));
        }
        state.er_checklist_flags = flags;

        let pediatric = self.is_pediatric(state);
        let symptoms: Vec<String> =
            state.selected_symptoms().into_iter().map(String::from).collect();
        for symptom in &symptoms {
            for item in self.index.checklist(symptom, pediatric) {
                let flagged = state
                    .er_checklist_flags
                    .get(&item.qid)
                    .copied()
                    .unwrap_or(false);
                if flagged {
                    let result = self.checklist_result(item, pediatric);
                    return Ok(self.finish(state, result));
                }
            }
        }
        self.enter_sequential(state, Phase::Oldcarts);
        Ok(self.resolve_sequential(state))
    }

    /// The first positive checklist item decides the result. Adult
    /// items override severity via `min_severity`, pediatric items via
    /// `severity`; both fall back to the configured ER defaults.
    fn checklist_result(&self, item: &ChecklistItem, pediatric: bool) -> TriageResult {
        let severity_ref = if pediatric {
            item.severity.as_ref()
        } else {
            item.min_severity.as_ref()
        };
        let severity_id = severity_ref
            .map(|s| s.id.as_str())
            .unwrap_or(&self.config.default_severity);
        let department_id = item
            .department
            .as_ref()
            .and_then(|d| d.first())
            .map(|d| d.id.as_str())
            .unwrap_or(&self.config.default_department);
        let reason = item
            .reason
            .clone()
            .unwrap_or_else(|| format!("ER checklist positive: {}", item.qid));
        TriageResult {
            disposition: Disposition::Terminated,
            departments: vec![self.index.resolve_department(department_id)],
            severity: Some(self.index.resolve_severity(severity_id)),
            reason,
        }
    }

    // ── Phases 4-5: sequential resolution ───────────────────────────

    fn submit_sequential(
        &self,
        state: &mut SessionState,
        value: Value,
    ) -> Result<StepOutcome, EvalError> {
        let qid = state
            .current_question
            .clone()
            .ok_or_else(|| EvalError::state("no question is awaiting an answer"))?;
        let symptom = state
            .primary_symptom
            .clone()
            .ok_or_else(|| EvalError::state("no primary symptom selected"))?;
        let source = source_of(state.phase);

        state.answers.insert(qid.clone(), value.clone());
        state.current_question = None;

        let action = match self.index.question(source, &symptom, &qid) {
            Some(question) => self.user_action(question, &value),
            None => {
                tracing::warn!(%qid, %symptom, source = source.as_str(), "answered qid not in tree");
                None
            }
        };
        if let Some(action) = action {
            match self.apply_action(state, action) {
                ActionSignal::Continue => {}
                ActionSignal::AdvanceToOpd => self.enter_sequential(state, Phase::Opd),
                ActionSignal::Terminal(result) => return Ok(self.finish(state, result)),
            }
        }
        Ok(self.resolve_sequential(state))
    }

    /// The action a user's answer routes through, per question kind.
    /// An answer that matches no option routes nowhere.
    fn user_action<'a>(&self, question: &'a Question, value: &Value) -> Option<&'a Action> {
        match question {
            Question::SingleSelect { options, .. }
            | Question::ImageSingleSelect { options, .. } => {
                let chosen = match value.as_str() {
                    Some(s) => s,
                    None => {
                        tracing::warn!(qid = question.qid(), "expected an option id string");
                        return None;
                    }
                };
                match options.iter().find(|o| o.id == chosen) {
                    Some(option) => Some(&option.action),
                    None => {
                        tracing::warn!(qid = question.qid(), option = chosen, "no such option");
                        None
                    }
                }
            }
            Question::MultiSelect { next, .. } | Question::ImageMultiSelect { next, .. } => {
                Some(next)
            }
            Question::FreeText { on_submit, .. }
            | Question::FreeTextWithFields { on_submit, .. }
            | Question::NumberRange { on_submit, .. } => Some(on_submit),
            Question::Conditional { .. }
            | Question::GenderFilter { .. }
            | Question::AgeFilter { .. } => {
                tracing::warn!(qid = question.qid(), "auto-evaluated question answered directly");
                None
            }
        }
    }

    fn apply_action(&self, state: &mut SessionState, action: &Action) -> ActionSignal {
        match action {
            Action::Goto { qid } => {
                // Prepend in order, skipping answered and already-queued targets.
                let fresh: Vec<String> = qid
                    .iter()
                    .filter(|t| {
                        !state.answers.contains_key(t.as_str())
                            && !state.pending.iter().any(|p| p == *t)
                    })
                    .cloned()
                    .collect();
                state.pending.splice(0..0, fresh);
                ActionSignal::Continue
            }
            Action::Opd => ActionSignal::AdvanceToOpd,
            Action::Terminate { reason, metadata } => {
                let departments = metadata
                    .department
                    .iter()
                    .map(|d| self.index.resolve_department(&d.id))
                    .collect();
                let severity = metadata
                    .severity
                    .as_ref()
                    .and_then(|s| s.first())
                    .map(|s| self.index.resolve_severity(&s.id));
                let disposition = if state.phase < Phase::Opd {
                    Disposition::Terminated
                } else {
                    Disposition::Completed
                };
                ActionSignal::Terminal(TriageResult {
                    disposition,
                    departments,
                    severity,
                    reason: reason.clone().unwrap_or_default(),
                })
            }
        }
    }

    /// Reset the queue for a sequential phase and seed it with the
    /// tree's first question, unless that question is already answered.
    fn enter_sequential(&self, state: &mut SessionState, phase: Phase) {
        state.phase = phase;
        state.pending.clear();
        state.current_question = None;
        let source = source_of(phase);
        if let Some(symptom) = &state.primary_symptom {
            if let Some(first) = self.index.first_qid(source, symptom) {
                if !state.answers.contains_key(first) {
                    state.pending.push(first.to_string());
                }
            }
        }
    }

    /// Drain the pending queue until a user-facing question or a
    /// terminal outcome. Exhausting OLDCARTS advances to OPD; exhausting
    /// OPD completes the session.
    fn resolve_sequential(&self, state: &mut SessionState) -> StepOutcome {
        'phases: loop {
            let source = source_of(state.phase);
            let symptom = state.primary_symptom.clone().unwrap_or_default();

            while !state.pending.is_empty() {
                let qid = state.pending.remove(0);
                if state.answers.contains_key(&qid) {
                    continue;
                }
                let question = match self.index.question(source, &symptom, &qid) {
                    Some(q) => q,
                    None => {
                        tracing::warn!(%qid, %symptom, source = source.as_str(), "pending qid not in tree, skipping");
                        continue;
                    }
                };
                match question.classify() {
                    QuestionClass::AutoEval(view) => {
                        let age = self.patient_age(state);
                        let gender = self.patient_gender(state).map(str::to_string);
                        let action = resolve_auto(view, &state.answers, age, gender.as_deref());
                        let action = match action {
                            Some(a) => a,
                            None => {
                                tracing::warn!(%qid, "auto-evaluated question produced no route, skipping");
                                continue;
                            }
                        };
                        match self.apply_action(state, action) {
                            ActionSignal::Continue => {}
                            ActionSignal::AdvanceToOpd => {
                                self.enter_sequential(state, Phase::Opd);
                                continue 'phases;
                            }
                            ActionSignal::Terminal(result) => return self.finish(state, result),
                        }
                    }
                    QuestionClass::UserFacing => {
                        state.current_question = Some(qid.clone());
                        return StepOutcome::Questions(QuestionsStep {
                            phase: state.phase,
                            questions: vec![self.card_for(question, None)],
                        });
                    }
                }
            }

            match state.phase {
                Phase::Oldcarts => self.enter_sequential(state, Phase::Opd),
                _ => {
                    let result = TriageResult {
                        disposition: Disposition::Completed,
                        departments: Vec::new(),
                        severity: None,
                        reason: "All phases completed without explicit termination".to_string(),
                    };
                    return self.finish(state, result);
                }
            }
        }
    }

    fn finish(&self, state: &mut SessionState, result: TriageResult) -> StepOutcome {
        state.terminated = true;
        state.current_question = None;
        state.result = Some(result.clone());
        match result.disposition {
            Disposition::Terminated => StepOutcome::Terminated(result),
            Disposition::Completed => StepOutcome::Completed(result),
        }
    }

    // ── Patient attributes ──────────────────────────────────────────

    /// Age in years, from an explicit `age` value or derived from
    /// `date_of_birth`.
    fn patient_age(&self, state: &SessionState) -> Option<f64> {
        if let Some(v) = state.demographics.get("age") {
            if let Some(n) = v.as_f64() {
                return Some(n);
            }
            if let Some(n) = v.as_str().and_then(|s| s.trim().parse().ok()) {
                return Some(n);
            }
        }
        let dob = state.demographics.get("date_of_birth")?.as_str()?;
        let born = parse_iso_date(dob)?;
        let days = (OffsetDateTime::now_utc().date() - born).whole_days();
        Some(days as f64 / 365.25)
    }

    fn patient_gender<'a>(&self, state: &'a SessionState) -> Option<&'a str> {
        state.demographics.get("gender")?.as_str()
    }

    fn is_pediatric(&self, state: &SessionState) -> bool {
        self.patient_age(state)
            .map(|age| age < self.config.pediatric_age_threshold)
            .unwrap_or(false)
    }

    // ── Step presentation ───────────────────────────────────────────

    /// Read-only projection of the session: current phase, termination
    /// status, and the step a caller should render.
    pub fn current_step(&self, state: &SessionState) -> StepView {
        let current = if state.terminated {
            match state.result.clone() {
                Some(result) => match result.disposition {
                    Disposition::Terminated => StepOutcome::Terminated(result),
                    Disposition::Completed => StepOutcome::Completed(result),
                },
                None => StepOutcome::Completed(TriageResult {
                    disposition: Disposition::Completed,
                    departments: Vec::new(),
                    severity: None,
                    reason: String::new(),
                }),
            }
        } else {
            let step = match state.phase {
                Phase::Demographics => self.demographics_step(),
                Phase::ErCritical => self.er_critical_step(),
                Phase::SymptomSelect => self.symptom_step(),
                Phase::ErChecklist => self.checklist_step(state),
                Phase::Oldcarts | Phase::Opd => {
                    let source = source_of(state.phase);
                    let card = state.current_question.as_deref().and_then(|qid| {
                        let symptom = state.primary_symptom.as_deref()?;
                        let question = self.index.question(source, symptom, qid)?;
                        Some(self.card_for(question, None))
                    });
                    QuestionsStep {
                        phase: state.phase,
                        questions: card.into_iter().collect(),
                    }
                }
            };
            StepOutcome::Questions(step)
        };
        StepView {
            phase: state.phase,
            phase_name: state.phase.name(),
            terminated: state.terminated,
            result: state.result.clone(),
            current,
        }
    }

    fn demographics_step(&self) -> QuestionsStep {
        let questions = self
            .index
            .demographic_fields()
            .iter()
            .map(|field| QuestionCard {
                qid: field.qid.clone(),
                text: field.field_name.clone(),
                kind: field.kind.as_str().to_string(),
                options: field
                    .values
                    .iter()
                    .map(|v| ChoiceOption {
                        id: v.clone(),
                        label: v.clone(),
                        label_th: String::new(),
                    })
                    .collect(),
                fields: Vec::new(),
                constraints: None,
                image: None,
                optional: field.optional,
                symptom: None,
            })
            .collect();
        QuestionsStep {
            phase: Phase::Demographics,
            questions,
        }
    }

    fn er_critical_step(&self) -> QuestionsStep {
        let questions = self
            .index
            .critical_items()
            .iter()
            .map(|item| yes_no_card(&item.qid, &item.text, None))
            .collect();
        QuestionsStep {
            phase: Phase::ErCritical,
            questions,
        }
    }

    fn symptom_step(&self) -> QuestionsStep {
        let options: Vec<ChoiceOption> = self
            .index
            .symptoms()
            .iter()
            .map(|s| ChoiceOption {
                id: s.name.clone(),
                label: s.name.clone(),
                label_th: s.name_th.clone(),
            })
            .collect();
        let questions = vec![
            QuestionCard {
                qid: "primary_symptom".to_string(),
                text: "Primary symptom".to_string(),
                kind: "single_select".to_string(),
                options: options.clone(),
                fields: Vec::new(),
                constraints: None,
                image: None,
                optional: false,
                symptom: None,
            },
            QuestionCard {
                qid: "secondary_symptoms".to_string(),
                text: "Other symptoms".to_string(),
                kind: "multi_select".to_string(),
                options,
                fields: Vec::new(),
                constraints: None,
                image: None,
                optional: true,
                symptom: None,
            },
        ];
        QuestionsStep {
            phase: Phase::SymptomSelect,
            questions,
        }
    }

    fn checklist_step(&self, state: &SessionState) -> QuestionsStep {
        let pediatric = self.is_pediatric(state);
        let mut questions = Vec::new();
        for symptom in state.selected_symptoms() {
            for item in self.index.checklist(symptom, pediatric) {
                questions.push(yes_no_card(&item.qid, &item.text, Some(symptom)));
            }
        }
        QuestionsStep {
            phase: Phase::ErChecklist,
            questions,
        }
    }

    fn card_for(&self, question: &Question, symptom: Option<&str>) -> QuestionCard {
        let mut card = QuestionCard {
            qid: question.qid().to_string(),
            text: question.text().to_string(),
            kind: question.kind().to_string(),
            options: Vec::new(),
            fields: Vec::new(),
            constraints: None,
            image: None,
            optional: false,
            symptom: symptom.map(str::to_string),
        };
        match question {
            Question::SingleSelect { options, .. }
            | Question::GenderFilter { options, .. }
            | Question::AgeFilter { options, .. } => card.options = strip_actions(options),
            Question::ImageSingleSelect { image, options, .. } => {
                card.image = Some(image.clone());
                card.options = strip_actions(options);
            }
            Question::MultiSelect { options, .. } => card.options = options.clone(),
            Question::ImageMultiSelect { image, options, .. } => {
                card.image = Some(image.clone());
                card.options = options.clone();
            }
            Question::FreeTextWithFields { fields, .. } => card.fields = fields.clone(),
            Question::NumberRange {
                min_value,
                max_value,
                step,
                default_value,
                ..
            } => {
                card.constraints = Some(NumberConstraints {
                    min: *min_value,
                    max: *max_value,
                    step: *step,
                    default: *default_value,
                });
            }
            Question::FreeText { .. } | Question::Conditional { .. } => {}
        }
        card
    }
}

fn source_of(phase: Phase) -> Source {
    if phase == Phase::Opd {
        Source::Opd
    } else {
        Source::Oldcarts
    }
}

fn yes_no_card(qid: &str, text: &str, symptom: Option<&str>) -> QuestionCard {
    QuestionCard {
        qid: qid.to_string(),
        text: text.to_string(),
        kind: "yes_no".to_string(),
        options: Vec::new(),
        fields: Vec::new(),
        constraints: None,
        image: None,
        optional: false,
        symptom: symptom.map(str::to_string),
    }
}

fn strip_actions(options: &[ActionOption]) -> Vec<ChoiceOption> {
    options
        .iter()
        .map(|o| ChoiceOption {
            id: o.id.clone(),
            label: o.label.clone(),
            label_th: o.label_th.clone(),
        })
        .collect()
}

fn parse_flag_map(value: &Value, field: &str) -> Result<BTreeMap<String, bool>, EvalError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EvalError::answer(field, "expected an object of yes/no flags"))?;
    let mut out = BTreeMap::new();
    for (qid, v) in obj {
        let flag = v
            .as_bool()
            .ok_or_else(|| EvalError::answer(qid.clone(), "expected a boolean"))?;
        out.insert(qid.clone(), flag);
    }
    Ok(out)
}

fn parse_iso_date(s: &str) -> Option<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), format).ok()
}
