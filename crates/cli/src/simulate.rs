//! Scripted session replay.
//!
//! Feeds a JSON array of answers through a fresh session in order and
//! shows each presented step. Useful for smoke-testing a ruleset
//! change against known patient journeys.

use std::fs;
use std::path::Path;
use std::process;
use std::sync::Arc;

use serde_json::{json, Value};
use triage_eval::{Engine, EngineConfig, RuleIndex, SessionHistory, StepOutcome, TriageResult};

use crate::OutputFormat;

pub(crate) fn cmd_simulate(ruleset: &Path, script: &Path, output: OutputFormat, quiet: bool) {
    let bundle = crate::load_bundle(ruleset);
    let engine = Engine::new(Arc::new(RuleIndex::build(bundle)), EngineConfig::default());
    let answers = load_script(script);

    let mut state = engine.create_session();
    let mut history = SessionHistory::new();
    let mut transcript: Vec<Value> = Vec::new();

    if output == OutputFormat::Text && !quiet {
        println!("session started at phase: {}", state.phase.name());
    }

    for (i, answer) in answers.iter().enumerate() {
        if state.terminated {
            eprintln!("warning: {} unused answer(s) left in script", answers.len() - i);
            break;
        }
        match engine.submit_answer(&mut state, &mut history, answer.clone()) {
            Ok(outcome) => {
                if output == OutputFormat::Text {
                    print_outcome(&outcome, quiet);
                }
                transcript.push(json!({"submitted": answer, "outcome": outcome}));
            }
            Err(e) => {
                eprintln!("error at script step {}: {}", i + 1, e);
                process::exit(1);
            }
        }
    }

    match output {
        OutputFormat::Json => {
            let doc = json!({
                "steps": transcript,
                "final": engine.current_step(&state),
            });
            let pretty = serde_json::to_string_pretty(&doc)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if !state.terminated && !quiet {
                println!(
                    "script exhausted; session still awaiting input at phase: {}",
                    state.phase.name()
                );
            }
        }
    }
}

fn load_script(path: &Path) -> Vec<Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            eprintln!("error: {} must contain a JSON array of answers", path.display());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {} is not valid JSON: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn print_outcome(outcome: &StepOutcome, quiet: bool) {
    match outcome {
        StepOutcome::Questions(step) => {
            if quiet {
                return;
            }
            println!(
                "-> {} question(s) at phase: {}",
                step.questions.len(),
                step.phase.name()
            );
            for card in &step.questions {
                println!("   [{}] {}", card.qid, card.text);
            }
        }
        StepOutcome::Terminated(result) => {
            println!("-> terminated: {}", result.reason);
            print_result(result);
        }
        StepOutcome::Completed(result) => {
            println!("-> completed: {}", result.reason);
            print_result(result);
        }
    }
}

fn print_result(result: &TriageResult) {
    for dept in &result.departments {
        println!("   department: {} ({})", dept.name, dept.id);
    }
    if let Some(sev) = &result.severity {
        println!("   severity: {} ({})", sev.name, sev.id);
    }
}
