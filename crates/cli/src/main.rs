mod simulate;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use triage_analyze::FindingSeverity;
use triage_rules::RulesetBundle;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Triage ruleset toolchain.
#[derive(Parser)]
#[command(name = "triage", version, about = "Triage ruleset toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run static well-formedness checks on a ruleset
    Analyze {
        /// Path to the ruleset JSON file
        ruleset: PathBuf,
    },

    /// Replay a scripted answer sequence through the engine
    Simulate {
        /// Path to the ruleset JSON file
        ruleset: PathBuf,
        /// Path to a JSON array of answers, in submission order
        #[arg(long)]
        script: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { ruleset } => {
            cmd_analyze(&ruleset, cli.output, cli.quiet);
        }
        Commands::Simulate { ruleset, script } => {
            simulate::cmd_simulate(&ruleset, &script, cli.output, cli.quiet);
        }
    }
}

/// Load and parse a ruleset file, exiting with a message on failure.
pub(crate) fn load_bundle(path: &Path) -> RulesetBundle {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("error: {} is not valid JSON: {}", path.display(), e);
            process::exit(1);
        }
    };
    match RulesetBundle::from_json(&value) {
        Ok(bundle) => bundle,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn severity_label(severity: FindingSeverity) -> &'static str {
    match severity {
        FindingSeverity::Warning => "warning",
        FindingSeverity::Error => "error",
    }
}

fn cmd_analyze(path: &Path, output: OutputFormat, quiet: bool) {
    let bundle = load_bundle(path);
    let report = triage_analyze::analyze(&bundle);

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if report.findings.is_empty() {
                if !quiet {
                    println!("ok: {} checks, no findings", report.checks_run.len());
                }
            } else {
                for finding in &report.findings {
                    println!(
                        "{} [{}] {}",
                        severity_label(finding.severity),
                        finding.check,
                        finding.message
                    );
                }
            }
        }
    }

    if report.has_errors() {
        process::exit(1);
    }
}
