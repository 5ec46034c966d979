//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{MailsiftArgs, OutputFormat};
use crate::error::Result;
use crate::service::{PredictOutcome, Prediction};
use crate::trainer::TrainReport;

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &MailsiftArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result),
    }
}

fn output_json<T: Serialize>(result: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn output_human<T: Serialize>(message: &str, result: &T, args: &MailsiftArgs) -> Result<()> {
    if args.verbosity() > 0 && !message.is_empty() {
        println!("{message}");
    }

    let value = serde_json::to_value(result)?;
    output_generic_human(&value, 0);
    Ok(())
}

fn output_generic_human(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{pad}{key}:");
                        output_generic_human(val, indent + 1);
                    }
                    _ => println!("{pad}{key}: {}", plain(val)),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                output_generic_human(item, indent);
            }
        }
        _ => println!("{pad}{}", plain(value)),
    }
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print a training report in human format.
pub fn print_train_report(report: &TrainReport, args: &MailsiftArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(report),
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("Training completed!");
                println!(
                    "Dataset: {} ham / {} spam samples ({} train, {} held out)",
                    report.ham_samples,
                    report.spam_samples,
                    report.training_samples,
                    report.test_samples
                );
                let mut names: Vec<&String> = report.accuracies.keys().collect();
                names.sort();
                for name in names {
                    println!("  {name}: accuracy {:.4}", report.accuracies[name]);
                }
            }
            Ok(())
        }
    }
}

/// Print one model's prediction outcome in human format.
pub fn print_prediction(name: &str, outcome: &PredictOutcome, args: &MailsiftArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(outcome),
        OutputFormat::Human => {
            match outcome {
                PredictOutcome::Available { prediction } => print_available(name, prediction),
                PredictOutcome::Unavailable { reason } => {
                    println!("{name}: unavailable ({})", reason.message());
                }
            }
            Ok(())
        }
    }
}

fn print_available(name: &str, prediction: &Prediction) {
    println!(
        "{name}: {} (confidence {:.3}, spam {:.3}, ham {:.3})",
        prediction.label, prediction.confidence, prediction.spam_probability,
        prediction.ham_probability
    );
}
