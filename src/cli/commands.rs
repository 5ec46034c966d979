//! Command implementations for the Mailsift CLI.

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::service::{ClassifierService, PredictOutcome, ServiceConfig};

/// Execute a CLI command.
pub fn execute_command(args: MailsiftArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::Status(_) => status(&args),
    }
}

fn service_from(args: &MailsiftArgs, datasets: Vec<std::path::PathBuf>) -> ClassifierService {
    ClassifierService::new(ServiceConfig {
        model_dir: args.model_dir.clone(),
        dataset_candidates: datasets,
    })
}

/// Train all models and persist them.
fn train(train_args: TrainArgs, cli_args: &MailsiftArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!(
            "Training with candidates: {}",
            train_args
                .datasets
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let service = service_from(cli_args, train_args.datasets);
    let report = service.train()?;
    print_train_report(&report, cli_args)
}

/// Classify a message with one or all models.
fn predict(predict_args: PredictArgs, cli_args: &MailsiftArgs) -> Result<()> {
    let service = service_from(cli_args, Vec::new());

    match predict_args.model {
        Some(name) => {
            let text = format!("{} {}", predict_args.subject, predict_args.message);
            let outcome = service.predict_one(text.trim(), &name);
            print_prediction(&name, &outcome, cli_args)
        }
        None => match service.predict(&predict_args.subject, &predict_args.message) {
            Ok(response) => {
                for (kind, prediction) in &response.predictions {
                    print_prediction(
                        kind.as_str(),
                        &PredictOutcome::Available {
                            prediction: prediction.clone(),
                        },
                        cli_args,
                    )?;
                }
                Ok(())
            }
            Err(reason) => {
                eprintln!("Prediction unavailable: {}", reason.message());
                Ok(())
            }
        },
    }
}

/// Report whether trained models are available.
fn status(cli_args: &MailsiftArgs) -> Result<()> {
    let (service, loaded) = ClassifierService::with_loaded(ServiceConfig {
        model_dir: cli_args.model_dir.clone(),
        dataset_candidates: Vec::new(),
    });

    if cli_args.verbosity() > 1 && loaded {
        println!("Loaded persisted models from {}", cli_args.model_dir.display());
    }

    output_result("Service status", &service.health(), cli_args)
}
