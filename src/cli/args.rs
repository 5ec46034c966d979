//! Command line argument parsing for the Mailsift CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mailsift - spam/ham message classification
#[derive(Parser, Debug, Clone)]
#[command(name = "mailsift")]
#[command(about = "Train and query spam/ham text classification models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Mailsift Contributors")]
#[command(long_about = None)]
pub struct MailsiftArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Directory holding the persisted model artifacts
    #[arg(long, value_name = "MODEL_DIR", default_value = "./models")]
    pub model_dir: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MailsiftArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train all models against the first parseable dataset
    Train(TrainArgs),

    /// Classify a message with every trained model
    Predict(PredictArgs),

    /// Show whether trained models are available
    Status(StatusArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Candidate dataset files, tried in order
    #[arg(
        value_name = "DATASET",
        default_values = ["spam_dataset.txt", "enron_spam_data.csv"]
    )]
    pub datasets: Vec<PathBuf>,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Message body text
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Optional subject line, prepended to the message
    #[arg(short, long, default_value = "")]
    pub subject: String,

    /// Restrict output to one model (naive_bayes, svm, neural_network)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,
}

/// Arguments for the status command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_train_command_defaults() {
        let args = MailsiftArgs::try_parse_from(["mailsift", "train"]).unwrap();
        if let Command::Train(ref train_args) = args.command {
            assert_eq!(
                train_args.datasets,
                vec![
                    PathBuf::from("spam_dataset.txt"),
                    PathBuf::from("enron_spam_data.csv")
                ]
            );
        } else {
            panic!("Expected train command");
        }
        assert_eq!(args.model_dir, PathBuf::from("./models"));
        assert_eq!(args.verbosity(), 1);
    }

    #[test]
    fn test_predict_command() {
        let args = MailsiftArgs::try_parse_from([
            "mailsift",
            "--format",
            "json",
            "predict",
            "free cash now",
            "--subject",
            "WIN BIG",
            "--model",
            "naive_bayes",
        ])
        .unwrap();

        assert!(matches!(args.output_format, OutputFormat::Json));
        if let Command::Predict(predict_args) = args.command {
            assert_eq!(predict_args.message, "free cash now");
            assert_eq!(predict_args.subject, "WIN BIG");
            assert_eq!(predict_args.model.as_deref(), Some("naive_bayes"));
        } else {
            panic!("Expected predict command");
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args =
            MailsiftArgs::try_parse_from(["mailsift", "-q", "-v", "-v", "status"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
