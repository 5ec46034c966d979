//! End-to-end training and prediction scenarios.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use mailsift::model::Label;
use mailsift::service::{ClassifierService, PredictOutcome, ServiceConfig, UnavailableReason};

const HAM_SENTENCES: [&str; 20] = [
    "Meeting moved to 3pm tomorrow, see you there.",
    "Can you review the attached report before Friday?",
    "Lunch at noon with the team works for me.",
    "Thanks for the update, talk to you soon.",
    "The standup is cancelled this morning.",
    "Please send me the notes from yesterday.",
    "I will be late to the office today.",
    "Let me know when the build is green.",
    "Dinner at our place on Saturday evening?",
    "The invoice was approved by finance.",
    "Happy birthday! Hope you have a great day.",
    "Reminder that the dentist appointment is at four.",
    "Could you share the slides from the talk?",
    "The train is delayed by twenty minutes.",
    "See the agenda for next week attached.",
    "Good morning, the coffee machine is fixed.",
    "I pushed the fix, please pull the branch.",
    "Are we still on for the call this afternoon?",
    "The library books are due back on Monday.",
    "Welcome aboard, your desk is on the second floor.",
];

const SPAM_SENTENCES: [&str; 20] = [
    "FREE! Win a $1000 gift card! Click here now!",
    "Congratulations you win a free cruise, click to claim!",
    "Win big $$$ instantly, free entry, click today!",
    "Claim your free $500 voucher now, click the link!",
    "You have won a free iPhone! Click to collect!",
    "FREE cash prize waiting, win now, click here!",
    "Click here for a free loan, win $2000 today!",
    "Winner! Free $ reward, click now to claim your win!",
    "Get free money fast, win the jackpot, click!",
    "Free tickets! Win a $300 bonus, click immediately!",
    "Act now! Free $ prizes, click to win instantly!",
    "You are selected to win free cash, click here!",
    "Win a free vacation and $1000 spending money, click!",
    "Limited offer: free $ credit, click and win!",
    "Free entry to win $5000, click this link now!",
    "Hurry! Click to win your free gift card $!",
    "Claim free coins and win $ rewards, click today!",
    "Exclusive winner! Free $250 card, click to claim!",
    "Win free prizes every hour, click here now $!",
    "Final notice: click to win your free $ bonus!",
];

fn write_corpus(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("dataset.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "v1,v2").unwrap();
    for (ham, spam) in HAM_SENTENCES.iter().zip(SPAM_SENTENCES) {
        writeln!(file, "ham,\"{}\"", ham.replace('"', "")).unwrap();
        writeln!(file, "spam,\"{}\"", spam.replace('"', "")).unwrap();
    }
    path
}

fn trained_service(dir: &TempDir) -> ClassifierService {
    let dataset = write_corpus(dir.path());
    let service = ClassifierService::new(ServiceConfig {
        model_dir: dir.path().join("models"),
        dataset_candidates: vec![dataset],
    });
    service.train().unwrap();
    service
}

#[test]
fn test_all_models_reach_holdout_accuracy() {
    let dir = TempDir::new().unwrap();
    let dataset = write_corpus(dir.path());
    let service = ClassifierService::new(ServiceConfig {
        model_dir: dir.path().join("models"),
        dataset_candidates: vec![dataset],
    });

    let report = service.train().unwrap();
    assert_eq!(report.ham_samples, 20);
    assert_eq!(report.spam_samples, 20);
    assert_eq!(report.accuracies.len(), 3);
    for (name, accuracy) in &report.accuracies {
        assert!(
            *accuracy >= 0.7,
            "{name} held-out accuracy {accuracy} below 0.7"
        );
    }
}

#[test]
fn test_obvious_spam_is_flagged_by_naive_bayes() {
    let dir = TempDir::new().unwrap();
    let service = trained_service(&dir);

    let outcome = service.predict_one(
        "FREE! Win a $1000 gift card! Click here now!",
        "naive_bayes",
    );
    match outcome {
        PredictOutcome::Available { prediction } => {
            assert_eq!(prediction.label, Label::Spam);
            assert!(prediction.spam_probability > 0.5);
            assert!(
                (prediction.spam_probability + prediction.ham_probability - 1.0).abs() < 1e-9
            );
        }
        PredictOutcome::Unavailable { reason } => panic!("unexpected outcome: {reason:?}"),
    }
}

#[test]
fn test_plain_message_is_ham_for_every_model() {
    let dir = TempDir::new().unwrap();
    let service = trained_service(&dir);

    let response = service
        .predict("", "Meeting moved to 3pm tomorrow, see you there.")
        .unwrap();
    assert_eq!(response.predictions.len(), 3);
    for (kind, prediction) in &response.predictions {
        assert_eq!(prediction.label, Label::Ham, "{kind} misflagged plain text");
    }
}

#[test]
fn test_predict_before_training_returns_unavailable() {
    let dir = TempDir::new().unwrap();
    let service = ClassifierService::new(ServiceConfig {
        model_dir: dir.path().join("empty_models"),
        dataset_candidates: Vec::new(),
    });

    let outcome = service.predict_one("free cash now", "svm");
    assert_eq!(
        outcome,
        PredictOutcome::Unavailable {
            reason: UnavailableReason::NotTrained
        }
    );
    assert_eq!(
        service.predict("free", "cash").unwrap_err(),
        UnavailableReason::NotTrained
    );
}

#[test]
fn test_unknown_model_name_returns_unavailable() {
    let dir = TempDir::new().unwrap();
    let service = trained_service(&dir);

    let outcome = service.predict_one("free cash now", "random_forest");
    assert_eq!(
        outcome,
        PredictOutcome::Unavailable {
            reason: UnavailableReason::UnknownModel
        }
    );
}

#[test]
fn test_failed_training_is_atomic() {
    let dir = TempDir::new().unwrap();
    let good = write_corpus(dir.path());
    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, "text,category\nhello,ham\n").unwrap();

    // Candidates hold only the bad file; train on the good one directly.
    let service = ClassifierService::new(ServiceConfig {
        model_dir: dir.path().join("models"),
        dataset_candidates: vec![bad],
    });
    service.train_on(&good).unwrap();
    assert!(service.health().trained);

    let before = service.predict("free $ prize", "click to win now").unwrap();

    // The failing run must leave the trained state exactly as it was.
    let err = service.train().unwrap_err();
    assert!(err.to_string().contains("bad.csv"));
    assert!(service.health().trained);

    let after = service.predict("free $ prize", "click to win now").unwrap();
    assert_eq!(before.predictions, after.predictions);
}

#[test]
fn test_train_falls_back_to_next_candidate() {
    let dir = TempDir::new().unwrap();
    let good = write_corpus(dir.path());
    let missing = dir.path().join("nope.csv");
    let unparseable = dir.path().join("unparseable.csv");
    std::fs::write(&unparseable, "a,b\n1,2\n").unwrap();

    let service = ClassifierService::new(ServiceConfig {
        model_dir: dir.path().join("models"),
        dataset_candidates: vec![missing, unparseable, good],
    });

    let report = service.train().unwrap();
    assert_eq!(report.accuracies.len(), 3);
}

#[test]
fn test_empty_combined_text_is_rejected() {
    let dir = TempDir::new().unwrap();
    let service = trained_service(&dir);
    assert_eq!(
        service.predict("  ", "").unwrap_err(),
        UnavailableReason::EmptyText
    );
}
