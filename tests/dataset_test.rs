//! Dataset loading against realistic files of both layouts.

use std::path::PathBuf;

use tempfile::TempDir;

use mailsift::dataset;
use mailsift::error::MailsiftError;
use mailsift::model::Label;
use mailsift::service::{ClassifierService, ServiceConfig};

fn sms_file(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("spam_dataset.txt");
    let mut rows = String::from("v1,v2,,,\n");
    for i in 0..15 {
        rows.push_str(&format!("ham,See you at the meeting number {i} tomorrow,,,\n"));
        rows.push_str(&format!("spam,WIN a FREE ${i}00 prize! Click now!,,,\n"));
    }
    std::fs::write(&path, rows).unwrap();
    path
}

fn enron_file(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("enron_spam_data.csv");
    let mut rows = String::from("Spam/Ham,Subject,Message\n");
    for i in 0..15 {
        rows.push_str(&format!("ham,Weekly sync {i},Agenda attached for the call\n"));
        rows.push_str(&format!("spam,FREE offer {i},Click to win your $ prize now\n"));
    }
    std::fs::write(&path, rows).unwrap();
    path
}

#[test]
fn test_both_layouts_load_to_the_same_sample_shape() {
    let dir = TempDir::new().unwrap();
    let sms = dataset::load(&sms_file(dir.path())).unwrap();
    let enron = dataset::load(&enron_file(dir.path())).unwrap();

    assert_eq!(sms.len(), 30);
    assert_eq!(enron.len(), 30);
    for sample in sms.iter().chain(&enron) {
        assert!(!sample.text.is_empty());
        assert!(sample.label == Label::Ham || sample.label == Label::Spam);
        // Normalized alphabet only.
        assert!(
            sample
                .text
                .chars()
                .all(|c| c.is_ascii_lowercase() || " $!?.".contains(c)),
            "unnormalized text: {:?}",
            sample.text
        );
    }

    // Subject and message are joined with a single space.
    assert_eq!(enron[0].text, "weekly sync agenda attached for the call");
}

#[test]
fn test_training_succeeds_on_either_layout() {
    let dir = TempDir::new().unwrap();
    let service = ClassifierService::new(ServiceConfig {
        model_dir: dir.path().join("models"),
        dataset_candidates: vec![sms_file(dir.path()), enron_file(dir.path())],
    });
    let report = service.train().unwrap();
    assert_eq!(report.ham_samples + report.spam_samples, 30);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = dataset::load(std::path::Path::new("/nonexistent/dataset.csv")).unwrap_err();
    assert!(matches!(err, MailsiftError::Io(_)));
}

#[test]
fn test_unknown_layout_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("odd.csv");
    std::fs::write(&path, "message,is_spam\nhello,0\n").unwrap();

    let err = dataset::load(&path).unwrap_err();
    assert!(matches!(err, MailsiftError::DatasetSchema(_)));
}

#[test]
fn test_single_class_corpus_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ham_only.csv");
    let mut rows = String::from("v1,v2\n");
    for _ in 0..10 {
        rows.push_str("ham,just a normal message\n");
    }
    std::fs::write(&path, rows).unwrap();

    let err = dataset::load(&path).unwrap_err();
    assert!(matches!(err, MailsiftError::InsufficientClasses(_)));
}

#[test]
fn test_legacy_encoded_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.csv");
    // 0xA3 is '£' in Windows-1252 and invalid as a lone UTF-8 byte.
    let mut bytes = b"v1,v2\n".to_vec();
    bytes.extend_from_slice(b"spam,Win \xA3500 free cash now\n");
    bytes.extend_from_slice(b"ham,See you tomorrow\n");
    std::fs::write(&path, bytes).unwrap();

    let samples = dataset::load(&path).unwrap();
    assert_eq!(samples[0].text, "win free cash now");
}
