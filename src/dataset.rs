//! Labeled-corpus loading for classifier training.
//!
//! Supports the two known dataset layouts:
//!
//! - schema A: a `v1`/`v2` header, label then message text (SMS dump);
//! - schema B: a `Spam/Ham` label column with separate `Subject` and
//!   `Message` columns (Enron dump), joined with a single space.
//!
//! Files are decoded by trying an ordered list of encodings, first success
//! wins. Rows are normalized, rows that end up empty or carry a label
//! outside `{ham, spam}` are dropped, and a corpus that does not contain
//! both classes is rejected.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};

use crate::analysis::normalize;
use crate::error::{MailsiftError, Result};
use crate::model::Label;

/// Ordered decode strategies; the first that decodes cleanly wins.
const ENCODINGS: [&Encoding; 2] = [UTF_8, WINDOWS_1252];

/// One labeled training sample with normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Normalized message text, never empty.
    pub text: String,
    pub label: Label,
}

/// The two recognized dataset layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schema {
    /// `v1` = label, `v2` = text.
    LabelText { label: usize, text: usize },
    /// `Spam/Ham` = label, text = `Subject` + " " + `Message`.
    SubjectBody {
        label: usize,
        subject: usize,
        message: usize,
    },
}

/// Load a labeled corpus from a CSV file.
///
/// Row order of the file is preserved so downstream splits are
/// reproducible.
pub fn load(path: &Path) -> Result<Vec<Sample>> {
    let bytes = fs::read(path)?;
    let content = decode(&bytes, path)?;
    parse(&content, path)
}

/// Decode file bytes with the first encoding that decodes without error.
fn decode(bytes: &[u8], path: &Path) -> Result<String> {
    let mut attempted = Vec::new();
    for encoding in ENCODINGS {
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => return Ok(text.into_owned()),
            None => attempted.push(encoding.name()),
        }
    }
    Err(MailsiftError::dataset_encoding(format!(
        "no supported encoding decodes {} (tried: {})",
        path.display(),
        attempted.join(", ")
    )))
}

/// Detect the schema from the header row.
fn detect_schema(headers: &csv::StringRecord) -> Option<Schema> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    if let (Some(label), Some(text)) = (find("v1"), find("v2")) {
        return Some(Schema::LabelText { label, text });
    }
    if let (Some(label), Some(subject), Some(message)) =
        (find("Spam/Ham"), find("Subject"), find("Message"))
    {
        return Some(Schema::SubjectBody {
            label,
            subject,
            message,
        });
    }
    None
}

fn parse(content: &str, path: &Path) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let schema = detect_schema(&headers).ok_or_else(|| {
        MailsiftError::dataset_schema(format!(
            "{}: columns {:?} match neither the v1/v2 nor the Spam/Ham layout",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        ))
    })?;

    let mut samples = Vec::new();
    let mut seen = [false; 2];

    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let (raw_label, raw_text) = match schema {
            Schema::LabelText { label, text } => (field(label), field(text).to_string()),
            Schema::SubjectBody {
                label,
                subject,
                message,
            } => (
                field(label),
                format!("{} {}", field(subject), field(message)),
            ),
        };

        // Case-sensitive label vocabulary; unmapped rows are dropped.
        let Some(label) = Label::parse(raw_label.trim()) else {
            continue;
        };
        let text = normalize(&raw_text);
        if text.is_empty() {
            continue;
        }

        seen[label.index()] = true;
        samples.push(Sample { text, label });
    }

    if !(seen[0] && seen[1]) {
        return Err(MailsiftError::insufficient_classes(format!(
            "{}: training data must contain both ham and spam samples",
            path.display()
        )));
    }

    Ok(samples)
}
