//! # Mailsift
//!
//! A spam/ham text classification library for Rust.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Deterministic text normalization shared by training and inference
//! - TF-IDF feature extraction with a fit-once vocabulary
//! - Three interchangeable classifiers: naive Bayes, linear SVM, MLP
//! - JSON model persistence that survives process restarts
//! - Thread-safe classification service with atomic model swaps

pub mod analysis;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod features;
pub mod model;
pub mod registry;
pub mod service;
pub mod trainer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
