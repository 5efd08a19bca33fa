//! Scene release integrity and structure validation
//!
//! This library provides the validation core behind the `relcheck` CLI:
//! - SFV manifest parsing and concurrent CRC-32 verification
//! - ZIP archive integrity testing via full streaming reads
//! - Bounded worker-pool dispatch with index-aligned results
//! - Reusable read-buffer pooling per validation call
//! - Glob / brace-expansion / regex rule matching
//! - Folder structure validation with deny-unexpected policy
//! - Release category detection from folder names

pub mod archive;
pub mod buffer;
pub mod category;
pub mod cli;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod output;
pub mod pattern;
pub mod preset;
pub mod progress;
pub mod rules;
pub mod sfv;
pub mod types;

// Re-export commonly used types
pub use buffer::BufferPool;
pub use dispatch::{auto_workers, run_indexed};
pub use error::{CheckError, Result};
pub use preset::{CategoryRules, Presets, Rule, RuleKind};
pub use progress::ProgressTracker;
pub use rules::{validate_folder, RuleOutcome, StructureReport};
pub use types::{Options, OutputFormat, SfvEntry, SfvFile, SfvReport, ZipEntryRef, ZipReport};
