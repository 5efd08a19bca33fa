use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::CheckError;

/// Output format for machine-readable reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// A single entry parsed from an SFV manifest
#[derive(Debug, Clone, Serialize)]
pub struct SfvEntry {
    pub filename: String,
    /// CRC-32 checksum, 8 hex digits, stored uppercase
    pub checksum: String,
    /// Full path to the file on disk
    pub path: PathBuf,
}

impl SfvEntry {
    pub fn new(filename: impl Into<String>, checksum: impl Into<String>, dir: &Path) -> Self {
        let filename = filename.into();
        let path = dir.join(&filename);
        Self {
            filename,
            checksum: checksum.into().to_ascii_uppercase(),
            path,
        }
    }
}

/// A parsed SFV manifest
#[derive(Debug, Clone, Serialize)]
pub struct SfvFile {
    /// Path to the SFV file itself
    pub path: PathBuf,
    /// Directory containing the SFV file; entry paths resolve against it
    pub dir: PathBuf,
    /// Entries in manifest order
    pub entries: Vec<SfvEntry>,
}

/// The result of checking a single SFV entry
#[derive(Debug)]
pub struct SfvCheck {
    pub entry: SfvEntry,
    pub valid: bool,
    /// Computed CRC-32, attached even on mismatch for diagnostics
    pub computed: Option<String>,
    pub error: Option<CheckError>,
}

/// Aggregate result of validating one SFV manifest
#[derive(Debug)]
pub struct SfvReport {
    pub sfv: SfvFile,
    /// Per-entry results, index-aligned with `sfv.entries`
    pub results: Vec<SfvCheck>,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub missing: usize,
    pub errors: Vec<String>,
}

impl SfvReport {
    pub fn new(sfv: SfvFile) -> Self {
        let total = sfv.entries.len();
        Self {
            sfv,
            results: Vec::new(),
            total,
            valid: 0,
            invalid: 0,
            missing: 0,
            errors: Vec::new(),
        }
    }

    /// True when every entry checked out: nothing invalid, nothing missing.
    pub fn passed(&self) -> bool {
        self.invalid == 0 && self.missing == 0 && self.errors.is_empty()
    }
}

/// Reference to a single non-directory entry inside a ZIP archive
#[derive(Debug, Clone, Serialize)]
pub struct ZipEntryRef {
    /// Name of the file inside the archive
    pub name: String,
    /// Full path to the archive on disk
    pub archive_path: PathBuf,
}

/// A ZIP archive with its listed entries
#[derive(Debug, Clone, Serialize)]
pub struct ZipFile {
    pub path: PathBuf,
    pub entries: Vec<ZipEntryRef>,
}

/// The result of checking a single ZIP entry
#[derive(Debug)]
pub struct ZipCheck {
    pub entry: ZipEntryRef,
    pub valid: bool,
    pub error: Option<CheckError>,
}

/// Aggregate result of validating one ZIP archive
#[derive(Debug)]
pub struct ZipReport {
    pub archive: ZipFile,
    /// Per-entry results, index-aligned with `archive.entries`
    pub results: Vec<ZipCheck>,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<String>,
}

impl ZipReport {
    pub fn new(archive: ZipFile) -> Self {
        let total = archive.entries.len();
        Self {
            archive,
            results: Vec::new(),
            total,
            valid: 0,
            invalid: 0,
            errors: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.invalid == 0 && self.errors.is_empty()
    }
}

/// Configuration options for checksum and structure validation
#[derive(Debug, Clone)]
pub struct Options {
    /// Number of parallel workers (0 = auto)
    pub workers: usize,
    /// Buffer size for file reading in bytes (0 = default 64 KiB)
    pub buffer_size: usize,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (minimal output)
    pub quiet: bool,
    /// Recursive mode: search subdirectories
    pub recursive: bool,
    /// Output format: text, json or yaml
    pub format: OutputFormat,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            workers: 0,
            buffer_size: 0,
            verbose: false,
            quiet: false,
            recursive: false,
            format: OutputFormat::Text,
        }
    }
}
