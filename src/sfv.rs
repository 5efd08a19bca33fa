//! SFV manifest parsing and concurrent CRC-32 validation.

use crc32fast::Hasher;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::buffer::BufferPool;
use crate::dispatch::{auto_workers, run_indexed};
use crate::display;
use crate::error::{CheckError, Result};
use crate::output;
use crate::progress::{validation_bar, ProgressTracker};
use crate::types::{Options, OutputFormat, SfvCheck, SfvEntry, SfvFile, SfvReport};

/// True when `path` has the given extension, compared case-insensitively
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Find the first SFV file in a directory (case insensitive)
pub fn find_sfv_file(dir: &Path) -> Result<PathBuf> {
    let files = find_sfv_files(dir)?;
    files
        .into_iter()
        .next()
        .ok_or_else(|| CheckError::FileNotFound(format!("no SFV file found in {}", dir.display())))
}

/// Find all SFV files directly inside a directory (case insensitive)
pub fn find_sfv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, "sfv") {
            found.push(path);
        }
    }
    found.sort();

    if found.is_empty() {
        return Err(CheckError::FileNotFound(format!(
            "no SFV files found in directory: {}",
            dir.display()
        )));
    }
    Ok(found)
}

/// Find all SFV files recursively, tolerating unreadable subtrees
pub fn find_sfv_files_recursive(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), "sfv"))
        .map(|entry| entry.into_path())
        .collect()
}

/// Parse an SFV manifest.
///
/// One entry per line, `filename<whitespace>checksum`. Empty lines and
/// `;` comments are skipped. The last whitespace-delimited token is the
/// checksum; everything before it, rejoined with single spaces, is the
/// filename, so names containing spaces survive. Lines whose checksum
/// token is not exactly 8 characters are silently skipped.
pub fn parse_sfv_file(sfv_path: &Path) -> Result<SfvFile> {
    let file = File::open(sfv_path)?;
    let dir = sfv_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let checksum = parts[parts.len() - 1];
        if checksum.len() != 8 {
            continue;
        }
        let filename = parts[..parts.len() - 1].join(" ");

        entries.push(SfvEntry::new(filename, checksum, &dir));
    }

    if entries.is_empty() {
        return Err(CheckError::Parse(format!(
            "no valid entries found in SFV file: {}",
            sfv_path.display()
        )));
    }

    Ok(SfvFile {
        path: sfv_path.to_path_buf(),
        dir,
        entries,
    })
}

/// Stream a file through a rolling CRC-32, reusing `buffer` for reads.
/// Returns the checksum as 8 uppercase hex digits.
pub fn compute_crc32(path: &Path, buffer: &mut [u8]) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();

    loop {
        let n = file.read(buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:08X}", hasher.finalize()))
}

/// Validate a single manifest entry against its expected checksum
fn validate_entry(entry: &SfvEntry, buffer: &mut [u8]) -> SfvCheck {
    // Only a definite not-found is "missing"; an unreadable file falls
    // through and surfaces as an IO error from the checksum read
    if matches!(
        std::fs::metadata(&entry.path),
        Err(ref err) if err.kind() == std::io::ErrorKind::NotFound
    ) {
        return SfvCheck {
            entry: entry.clone(),
            valid: false,
            computed: None,
            error: Some(CheckError::FileNotFound(entry.filename.clone())),
        };
    }

    match compute_crc32(&entry.path, buffer) {
        Err(err) => SfvCheck {
            entry: entry.clone(),
            valid: false,
            computed: None,
            error: Some(err),
        },
        Ok(computed) => {
            let valid = computed.eq_ignore_ascii_case(&entry.checksum);
            let error = if valid {
                None
            } else {
                Some(CheckError::ChecksumMismatch {
                    expected: entry.checksum.clone(),
                    computed: computed.clone(),
                })
            };
            SfvCheck {
                entry: entry.clone(),
                valid,
                computed: Some(computed),
                error,
            }
        }
    }
}

/// Validate every entry of a parsed manifest across a worker pool.
///
/// Per-entry failures land in the corresponding result and never abort
/// sibling work. The results vector is index-aligned with the manifest
/// regardless of worker count or completion order.
pub fn validate_sfv(sfv: &SfvFile, opts: &Options) -> Result<SfvReport> {
    if sfv.entries.is_empty() {
        return Err(CheckError::Parse("no entries to validate".to_string()));
    }

    let total = sfv.entries.len();
    let workers = auto_workers(total, opts.workers);
    let pool = BufferPool::new(opts.buffer_size);

    let bar = validation_bar(total as u64, opts.quiet || opts.recursive);
    let mut tracker = ProgressTracker::new(total);

    let results = run_indexed(
        total,
        workers,
        || pool.checkout(),
        |buffer, index| validate_entry(&sfv.entries[index], buffer),
        |_, _| {
            tracker.tick();
            bar.inc(1);
            bar.set_message(format!("{:.1} files/s", tracker.rate()));
        },
    );
    bar.finish_and_clear();

    let mut report = SfvReport::new(sfv.clone());
    for check in &results {
        if check.valid {
            report.valid += 1;
        } else if let Some(err) = &check.error {
            if err.is_missing() {
                report.missing += 1;
            } else {
                report.invalid += 1;
            }
            report.errors.push(err.to_string());
        } else {
            report.invalid += 1;
        }
    }
    report.results = results;

    Ok(report)
}

/// Validate one SFV file and render the result.
/// Returns true when validation failed (invalid or missing files).
fn validate_single_sfv(sfv_path: &Path, opts: &Options) -> Result<bool> {
    let sfv = parse_sfv_file(sfv_path)?;
    let report = validate_sfv(&sfv, opts)?;

    match opts.format {
        OutputFormat::Text => display::show_sfv_report(&report, opts),
        format => output::write_sfv_report(&mut std::io::stdout(), &report, format)?,
    }

    Ok(!report.passed())
}

/// Validate SFV files found in each of the given folders.
/// Returns true when every folder validated cleanly.
pub fn validate_sfv_folders(folders: &[PathBuf], opts: &Options) -> bool {
    let mut has_errors = false;

    for folder in folders {
        let abs = match std::fs::canonicalize(folder) {
            Ok(p) => p,
            Err(err) => {
                eprintln!("Error: {} does not exist: {}", folder.display(), err);
                has_errors = true;
                continue;
            }
        };

        if !abs.is_dir() {
            eprintln!("Error: {} is not a directory", folder.display());
            has_errors = true;
            continue;
        }

        let sfv_files = if opts.recursive {
            find_sfv_files_recursive(&abs)
        } else {
            match find_sfv_files(&abs) {
                Ok(files) => files,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    has_errors = true;
                    continue;
                }
            }
        };

        if sfv_files.is_empty() {
            if !opts.quiet {
                eprintln!("No SFV files found in {}", folder.display());
            }
            has_errors = true;
            continue;
        }

        for sfv_path in &sfv_files {
            match validate_single_sfv(sfv_path, opts) {
                Ok(failed) => has_errors |= failed,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    has_errors = true;
                }
            }
        }
    }

    !has_errors
}
