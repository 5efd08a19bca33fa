//! ZIP archive integrity validation, equivalent to `zip -T`.
//!
//! Every non-directory entry is fully streamed into a discard sink; the
//! zip reader verifies the entry's own CRC-32 as the stream drains, so a
//! corrupt entry surfaces as a read error.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::dispatch::{auto_workers, run_indexed};
use crate::display;
use crate::error::{CheckError, Result};
use crate::output;
use crate::progress::{validation_bar, ProgressTracker};
use crate::sfv::has_extension;
use crate::types::{Options, OutputFormat, ZipCheck, ZipEntryRef, ZipFile, ZipReport};

/// Find all ZIP files directly inside a directory (case insensitive)
pub fn find_zip_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, "zip") {
            found.push(path);
        }
    }
    found.sort();

    if found.is_empty() {
        return Err(CheckError::FileNotFound(format!(
            "no ZIP files found in directory: {}",
            dir.display()
        )));
    }
    Ok(found)
}

/// Find all ZIP files recursively, tolerating unreadable subtrees
pub fn find_zip_files_recursive(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), "zip"))
        .map(|entry| entry.into_path())
        .collect()
}

/// List the non-directory entries of a ZIP archive.
///
/// Failure to read the central directory is fatal for this archive and
/// reported before any entry-level work starts.
pub fn parse_zip_file(zip_path: &Path) -> Result<ZipFile> {
    let open_err = |e: &dyn std::fmt::Display| {
        CheckError::ContainerOpen(format!("{}: {}", zip_path.display(), e))
    };

    let file = File::open(zip_path).map_err(|e| open_err(&e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| open_err(&e))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|e| open_err(&e))?;
        if entry.is_dir() {
            continue;
        }
        entries.push(ZipEntryRef {
            name: entry.name().to_string(),
            archive_path: zip_path.to_path_buf(),
        });
    }

    if entries.is_empty() {
        return Err(CheckError::Parse(format!(
            "no entries found in ZIP file: {}",
            zip_path.display()
        )));
    }

    Ok(ZipFile {
        path: zip_path.to_path_buf(),
        entries,
    })
}

/// Validate a single archive entry by streaming it to a discard sink
fn validate_zip_entry(zip_path: &Path, entry_name: &str) -> ZipCheck {
    let entry = ZipEntryRef {
        name: entry_name.to_string(),
        archive_path: zip_path.to_path_buf(),
    };
    let fail = |entry: ZipEntryRef, error: CheckError| ZipCheck {
        entry,
        valid: false,
        error: Some(error),
    };

    let file = match File::open(zip_path) {
        Ok(f) => f,
        Err(err) => {
            return fail(
                entry,
                CheckError::ContainerOpen(format!("{}: {}", zip_path.display(), err)),
            )
        }
    };
    let mut archive = match ZipArchive::new(file) {
        Ok(a) => a,
        Err(err) => {
            return fail(
                entry,
                CheckError::ContainerOpen(format!("{}: {}", zip_path.display(), err)),
            )
        }
    };

    // Locate the entry by exact name; the first occurrence wins, duplicate
    // names inside one container are not deduplicated
    let mut found = None;
    for index in 0..archive.len() {
        if let Ok(candidate) = archive.by_index_raw(index) {
            if candidate.name() == entry_name {
                found = Some(index);
                break;
            }
        }
    }
    let index = match found {
        Some(i) => i,
        None => return fail(entry, CheckError::EntryNotFound(entry_name.to_string())),
    };

    let mut reader = match archive.by_index(index) {
        Ok(r) => r,
        Err(err) => {
            return fail(
                entry,
                CheckError::Integrity(format!("failed to open entry {}: {}", entry_name, err)),
            )
        }
    };

    // A full read triggers the reader's own CRC-32 verification
    match io::copy(&mut reader, &mut io::sink()) {
        Ok(_) => ZipCheck {
            entry,
            valid: true,
            error: None,
        },
        Err(err) => fail(
            entry,
            CheckError::Integrity(format!(
                "failed to read entry (CRC-32 mismatch or corrupted): {}",
                err
            )),
        ),
    }
}

/// Validate every entry of an archive across a worker pool.
///
/// Results are index-aligned with the entry table; per-entry failures
/// never abort sibling work.
pub fn validate_zip(archive: &ZipFile, opts: &Options) -> Result<ZipReport> {
    if archive.entries.is_empty() {
        return Err(CheckError::Parse("no entries to validate".to_string()));
    }

    let total = archive.entries.len();
    let workers = auto_workers(total, opts.workers);

    let bar = validation_bar(total as u64, opts.quiet || opts.recursive);
    let mut tracker = ProgressTracker::new(total);

    let results = run_indexed(
        total,
        workers,
        || (),
        |_, index| {
            let entry = &archive.entries[index];
            validate_zip_entry(&entry.archive_path, &entry.name)
        },
        |_, _| {
            tracker.tick();
            bar.inc(1);
            bar.set_message(format!("{:.1} entries/s", tracker.rate()));
        },
    );
    bar.finish_and_clear();

    let mut report = ZipReport::new(archive.clone());
    for check in &results {
        if check.valid {
            report.valid += 1;
        } else {
            report.invalid += 1;
            if let Some(err) = &check.error {
                report.errors.push(err.to_string());
            }
        }
    }
    report.results = results;

    Ok(report)
}

/// Validate one ZIP file and render the result.
/// Returns true when validation failed (invalid entries).
fn validate_single_zip(zip_path: &Path, opts: &Options) -> Result<bool> {
    let archive = parse_zip_file(zip_path)?;
    let report = validate_zip(&archive, opts)?;

    match opts.format {
        OutputFormat::Text => display::show_zip_report(&report, opts),
        format => output::write_zip_report(&mut std::io::stdout(), &report, format)?,
    }

    Ok(!report.passed())
}

/// Validate ZIP files found in each of the given folders.
/// Returns true when every archive validated cleanly.
pub fn validate_zip_folders(folders: &[PathBuf], opts: &Options) -> bool {
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

        let zip_files = if opts.recursive {
            find_zip_files_recursive(&abs)
        } else {
            match find_zip_files(&abs) {
                Ok(files) => files,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    has_errors = true;
                    continue;
                }
            }
        };

        if zip_files.is_empty() {
            if !opts.quiet {
                eprintln!("No ZIP files found in {}", folder.display());
            }
            has_errors = true;
            continue;
        }

        for zip_path in &zip_files {
            match validate_single_zip(zip_path, opts) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn quiet_options() -> Options {
        Options {
            quiet: true,
            ..Options::default()
        }
    }

    fn write_test_zip(path: &Path, entries: &[(&str, &[u8])], method: CompressionMethod) {
        let file = fs::File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(method);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_parse_skips_directory_entries() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("test.zip");

        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        writer.add_directory("nested", options).unwrap();
        writer.start_file("nested/inner.txt", options).unwrap();
        writer.write_all(b"payload").unwrap();
        writer.finish().unwrap();

        let archive = parse_zip_file(&zip_path).unwrap();
        assert_eq!(archive.entries.len(), 1);
        assert_eq!(archive.entries[0].name, "nested/inner.txt");
    }

    #[test]
    fn test_parse_rejects_non_zip() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join("not-a.zip");
        fs::write(&bogus, "plain text, no central directory").unwrap();

        assert!(matches!(
            parse_zip_file(&bogus),
            Err(CheckError::ContainerOpen(_))
        ));
    }

    #[test]
    fn test_validate_intact_archive() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("good.zip");
        write_test_zip(
            &zip_path,
            &[("a.txt", b"alpha"), ("b.txt", b"bravo")],
            CompressionMethod::Deflated,
        );

        let archive = parse_zip_file(&zip_path).unwrap();
        let report = validate_zip(&archive, &quiet_options()).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.valid, 2);
        assert_eq!(report.invalid, 0);
        assert!(report.passed());
    }

    #[test]
    fn test_corrupt_entry_is_integrity_error() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("corrupt.zip");
        // Stored entries keep the payload verbatim, so a byte flip inside
        // the payload breaks only the entry's CRC
        write_test_zip(
            &zip_path,
            &[("data.bin", b"UNIQUEPAYLOADBYTES")],
            CompressionMethod::Stored,
        );

        let mut bytes = fs::read(&zip_path).unwrap();
        let at = bytes
            .windows(6)
            .position(|w| w == &b"UNIQUE"[..])
            .expect("payload present in stored entry");
        bytes[at] ^= 0xFF;
        fs::write(&zip_path, &bytes).unwrap();

        let archive = parse_zip_file(&zip_path).unwrap();
        let report = validate_zip(&archive, &quiet_options()).unwrap();

        assert_eq!(report.invalid, 1);
        assert!(matches!(
            report.results[0].error,
            Some(CheckError::Integrity(_))
        ));
    }

    #[test]
    fn test_entry_absent_at_validation_time() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("test.zip");
        write_test_zip(&zip_path, &[("real.txt", b"x")], CompressionMethod::Stored);

        // Entry table claims a name the container never had
        let archive = ZipFile {
            path: zip_path.clone(),
            entries: vec![ZipEntryRef {
                name: "phantom.txt".to_string(),
                archive_path: zip_path,
            }],
        };
        let report = validate_zip(&archive, &quiet_options()).unwrap();

        assert_eq!(report.invalid, 1);
        assert!(matches!(
            report.results[0].error,
            Some(CheckError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_find_zip_files_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        write_test_zip(
            &tmp.path().join("a.ZIP"),
            &[("x", b"y")],
            CompressionMethod::Stored,
        );
        write_test_zip(
            &tmp.path().join("b.zip"),
            &[("x", b"y")],
            CompressionMethod::Stored,
        );
        fs::write(tmp.path().join("c.rar"), "not a zip").unwrap();

        let found = find_zip_files(tmp.path()).unwrap();
        assert_eq!(found.len(), 2);
    }
}
