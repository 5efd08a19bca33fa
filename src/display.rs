//! Plain-text rendering of validation reports.
//!
//! Strictly a presentation layer: verbosity and quiet flags change what
//! gets printed, never what the validators computed.

use crate::rules::StructureReport;
use crate::types::{Options, SfvReport, ZipReport};

const STATUS_OK: &str = "OK";
const STATUS_BAD: &str = "BAD";
const STATUS_MISSING: &str = "MISSING";

/// Render an SFV validation report to stdout
pub fn show_sfv_report(report: &SfvReport, opts: &Options) {
    if opts.quiet {
        if !report.passed() {
            println!(
                "{}: {} valid, {} invalid, {} missing",
                report.sfv.path.display(),
                report.valid,
                report.invalid,
                report.missing
            );
        }
        return;
    }

    println!("{}", report.sfv.path.display());

    for check in &report.results {
        let show = opts.verbose || !check.valid;
        if !show {
            continue;
        }

        let status = match &check.error {
            None => STATUS_OK,
            Some(err) if err.is_missing() => STATUS_MISSING,
            Some(_) => STATUS_BAD,
        };
        match (&check.computed, check.valid) {
            (Some(computed), false) => println!(
                "  [{}] {} (expected {}, got {})",
                status, check.entry.filename, check.entry.checksum, computed
            ),
            _ => println!("  [{}] {}", status, check.entry.filename),
        }
    }

    println!(
        "  {} files: {} valid, {} invalid, {} missing",
        report.total, report.valid, report.invalid, report.missing
    );
}

/// Render a ZIP validation report to stdout
pub fn show_zip_report(report: &ZipReport, opts: &Options) {
    if opts.quiet {
        if !report.passed() {
            println!(
                "{}: {} valid, {} invalid",
                report.archive.path.display(),
                report.valid,
                report.invalid
            );
        }
        return;
    }

    println!("{}", report.archive.path.display());

    for check in &report.results {
        if !opts.verbose && check.valid {
            continue;
        }
        let status = if check.valid { STATUS_OK } else { STATUS_BAD };
        match &check.error {
            Some(err) => println!("  [{}] {}: {}", status, check.entry.name, err),
            None => println!("  [{}] {}", status, check.entry.name),
        }
    }

    println!(
        "  {} entries: {} valid, {} invalid",
        report.total, report.valid, report.invalid
    );
}

/// Render a folder structure report to stdout
pub fn show_structure_report(report: &StructureReport, opts: &Options) {
    if opts.quiet {
        if !report.valid {
            println!(
                "{}: invalid ({})",
                report.folder.display(),
                report.errors.join("; ")
            );
        }
        return;
    }

    let verdict = if report.valid { "valid" } else { "invalid" };
    println!(
        "{} [{}] {}",
        report.folder.display(),
        report.category,
        verdict
    );

    for outcome in &report.outcomes {
        if !opts.verbose && outcome.valid {
            continue;
        }
        let status = if outcome.valid { STATUS_OK } else { STATUS_BAD };
        let label = outcome
            .rule
            .description
            .as_deref()
            .unwrap_or(&outcome.rule.pattern);
        match &outcome.error {
            Some(err) => println!("  [{}] {}: {}", status, label, err),
            None => println!("  [{}] {} ({} matched)", status, label, outcome.matched),
        }
    }

    for path in &report.unexpected {
        println!("  [UNEXPECTED] {}", path);
    }

    if report.outcomes.is_empty() && report.unexpected.is_empty() {
        for err in &report.errors {
            println!("  {}", err);
        }
    }
}
