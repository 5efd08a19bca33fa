//! Folder structure validation against category rule sets.
//!
//! Each rule is matched over one directory's immediate contents, or one
//! level of nested subdirectories for `dir/file` patterns. When a
//! category enables `deny_unexpected`, everything not explicitly
//! permitted by some rule is flagged.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::category::{detect_folder_category, find_release_folders_recursive};
use crate::display;
use crate::error::{CheckError, Result};
use crate::output;
use crate::pattern::{match_name, split_nested};
use crate::preset::{self, Presets, Rule, RuleKind};
use crate::types::{Options, OutputFormat};

/// The outcome of checking a single rule
#[derive(Debug)]
pub struct RuleOutcome {
    pub rule: Rule,
    pub matched: u32,
    pub valid: bool,
    pub error: Option<CheckError>,
}

/// Aggregate result of validating one folder's structure
#[derive(Debug)]
pub struct StructureReport {
    pub folder: PathBuf,
    pub category: String,
    pub valid: bool,
    /// Per-rule outcomes, in category rule order
    pub outcomes: Vec<RuleOutcome>,
    /// Entries matched by no rule, relative to the folder; populated only
    /// when the category denies unexpected entries
    pub unexpected: Vec<String>,
    pub errors: Vec<String>,
}

impl StructureReport {
    fn new(folder: &Path, category: &str) -> Self {
        Self {
            folder: folder.to_path_buf(),
            category: category.to_string(),
            valid: true,
            outcomes: Vec::new(),
            unexpected: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// A directory entry name with its kind, sorted for deterministic output
#[derive(Debug, Clone)]
struct DirEntry {
    name: String,
    is_dir: bool,
}

fn read_dir_entries(dir: &Path) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Validate a folder against the rules for its category.
///
/// An empty category, or a category absent from the preset table, makes
/// the whole folder invalid with a single category error and no per-rule
/// outcomes. A present category with zero rules is trivially satisfied
/// unless `deny_unexpected` flags its contents.
pub fn validate_folder(folder: &Path, presets: &Presets, category: &str) -> StructureReport {
    let mut report = StructureReport::new(folder, category);

    if category.is_empty() {
        report.valid = false;
        report
            .errors
            .push("unknown or unsupported release category".to_string());
        return report;
    }

    let cat = match presets.category(category) {
        Some(c) => c,
        None => {
            report.valid = false;
            report
                .errors
                .push(CheckError::UnknownCategory(category.to_string()).to_string());
            return report;
        }
    };

    for rule in &cat.rules {
        let outcome = check_rule(folder, rule);
        if !outcome.valid {
            report.valid = false;
            if let Some(err) = &outcome.error {
                report.errors.push(err.to_string());
            }
        }
        report.outcomes.push(outcome);
    }

    if cat.deny_unexpected {
        match find_unexpected(folder, &cat.rules) {
            Ok(unexpected) => {
                if !unexpected.is_empty() {
                    report.valid = false;
                    report.errors.push(format!(
                        "found {} unexpected file(s)/directory(ies)",
                        unexpected.len()
                    ));
                    report.unexpected = unexpected;
                }
            }
            Err(err) => {
                report.valid = false;
                report
                    .errors
                    .push(format!("failed to check for unexpected files: {}", err));
            }
        }
    }

    report
}

/// Check a single rule: count matches, then enforce min/max bounds
fn check_rule(folder: &Path, rule: &Rule) -> RuleOutcome {
    let mut outcome = RuleOutcome {
        rule: rule.clone(),
        matched: 0,
        valid: true,
        error: None,
    };

    let matched = match count_matches(folder, rule) {
        Ok(count) => count,
        Err(err) => {
            outcome.valid = false;
            outcome.error = Some(err);
            return outcome;
        }
    };
    outcome.matched = matched;

    if rule.min > 0 && matched < rule.min {
        outcome.valid = false;
        outcome.error = Some(CheckError::TooFewMatches {
            matched,
            min: rule.min,
        });
    } else if rule.max > 0 && matched > rule.max {
        outcome.valid = false;
        outcome.error = Some(CheckError::TooManyMatches {
            matched,
            max: rule.max,
        });
    }

    outcome
}

/// Count directory entries matching a rule.
///
/// Flat rules filter by entry kind and match names directly. Nested
/// `dir/file` rules count matching files across all matching
/// subdirectories; directories inside a matched subdirectory are never
/// counted as files.
fn count_matches(folder: &Path, rule: &Rule) -> Result<u32> {
    let entries = read_dir_entries(folder)?;
    let mut count = 0u32;

    if let Some((dir_pattern, file_pattern)) = split_nested(&rule.pattern) {
        for entry in &entries {
            if !entry.is_dir || !match_name(&entry.name, dir_pattern, rule.regex)? {
                continue;
            }
            // An unreadable matched subdirectory contributes no matches
            let sub_entries = match read_dir_entries(&folder.join(&entry.name)) {
                Ok(sub) => sub,
                Err(_) => continue,
            };
            for sub in &sub_entries {
                if sub.is_dir {
                    continue;
                }
                if match_name(&sub.name, file_pattern, rule.regex)? {
                    count += 1;
                }
            }
        }
    } else {
        let want_dir = rule.kind == RuleKind::Dir;
        for entry in &entries {
            if entry.is_dir != want_dir {
                continue;
            }
            if match_name(&entry.name, &rule.pattern, rule.regex)? {
                count += 1;
            }
        }
    }

    Ok(count)
}

/// Derive the set of entries permitted by no rule.
///
/// Closed-world: flat rules whitelist top-level names, nested rules
/// whitelist a directory plus the files inside it that match. Inside a
/// nested-allowed directory, subdirectories are always unexpected
/// (nesting is capped at one level). A directory allowed only by a plain
/// `dir` rule is never inspected.
fn find_unexpected(folder: &Path, rules: &[Rule]) -> Result<Vec<String>> {
    let entries = read_dir_entries(folder)?;

    let mut allowed_root: HashSet<String> = HashSet::new();
    let mut nested_dirs: HashSet<String> = HashSet::new();
    let mut nested_files: HashMap<String, HashSet<String>> = HashMap::new();

    for rule in rules {
        if let Some((dir_pattern, file_pattern)) = split_nested(&rule.pattern) {
            for entry in &entries {
                if !entry.is_dir {
                    continue;
                }
                if !matches!(match_name(&entry.name, dir_pattern, rule.regex), Ok(true)) {
                    continue;
                }

                nested_dirs.insert(entry.name.clone());
                let allowed = nested_files.entry(entry.name.clone()).or_default();

                let sub_entries = match read_dir_entries(&folder.join(&entry.name)) {
                    Ok(sub) => sub,
                    Err(_) => continue,
                };
                for sub in sub_entries {
                    if sub.is_dir {
                        continue;
                    }
                    if matches!(match_name(&sub.name, file_pattern, rule.regex), Ok(true)) {
                        allowed.insert(sub.name);
                    }
                }
            }
        } else {
            let want_dir = rule.kind == RuleKind::Dir;
            for entry in &entries {
                if entry.is_dir != want_dir {
                    continue;
                }
                if matches!(match_name(&entry.name, &rule.pattern, rule.regex), Ok(true)) {
                    allowed_root.insert(entry.name.clone());
                }
            }
        }
    }

    let mut unexpected = Vec::new();
    for entry in &entries {
        if entry.is_dir {
            if nested_dirs.contains(&entry.name) {
                let sub_entries = match read_dir_entries(&folder.join(&entry.name)) {
                    Ok(sub) => sub,
                    Err(_) => continue,
                };
                let allowed = nested_files.get(&entry.name);
                for sub in sub_entries {
                    let permitted = !sub.is_dir
                        && allowed.map(|files| files.contains(&sub.name)).unwrap_or(false);
                    if !permitted {
                        unexpected.push(format!("{}/{}", entry.name, sub.name));
                    }
                }
            } else if !allowed_root.contains(&entry.name) {
                unexpected.push(entry.name.clone());
            }
        } else if !allowed_root.contains(&entry.name) {
            unexpected.push(entry.name.clone());
        }
    }

    Ok(unexpected)
}

/// Validate one folder: detect its category, apply the rules, render.
/// Returns true when validation failed. A folder with no detectable
/// category is skipped with a warning, not failed.
fn validate_single_folder(
    folder: &Path,
    presets: &Presets,
    override_category: &str,
    opts: &Options,
) -> bool {
    let category = match detect_folder_category(folder, override_category) {
        Some(c) => c,
        None => {
            if !opts.quiet {
                eprintln!(
                    "Warning: {} - unknown or unsupported release category",
                    folder.display()
                );
            }
            return false;
        }
    };

    let report = validate_folder(folder, presets, &category);

    match opts.format {
        OutputFormat::Text => display::show_structure_report(&report, opts),
        format => {
            if let Err(err) = output::write_structure_report(&mut std::io::stdout(), &report, format)
            {
                eprintln!("Error: {}", err);
                return true;
            }
        }
    }

    !report.valid
}

/// Validate the structure of each of the given folders.
/// Returns true when every folder validated cleanly.
pub fn validate_structure_folders(
    folders: &[PathBuf],
    preset_path: Option<&Path>,
    override_category: &str,
    opts: &Options,
) -> bool {
    let presets = match preset::load_presets(preset_path) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("Error: failed to load presets: {}", err);
            return false;
        }
    };

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

        if opts.recursive {
            let release_folders = find_release_folders_recursive(&abs);
            if release_folders.is_empty() {
                if !opts.quiet {
                    eprintln!("No valid release folders found in {}", folder.display());
                }
                has_errors = true;
                continue;
            }
            for release in &release_folders {
                has_errors |= validate_single_folder(release, &presets, override_category, opts);
            }
        } else {
            has_errors |= validate_single_folder(&abs, &presets, override_category, opts);
        }
    }

    !has_errors
}
