//! Machine-readable report serialization (JSON / YAML).
//!
//! Mirror structs keep the wire shape stable and independent of the
//! in-memory result types; every numeric field and per-item detail is
//! populated regardless of verbosity flags.

use chrono::Local;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{CheckError, Result};
use crate::preset::Rule;
use crate::rules::StructureReport;
use crate::types::{OutputFormat, SfvEntry, SfvReport, ZipReport};

#[derive(Debug, Serialize)]
pub struct SfvReportOut {
    pub generated_at: String,
    pub sfv_file: SfvFileOut,
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub missing_files: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<SfvResultOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SfvFileOut {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub entries: Vec<SfvEntry>,
}

#[derive(Debug, Serialize)]
pub struct SfvResultOut {
    pub filename: String,
    pub path: PathBuf,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SfvReport> for SfvReportOut {
    fn from(report: &SfvReport) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            sfv_file: SfvFileOut {
                path: report.sfv.path.clone(),
                dir: report.sfv.dir.clone(),
                entries: report.sfv.entries.clone(),
            },
            total_files: report.total,
            valid_files: report.valid,
            invalid_files: report.invalid,
            missing_files: report.missing,
            results: report
                .results
                .iter()
                .map(|check| SfvResultOut {
                    filename: check.entry.filename.clone(),
                    path: check.entry.path.clone(),
                    valid: check.valid,
                    computed: check.computed.clone(),
                    error: check.error.as_ref().map(|e| e.to_string()),
                })
                .collect(),
            errors: report.errors.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZipReportOut {
    pub generated_at: String,
    pub zip_file: PathBuf,
    pub total_entries: usize,
    pub valid_entries: usize,
    pub invalid_entries: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ZipResultOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ZipResultOut {
    pub name: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ZipReport> for ZipReportOut {
    fn from(report: &ZipReport) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            zip_file: report.archive.path.clone(),
            total_entries: report.total,
            valid_entries: report.valid,
            invalid_entries: report.invalid,
            results: report
                .results
                .iter()
                .map(|check| ZipResultOut {
                    name: check.entry.name.clone(),
                    valid: check.valid,
                    error: check.error.as_ref().map(|e| e.to_string()),
                })
                .collect(),
            errors: report.errors.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StructureReportOut {
    pub generated_at: String,
    pub folder: PathBuf,
    pub category: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_results: Vec<RuleOutcomeOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unexpected: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleOutcomeOut {
    #[serde(flatten)]
    pub rule: Rule,
    pub matched: u32,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&StructureReport> for StructureReportOut {
    fn from(report: &StructureReport) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            folder: report.folder.clone(),
            category: report.category.clone(),
            valid: report.valid,
            rule_results: report
                .outcomes
                .iter()
                .map(|outcome| RuleOutcomeOut {
                    rule: outcome.rule.clone(),
                    matched: outcome.matched,
                    valid: outcome.valid,
                    error: outcome.error.as_ref().map(|e| e.to_string()),
                })
                .collect(),
            unexpected: report.unexpected.clone(),
            errors: report.errors.clone(),
        }
    }
}

pub fn write_sfv_report<W: Write>(
    writer: &mut W,
    report: &SfvReport,
    format: OutputFormat,
) -> Result<()> {
    write_serialized(writer, &SfvReportOut::from(report), format)
}

pub fn write_zip_report<W: Write>(
    writer: &mut W,
    report: &ZipReport,
    format: OutputFormat,
) -> Result<()> {
    write_serialized(writer, &ZipReportOut::from(report), format)
}

pub fn write_structure_report<W: Write>(
    writer: &mut W,
    report: &StructureReport,
    format: OutputFormat,
) -> Result<()> {
    write_serialized(writer, &StructureReportOut::from(report), format)
}

fn write_serialized<W: Write, T: Serialize>(
    writer: &mut W,
    value: &T,
    format: OutputFormat,
) -> Result<()> {
    match format {
        // Text rendering lives in the display module
        OutputFormat::Text => Ok(()),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, value)
                .map_err(|e| CheckError::Output(e.to_string()))?;
            writer.write_all(b"\n")?;
            Ok(())
        }
        OutputFormat::Yaml => serde_yaml::to_writer(writer, value)
            .map_err(|e| CheckError::Output(e.to_string())),
    }
}
