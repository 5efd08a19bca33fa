use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{Options, OutputFormat};

/// relcheck - scene release integrity and structure checker
#[derive(Parser, Debug)]
#[command(name = "relcheck")]
#[command(version = "0.1.0")]
#[command(about = "Validate scene release folders: SFV checksums, ZIP integrity, folder structure", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate SFV CRC-32 checksums
    ///
    /// Searches each folder for SFV files (case insensitive) and checks
    /// every listed file against its CRC-32 checksum.
    Sfv(SfvArgs),

    /// Validate ZIP file integrity
    ///
    /// Tests every entry of each ZIP file found, equivalent to `zip -T`.
    Zip(ZipArgs),

    /// Validate scene release folder structure
    ///
    /// Detects the release category from the folder name and checks the
    /// folder contents against the category's preset rules.
    Validate(ValidateArgs),
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Folders to check
    #[arg(value_name = "FOLDER", default_value = ".")]
    pub folders: Vec<PathBuf>,

    /// Show detailed results for each item
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Recursively search subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format
    #[arg(long = "output", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct SfvArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    pub workers: usize,

    /// Buffer size for file reading in bytes (0 = auto, default 64KB)
    #[arg(short, long = "buffer-size", default_value_t = 0)]
    pub buffer_size: usize,
}

#[derive(Args, Debug)]
pub struct ZipArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    pub workers: usize,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to preset YAML file (default: auto-detect)
    #[arg(short, long)]
    pub preset: Option<PathBuf>,

    /// Override category detection with the given category
    #[arg(long = "overwrite", value_name = "CATEGORY", default_value = "")]
    pub overwrite_category: String,
}

impl CommonArgs {
    fn options(&self) -> Options {
        Options {
            workers: 0,
            buffer_size: 0,
            verbose: self.verbose,
            quiet: self.quiet,
            recursive: self.recursive,
            format: self.format,
        }
    }
}

impl SfvArgs {
    pub fn options(&self) -> Options {
        Options {
            workers: self.workers,
            buffer_size: self.buffer_size,
            ..self.common.options()
        }
    }
}

impl ZipArgs {
    pub fn options(&self) -> Options {
        Options {
            workers: self.workers,
            ..self.common.options()
        }
    }
}

impl ValidateArgs {
    pub fn options(&self) -> Options {
        self.common.options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sfv_defaults() {
        let cli = Cli::try_parse_from(["relcheck", "sfv"]).unwrap();
        match cli.command {
            Command::Sfv(args) => {
                assert_eq!(args.common.folders, vec![PathBuf::from(".")]);
                assert_eq!(args.workers, 0);
                assert_eq!(args.buffer_size, 0);
                assert!(!args.common.recursive);
                assert_eq!(args.common.format, OutputFormat::Text);
            }
            _ => panic!("expected sfv subcommand"),
        }
    }

    #[test]
    fn test_sfv_flags() {
        let cli = Cli::try_parse_from([
            "relcheck", "sfv", "-r", "-w", "4", "--buffer-size", "8192", "--output", "json",
            "/releases",
        ])
        .unwrap();
        match cli.command {
            Command::Sfv(args) => {
                let opts = args.options();
                assert_eq!(opts.workers, 4);
                assert_eq!(opts.buffer_size, 8192);
                assert!(opts.recursive);
                assert_eq!(opts.format, OutputFormat::Json);
            }
            _ => panic!("expected sfv subcommand"),
        }
    }

    #[test]
    fn test_validate_flags() {
        let cli = Cli::try_parse_from([
            "relcheck",
            "validate",
            "--preset",
            "rules.yaml",
            "--overwrite",
            "movie",
            "/releases/a",
            "/releases/b",
        ])
        .unwrap();
        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.preset.as_deref(), Some(std::path::Path::new("rules.yaml")));
                assert_eq!(args.overwrite_category, "movie");
                assert_eq!(args.common.folders.len(), 2);
            }
            _ => panic!("expected validate subcommand"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["relcheck", "sfv", "-q", "-v"]).is_err());
    }
}
