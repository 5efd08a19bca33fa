use anyhow::{bail, Result};
use clap::Parser;

use relcheck::cli::{Cli, Command};
use relcheck::{archive, rules, sfv};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let clean = match &cli.command {
        Command::Sfv(args) => sfv::validate_sfv_folders(&args.common.folders, &args.options()),
        Command::Zip(args) => archive::validate_zip_folders(&args.common.folders, &args.options()),
        Command::Validate(args) => rules::validate_structure_folders(
            &args.common.folders,
            args.preset.as_deref(),
            &args.overwrite_category,
            &args.options(),
        ),
    };

    if !clean {
        bail!("one or more folders had errors");
    }

    Ok(())
}
