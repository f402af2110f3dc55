// Declare modules
pub mod cli;
pub mod config;
pub mod describe;
pub mod extractor;
pub mod inventory;
pub mod models;
pub mod prompt;
pub mod scanner;
pub mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::io;

use self::cli::Cli;
use self::config::{load_file_config, resolve_config, Defaults, UserAnswers};
use self::describe::NativeDescriber;
use self::inventory::DataInventory;
use self::prompt::Prompter;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Layer defaults: built-ins, then config file
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let file_config = load_file_config(args.config.as_deref())?;
    let defaults = Defaults::builtin(&cwd).with_file(file_config);

    // 3. Ask for whatever the flags left open
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let mode = match args.mode {
        Some(mode) => mode,
        None => prompter.select_mode()?,
    };
    let input = match args.input.clone() {
        Some(input) => Some(input),
        None => prompter.ask_input_path(mode)?,
    };
    let output_directory = match args.output_dir.clone() {
        Some(dir) => Some(dir),
        None => prompter.ask_output_directory()?,
    };

    let config = resolve_config(
        &args,
        mode,
        UserAnswers {
            input,
            output_directory,
        },
        defaults,
    );
    log::debug!("Resolved config: {:?}", config);

    // 4. Collect, describe, write
    let describer = NativeDescriber::new(config.ogrinfo.clone());
    let mut inventory = DataInventory::new(config, &describer);

    inventory.collect_paths()?;
    if inventory.file_paths().is_empty() {
        log::warn!("⚠️ No datasets found in {:?}", inventory.input());
    }

    inventory.extract_metadata();
    let target = inventory.write_csv()?;

    log::info!(
        "Inventoried {} feature classes from {} datasets into {:?}",
        inventory.records().len(),
        inventory.file_paths().len(),
        target
    );

    Ok(())
}
