use clap::Parser;
use log::{debug, info};
use std::fs;

use tfimport::cli::Cli;
use tfimport::display::Display;
use tfimport::error::{Result, TfimportError};
use tfimport::executor::execute_imports;
use tfimport::plan::PlanFilter;
use tfimport::{PatternSet, Resolver, StateDocument};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Display::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Runs the whole pipeline and returns the process exit code
fn run(cli: &Cli) -> Result<i32> {
    let mut state = StateDocument::load(&cli.state_file)?;
    let patterns = PatternSet::load(&cli.patterns_file)?;

    let mut skipped = 0;
    if let Some(plan_path) = &cli.plan_json {
        let filter = PlanFilter::load(plan_path, &cli.plan_actions)?;
        info!("Plan {:?} touches {} resources", plan_path, filter.len());
        skipped += filter.restrict(&mut state).len();
    }

    let resolver = Resolver::new(cli.resolver_config());
    debug!("Resolver configuration: {:?}", resolver.config());
    let resolution = resolver.resolve(&state, &patterns);
    skipped += resolution.diagnostics.len();

    if skipped > 0 {
        info!("Skipped {} resources or instances", skipped);
    }

    if resolution.records.is_empty() {
        Display::print_warning(
            "No matching resources found in the state file for the provided patterns. Nothing to do.",
        );
        return Ok(0);
    }

    if cli.execute {
        let summary = execute_imports(&resolution.records, &cli.working_dir)?;
        if summary.failed > 0 || summary.cancelled {
            Display::print_warning(&format!(
                "{} imports succeeded, {} failed",
                summary.succeeded, summary.failed
            ));
            return Ok(1);
        }
        Display::print_success(&format!("{} imports succeeded", summary.succeeded));
        return Ok(0);
    }

    let text = cli.format.renderer().render(&resolution.records)?;
    match &cli.output_file {
        Some(path) => {
            fs::write(path, text).map_err(|source| TfimportError::WriteError {
                path: path.clone(),
                source,
            })?;
            Display::print_success(&format!(
                "{} import entries ({}) written to {}",
                resolution.records.len(),
                cli.format,
                path.display()
            ));
        }
        None => print!("{}", text),
    }

    Ok(0)
}
