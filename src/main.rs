//! multisample CLI entry point

use anyhow::{Context, Result};
use multisample::config::cli::Cli;
use multisample::config::toml::{config_from_cli, merge_cli_with_config, parse_toml_file};
use multisample::config::{validator, OutputFormat, SamplingConfig};
use multisample::output::{json, text, SampleReport};
use multisample::{OpRegistry, ResourceManager};
use tracing::Level;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    cli.validate()?;

    if cli.list {
        print_registry(&OpRegistry::new());
        return Ok(());
    }

    // Build configuration (file first, CLI overrides on top)
    let config = match &cli.config {
        Some(path) => merge_cli_with_config(&cli, parse_toml_file(path)?)?,
        None => config_from_cli(&cli)?,
    };

    validator::validate_config(&config).context("Configuration validation failed")?;

    run(&config)
}

/// Execute one sampling call and print its report
fn run(config: &SamplingConfig) -> Result<()> {
    let manager = match config.seed {
        Some(seed) => ResourceManager::with_seed(seed),
        None => ResourceManager::new(),
    };
    let context = config.exec_context();
    let engine = manager
        .request(context)
        .with_context(|| format!("Failed to acquire random engine for {}", context))?;

    let op = config.operator();
    let policy = config.exec_policy();
    let inputs = config.input_arrays().context("Failed to build input arrays")?;
    let input_refs: Vec<_> = inputs.iter().collect();

    tracing::info!(
        "Running {} on {} ({}), sample shape {:?}",
        op.name(),
        context,
        policy,
        config.shape
    );

    let output = op
        .forward(&input_refs, &engine, policy)
        .with_context(|| format!("{} failed", op.name()))?;

    tracing::debug!(
        "{} produced {} value(s) of {}",
        op.name(),
        output.elem_count(),
        output.dtype()
    );

    let report = SampleReport::new(&op, output, context, policy, config.seed);
    match config.output.format {
        OutputFormat::Text => text::print_results(&report),
        OutputFormat::Json => json::print_json(&report)?,
    }

    Ok(())
}

/// Print every registered operator with its documentation
fn print_registry(registry: &OpRegistry) {
    println!("Registered operators ({}):", registry.len());
    for (name, distribution) in registry.iter() {
        println!();
        println!("{}", name);
        println!("{}", "-".repeat(name.len()));
        for (input, desc) in distribution
            .input_names()
            .iter()
            .zip(distribution.input_descriptions())
        {
            println!("  {:<6} {}", input, desc);
        }
        println!();
        for line in distribution.describe().lines() {
            println!("  {}", line);
        }
    }
}
