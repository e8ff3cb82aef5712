//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<SamplingConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<SamplingConfig> {
    let config: SamplingConfig =
        ::toml::from_str(contents).context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the run configuration from CLI arguments alone
pub fn config_from_cli(cli: &Cli) -> Result<SamplingConfig> {
    let distribution = cli
        .distribution
        .context("a distribution is required when no config file is given")?;
    merge_cli_with_config(cli, SamplingConfig::new(distribution))
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: SamplingConfig) -> Result<SamplingConfig> {
    if let Some(distribution) = cli.distribution {
        config.distribution = distribution;
    }

    // Override inputs; each CLI array carries its own shape (default 1-D)
    let cli_inputs: Vec<(&Vec<f64>, &Vec<usize>)> =
        [(&cli.p1, &cli.p1_shape), (&cli.p2, &cli.p2_shape)]
            .into_iter()
            .filter(|(values, _)| !values.is_empty())
            .collect();
    if !cli_inputs.is_empty() {
        config.inputs = cli_inputs
            .into_iter()
            .map(|(values, shape)| InputConfig {
                values: values.clone(),
                shape: if shape.is_empty() { None } else { Some(shape.clone()) },
                dtype: None,
            })
            .collect();
    } else {
        // Shape flags alone reshape the configured arrays
        for (input, shape) in config.inputs.iter_mut().zip([&cli.p1_shape, &cli.p2_shape]) {
            if !shape.is_empty() {
                input.shape = Some(shape.clone());
            }
        }
    }
    // One dtype for all arrays: operators require matching input types
    if let Some(dtype) = cli.input_dtype {
        for input in &mut config.inputs {
            input.dtype = Some(dtype);
        }
    }

    // Override sampling settings
    if !cli.shape.is_empty() {
        config.shape = cli.shape.clone();
    }
    if cli.dtype.is_some() {
        config.dtype = cli.dtype;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(context) = cli.context {
        config.context = context;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    // Override output
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    Ok(config)
}
