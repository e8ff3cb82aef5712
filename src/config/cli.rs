//! CLI argument parsing using clap

use crate::config::OutputFormat;
use crate::distribution::Distribution;
use crate::dtype::DType;
use clap::Parser;
use std::path::PathBuf;

/// multisample - Concurrent sampling from many parameterized distributions
#[derive(Parser, Debug)]
#[command(name = "multisample")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Distribution to sample from
    ///
    /// Optional when --config names one or --list is given.
    #[arg(value_enum, value_name = "DISTRIBUTION")]
    pub distribution: Option<Distribution>,

    /// TOML configuration file (CLI options override it)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Inputs ===
    /// First parameter array, comma-separated (e.g., "0,2.5")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub p1: Vec<f64>,

    /// Second parameter array, comma-separated (two-parameter distributions)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub p2: Vec<f64>,

    /// Shape of the first parameter array, comma-separated (default: 1-D)
    #[arg(long, value_delimiter = ',')]
    pub p1_shape: Vec<usize>,

    /// Shape of the second parameter array, comma-separated (default: 1-D)
    #[arg(long, value_delimiter = ',')]
    pub p2_shape: Vec<usize>,

    /// Element type of both parameter arrays
    #[arg(long, value_enum)]
    pub input_dtype: Option<DType>,

    // === Sampling ===
    /// Samples drawn per distribution, comma-separated (e.g., "2,3")
    #[arg(short = 's', long, value_delimiter = ',')]
    pub shape: Vec<usize>,

    /// Output element type (float types only)
    #[arg(long, value_enum)]
    pub dtype: Option<DType>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// CPU context whose random engine is used
    #[arg(long)]
    pub context: Option<u32>,

    /// Worker threads (1 = sequential, 0 = one per CPU)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    // === Output ===
    /// Output format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// List the registered operators and their documentation
    #[arg(long)]
    pub list: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        // Listing needs nothing else
        if self.list {
            return Ok(());
        }

        if self.distribution.is_none() && self.config.is_none() {
            anyhow::bail!("must specify a distribution or --config");
        }

        if self.config.is_none() && self.p1.is_empty() {
            anyhow::bail!("--p1 is required without --config");
        }

        if let Some(d) = self.distribution {
            if d.num_inputs() == 1 && !self.p2.is_empty() {
                anyhow::bail!("{} takes one parameter array, but --p2 was given", d);
            }
            if d.num_inputs() == 2 && self.config.is_none() && self.p2.is_empty() {
                anyhow::bail!(
                    "{} takes two parameter arrays ({}), --p2 is required",
                    d,
                    d.input_names().join(", ")
                );
            }
        }

        if self.shape.contains(&0) {
            anyhow::bail!("sample shape dimensions must be positive, got {:?}", self.shape);
        }

        if let Some(dtype) = self.dtype {
            if !dtype.is_float() {
                anyhow::bail!("--dtype must be a float type, got {}", dtype);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("multisample").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_two_parameter_run() {
        let cli = parse(&[
            "uniform", "--p1", "0,2.5", "--p2", "1,3.7", "--shape", "2,3", "--seed", "42",
        ]);
        assert_eq!(cli.distribution, Some(Distribution::Uniform));
        assert_eq!(cli.p1, vec![0.0, 2.5]);
        assert_eq!(cli.p2, vec![1.0, 3.7]);
        assert_eq!(cli.shape, vec![2, 3]);
        assert_eq!(cli.seed, Some(42));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_negative_values_and_aliases() {
        let cli = parse(&["negative-binomial", "--p1", "20,49", "--p2", "0.4,0.77"]);
        assert_eq!(cli.distribution, Some(Distribution::NegativeBinomial));

        let cli = parse(&["normal", "--p1", "-1.5,2", "--p2", "1,1", "--format", "json"]);
        assert_eq!(cli.p1, vec![-1.5, 2.0]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_validate_rejects_missing_p2() {
        let cli = parse(&["gamma", "--p1", "1,2"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_extra_p2() {
        let cli = parse(&["poisson", "--p1", "1", "--p2", "2"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_dim_and_int_dtype() {
        let cli = parse(&["exponential", "--p1", "1", "--shape", "2,0"]);
        assert!(cli.validate().is_err());

        let cli = parse(&["exponential", "--p1", "1", "--dtype", "int32"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_list_and_config_only() {
        assert!(parse(&["--list"]).validate().is_ok());
        assert!(parse(&["--config", "run.toml"]).validate().is_ok());
        assert!(parse(&[]).validate().is_err());
    }
}
