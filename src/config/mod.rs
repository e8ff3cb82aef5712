//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! A `SamplingConfig` describes one sampling run: which operator, its
//! parameter arrays, the sample shape and how to execute it.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::array::DynArray;
use crate::distribution::Distribution;
use crate::dtype::DType;
use crate::engine::ExecContext;
use crate::kernel::ExecPolicy;
use crate::op::{MultiSampleOp, MultiSampleParam};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete sampling run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Distribution to sample from
    pub distribution: Distribution,
    /// Samples drawn per parameter element
    #[serde(default)]
    pub shape: Vec<usize>,
    /// Requested output element type (float types only)
    #[serde(default)]
    pub dtype: Option<DType>,
    /// Base seed for the resource manager (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    /// CPU context id whose engine is used
    #[serde(default)]
    pub context: u32,
    /// Worker threads (1 = sequential, 0 = one per CPU)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Parameter arrays, in operator input order
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_threads() -> usize {
    1
}

impl SamplingConfig {
    /// Configuration with no inputs and default execution settings
    pub fn new(distribution: Distribution) -> Self {
        Self {
            distribution,
            shape: Vec::new(),
            dtype: None,
            seed: None,
            context: 0,
            threads: default_threads(),
            inputs: Vec::new(),
            output: OutputConfig::default(),
        }
    }

    pub fn param(&self) -> MultiSampleParam {
        MultiSampleParam {
            shape: self.shape.clone(),
            dtype: self.dtype,
        }
    }

    pub fn operator(&self) -> MultiSampleOp {
        MultiSampleOp::new(self.distribution, self.param())
    }

    pub fn exec_context(&self) -> ExecContext {
        ExecContext::cpu(self.context)
    }

    pub fn exec_policy(&self) -> ExecPolicy {
        match self.threads {
            0 => ExecPolicy::from_threads(num_cpus::get()),
            n => ExecPolicy::from_threads(n),
        }
    }

    /// Materialize every input as a typed array
    pub fn input_arrays(&self) -> crate::Result<Vec<DynArray>> {
        self.inputs.iter().map(InputConfig::to_array).collect()
    }
}

/// One parameter array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Values in row-major order
    pub values: Vec<f64>,
    /// Array shape (default: one-dimensional over `values`)
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
    /// Element type (default: float32)
    #[serde(default)]
    pub dtype: Option<DType>,
}

impl InputConfig {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            shape: None,
            dtype: None,
        }
    }

    pub fn resolved_shape(&self) -> Vec<usize> {
        self.shape.clone().unwrap_or_else(|| vec![self.values.len()])
    }

    pub fn resolved_dtype(&self) -> DType {
        self.dtype.unwrap_or_default()
    }

    pub fn to_array(&self) -> crate::Result<DynArray> {
        DynArray::from_f64(self.resolved_dtype(), self.resolved_shape(), &self.values)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
