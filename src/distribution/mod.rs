//! Distribution samplers
//!
//! This module provides the seven per-element samplers used by the
//! multi-sample kernels. Every sampler is built from one or two parameter
//! values plus a 32-bit seed, owns a private xoshiro256++ generator, and then
//! produces one value of its element type per `draw()`.
//!
//! # Distributions
//!
//! - **Uniform** (`low`, `high`): half-open interval `[low, high)`
//! - **Normal** (`mu`, `sigma`): mean and standard deviation
//! - **Gamma** (`alpha`, `beta`): shape and scale
//! - **Exponential** (`lam`): rate
//! - **Poisson** (`lam`): rate
//! - **NegativeBinomial** (`k`, `p`): failures before the k-th success
//! - **GeneralizedNegativeBinomial** (`mu`, `alpha`): mean and dispersion
//!
//! # Output types
//!
//! The continuous samplers draw in `T::Real` precision and coerce with
//! `Element::from_real`, which truncates toward zero for integral elements.
//! Uniform coerces with `Element::from_real_floor` instead. The count
//! samplers draw integral counts in `T::Count` and coerce with
//! `Element::from_count`.
//!
//! # Example
//!
//! ```
//! use multisample::distribution::{Sampler, uniform::UniformSampler};
//!
//! let mut sampler = UniformSampler::<f32>::new(0.0, 1.0, 42).unwrap();
//! let value: f32 = sampler.draw();
//! assert!((0.0..1.0).contains(&value));
//! ```

use crate::error::SampleError;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod exponential;
pub mod gamma;
pub mod generalized_negative_binomial;
pub mod negative_binomial;
pub mod normal;
pub mod poisson;
pub mod uniform;

/// Per-element sampler
///
/// Constructed once per parameter element and invoked once per requested
/// sample. One-parameter distributions ignore `p2`.
///
/// # Thread Safety
///
/// A sampler never touches the shared engine; its whole stream is fixed by
/// the seed it was given. Parallel kernels build each sampler on the worker
/// thread that uses it, so samplers need not be `Send`.
pub trait Sampler<T>: Sized {
    /// Build a sampler for parameters `(p1, p2)` seeded with `seed`
    ///
    /// Fails with `SampleError::InvalidParameter` when the underlying
    /// distribution rejects the parameters.
    fn new(p1: f64, p2: f64, seed: u32) -> crate::Result<Self>;

    /// Draw one sample
    fn draw(&mut self) -> T;
}

/// Generator owned by one sampler instance
#[inline]
pub(crate) fn sampler_rng(seed: u32) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed as u64)
}

/// Parameter error for `distribution`; the kernel fills in the element index
pub(crate) fn invalid(distribution: Distribution, reason: impl Into<String>) -> SampleError {
    SampleError::InvalidParameter {
        distribution: distribution.short_name(),
        index: 0,
        reason: reason.into(),
    }
}

/// How a distribution picks its output element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Output keeps the input element type
    PreserveInput,
    /// Integral counts, always published as a float type
    Count,
}

/// Distribution tag, selected once when an operator is configured
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    Uniform,
    Normal,
    Gamma,
    Exponential,
    Poisson,
    #[value(alias = "negative_binomial")]
    NegativeBinomial,
    #[value(alias = "generalized_negative_binomial")]
    GeneralizedNegativeBinomial,
}

impl Distribution {
    pub const ALL: [Distribution; 7] = [
        Distribution::Uniform,
        Distribution::Normal,
        Distribution::Gamma,
        Distribution::Exponential,
        Distribution::Poisson,
        Distribution::NegativeBinomial,
        Distribution::GeneralizedNegativeBinomial,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            Distribution::Uniform => "uniform",
            Distribution::Normal => "normal",
            Distribution::Gamma => "gamma",
            Distribution::Exponential => "exponential",
            Distribution::Poisson => "poisson",
            Distribution::NegativeBinomial => "negative_binomial",
            Distribution::GeneralizedNegativeBinomial => "generalized_negative_binomial",
        }
    }

    /// Operator name registered with the host (`sample_<short name>`)
    pub fn op_name(self) -> &'static str {
        match self {
            Distribution::Uniform => "sample_uniform",
            Distribution::Normal => "sample_normal",
            Distribution::Gamma => "sample_gamma",
            Distribution::Exponential => "sample_exponential",
            Distribution::Poisson => "sample_poisson",
            Distribution::NegativeBinomial => "sample_negative_binomial",
            Distribution::GeneralizedNegativeBinomial => "sample_generalized_negative_binomial",
        }
    }

    pub fn num_inputs(self) -> usize {
        self.input_names().len()
    }

    pub fn input_names(self) -> &'static [&'static str] {
        match self {
            Distribution::Uniform => &["low", "high"],
            Distribution::Normal => &["mu", "sigma"],
            Distribution::Gamma => &["alpha", "beta"],
            Distribution::Exponential | Distribution::Poisson => &["lam"],
            Distribution::NegativeBinomial => &["k", "p"],
            Distribution::GeneralizedNegativeBinomial => &["mu", "alpha"],
        }
    }

    pub fn input_descriptions(self) -> &'static [&'static str] {
        match self {
            Distribution::Uniform => &[
                "Lower bounds of the distributions.",
                "Upper bounds of the distributions.",
            ],
            Distribution::Normal => &[
                "Means of the distributions.",
                "Standard deviations of the distributions.",
            ],
            Distribution::Gamma => &[
                "Alpha (shape) parameters of the distributions.",
                "Beta (scale) parameters of the distributions.",
            ],
            Distribution::Exponential | Distribution::Poisson => {
                &["Lambda (rate) parameters of the distributions."]
            }
            Distribution::NegativeBinomial => &[
                "Limits of unsuccessful experiments.",
                "Failure probabilities in each experiment.",
            ],
            Distribution::GeneralizedNegativeBinomial => &[
                "Means of the distributions.",
                "Alpha (dispersion) parameters of the distributions.",
            ],
        }
    }

    pub fn output_policy(self) -> OutputPolicy {
        match self {
            Distribution::Uniform
            | Distribution::Normal
            | Distribution::Gamma
            | Distribution::Exponential => OutputPolicy::PreserveInput,
            Distribution::Poisson
            | Distribution::NegativeBinomial
            | Distribution::GeneralizedNegativeBinomial => OutputPolicy::Count,
        }
    }

    /// Look a distribution up by operator name
    pub fn from_op_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.op_name() == name)
    }

    /// Help text for the host framework's documentation system
    pub fn describe(self) -> String {
        let summary = match self {
            Distribution::Uniform => {
                "Concurrent sampling from multiple uniform distributions on the intervals \
                 given by [low, high)."
            }
            Distribution::Normal => {
                "Concurrent sampling from multiple normal distributions with parameters \
                 mu (mean) and sigma (standard deviation)."
            }
            Distribution::Gamma => {
                "Concurrent sampling from multiple gamma distributions with parameters \
                 alpha (shape) and beta (scale)."
            }
            Distribution::Exponential => {
                "Concurrent sampling from multiple exponential distributions with \
                 parameters lam (rate)."
            }
            Distribution::Poisson => {
                "Concurrent sampling from multiple Poisson distributions with parameters \
                 lam (rate)."
            }
            Distribution::NegativeBinomial => {
                "Concurrent sampling from multiple negative binomial distributions with \
                 parameters k (failure limit) and p (failure probability)."
            }
            Distribution::GeneralizedNegativeBinomial => {
                "Concurrent sampling from multiple generalized negative binomial \
                 distributions with parameters mu (mean) and alpha (dispersion)."
            }
        };

        let mut doc = String::from(summary);
        doc.push_str(
            "\n\nLet [s] be the shape of the input arrays and [t] the configured sample \
             shape. The output has shape [s] x [t]; output[i] holds the samples drawn \
             from the distribution parameterized by the inputs at index i. Without a \
             sample shape one sample is drawn per distribution and the output has the \
             shape of the inputs.",
        );
        if self.output_policy() == OutputPolicy::Count {
            doc.push_str("\n\nSamples are always returned as a floating point data type.");
        }
        doc
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let key = key.strip_prefix("sample_").unwrap_or(&key);
        Self::ALL
            .into_iter()
            .find(|d| d.short_name() == key)
            .ok_or_else(|| format!("unknown distribution '{}'", s))
    }
}
