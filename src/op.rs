//! Operator surface
//!
//! One operator per distribution (`sample_uniform`, `sample_normal`, ...),
//! all with the same calling convention:
//!
//! - Inputs: one (`exponential`, `poisson`) or two parameter arrays
//! - Configuration: `MultiSampleParam` (sample `shape`, optional `dtype`)
//! - Output: one array of shape `inputs ++ shape`
//! - Resources: exclusive use of one random engine for the call
//! - Gradient: zero with respect to every input
//!
//! `forward` always runs shape and type inference first, so mismatches fail
//! before any seed is drawn.
//!
//! # Example
//!
//! ```
//! use multisample::array::{DynArray, NdArray};
//! use multisample::engine::EngineResource;
//! use multisample::kernel::ExecPolicy;
//! use multisample::op::{MultiSampleOp, MultiSampleParam};
//! use multisample::distribution::Distribution;
//!
//! let low: DynArray = NdArray::from_vec(vec![0.0f32, 2.5]).into();
//! let high: DynArray = NdArray::from_vec(vec![1.0f32, 3.7]).into();
//! let op = MultiSampleOp::new(Distribution::Uniform, MultiSampleParam::with_shape(vec![2]));
//! let engine = EngineResource::with_seed(42);
//!
//! let out = op.forward(&[&low, &high], &engine, ExecPolicy::Sequential).unwrap();
//! assert_eq!(out.shape(), &[2, 2]);
//! ```

use crate::array::{DynArray, FromDynArray, NdArray};
use crate::distribution::exponential::ExponentialSampler;
use crate::distribution::gamma::GammaSampler;
use crate::distribution::generalized_negative_binomial::GeneralizedNegativeBinomialSampler;
use crate::distribution::negative_binomial::NegativeBinomialSampler;
use crate::distribution::normal::NormalSampler;
use crate::distribution::poisson::PoissonSampler;
use crate::distribution::uniform::UniformSampler;
use crate::distribution::Distribution;
use crate::dtype::{DType, Element};
use crate::engine::EngineResource;
use crate::error::{Result, SampleError};
use crate::kernel::{multi_sample, ExecPolicy};
use crate::shape::{compose_output_shape, infer_input_shape, infer_output_dtype};
use crate::with_dtype;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSampleParam {
    /// Shape of the samples drawn per parameter element (empty: one sample)
    #[serde(default)]
    pub shape: Vec<usize>,
    /// Output element type; must be a float type when set
    #[serde(default)]
    pub dtype: Option<DType>,
}

impl MultiSampleParam {
    pub fn with_shape(shape: Vec<usize>) -> Self {
        Self { shape, dtype: None }
    }
}

/// Resources an operator needs from the host for the duration of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRequest {
    /// Exclusive access to one random engine
    Random,
}

/// A configured sampling operator
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSampleOp {
    distribution: Distribution,
    param: MultiSampleParam,
}

impl MultiSampleOp {
    pub fn new(distribution: Distribution, param: MultiSampleParam) -> Self {
        Self {
            distribution,
            param,
        }
    }

    /// Create the operator registered under `name`
    pub fn from_name(name: &str, param: MultiSampleParam) -> Option<Self> {
        Distribution::from_op_name(name).map(|d| Self::new(d, param))
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn param(&self) -> &MultiSampleParam {
        &self.param
    }

    pub fn name(&self) -> &'static str {
        self.distribution.op_name()
    }

    pub fn num_inputs(&self) -> usize {
        self.distribution.num_inputs()
    }

    pub fn input_names(&self) -> &'static [&'static str] {
        self.distribution.input_names()
    }

    pub fn describe(&self) -> String {
        self.distribution.describe()
    }

    pub fn resource_request(&self) -> Vec<ResourceRequest> {
        vec![ResourceRequest::Random]
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.num_inputs() {
            return Err(SampleError::WrongInputCount {
                op: self.name(),
                expected: self.num_inputs(),
                got,
            });
        }
        Ok(())
    }

    /// Output shape, or `Ok(None)` while an input shape is unresolved
    pub fn infer_shape(&self, inputs: &[Option<&[usize]>]) -> Result<Option<Vec<usize>>> {
        self.check_arity(inputs.len())?;
        compose_output_shape(inputs, &self.param.shape)
    }

    /// Common input shape recovered from a known output shape
    pub fn infer_input_shape(&self, output: &[usize]) -> Result<Vec<usize>> {
        infer_input_shape(output, &self.param.shape)
    }

    /// Output element type
    pub fn infer_type(&self, inputs: &[Option<DType>]) -> Result<DType> {
        self.check_arity(inputs.len())?;
        infer_output_dtype(self.distribution, inputs, self.param.dtype)
    }

    /// Draw the samples
    pub fn forward(
        &self,
        inputs: &[&DynArray],
        engine: &EngineResource,
        policy: ExecPolicy,
    ) -> Result<DynArray> {
        self.check_arity(inputs.len())?;
        let shapes: Vec<Option<&[usize]>> = inputs.iter().map(|a| Some(a.shape())).collect();
        let dtypes: Vec<Option<DType>> = inputs.iter().map(|a| Some(a.dtype())).collect();
        self.infer_shape(&shapes)?;
        let out_dtype = self.infer_type(&dtypes)?;

        with_dtype!(inputs[0].dtype(), I => {
            let p1 = typed::<I>(inputs[0])?;
            let p2 = match inputs.get(1) {
                Some(a) => Some(typed::<I>(a)?),
                None => None,
            };
            with_dtype!(out_dtype, O => {
                self.run::<I, O>(p1, p2, engine, policy).map(DynArray::from)
            })
        })
    }

    fn run<I: Element, O: Element>(
        &self,
        p1: &NdArray<I>,
        p2: Option<&NdArray<I>>,
        engine: &EngineResource,
        policy: ExecPolicy,
    ) -> Result<NdArray<O>> {
        let shape = &self.param.shape;
        match self.distribution {
            Distribution::Uniform => {
                multi_sample::<UniformSampler<O>, I, O>(p1, p2, shape, engine, policy)
            }
            Distribution::Normal => {
                multi_sample::<NormalSampler<O>, I, O>(p1, p2, shape, engine, policy)
            }
            Distribution::Gamma => {
                multi_sample::<GammaSampler<O>, I, O>(p1, p2, shape, engine, policy)
            }
            Distribution::Exponential => {
                multi_sample::<ExponentialSampler<O>, I, O>(p1, p2, shape, engine, policy)
            }
            Distribution::Poisson => {
                multi_sample::<PoissonSampler<O>, I, O>(p1, p2, shape, engine, policy)
            }
            Distribution::NegativeBinomial => {
                multi_sample::<NegativeBinomialSampler<O>, I, O>(p1, p2, shape, engine, policy)
            }
            Distribution::GeneralizedNegativeBinomial => multi_sample::<
                GeneralizedNegativeBinomialSampler<O>,
                I,
                O,
            >(p1, p2, shape, engine, policy),
        }
    }

    /// Gradients with respect to each input: always zero
    pub fn gradient(&self, inputs: &[&DynArray]) -> Result<Vec<DynArray>> {
        self.check_arity(inputs.len())?;
        Ok(inputs.iter().map(|a| a.zeros_like()).collect())
    }
}

fn typed<T: FromDynArray>(array: &DynArray) -> Result<&NdArray<T>> {
    T::from_dyn(array).ok_or_else(|| {
        SampleError::type_mismatch(format!("expected {} input, got {}", T::DTYPE, array.dtype()))
    })
}

/// Name-to-operator table handed to the host framework
#[derive(Debug, Clone)]
pub struct OpRegistry {
    ops: BTreeMap<&'static str, Distribution>,
}

impl OpRegistry {
    /// Registry holding all seven sampling operators
    pub fn new() -> Self {
        let ops = Distribution::ALL.into_iter().map(|d| (d.op_name(), d)).collect();
        Self { ops }
    }

    pub fn lookup(&self, name: &str) -> Option<Distribution> {
        self.ops.get(name).copied()
    }

    /// Configure the operator registered under `name`
    pub fn create(&self, name: &str, param: MultiSampleParam) -> Option<MultiSampleOp> {
        self.lookup(name).map(|d| MultiSampleOp::new(d, param))
    }

    /// Registered operators, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Distribution)> + '_ {
        self.ops.iter().map(|(name, d)| (*name, *d))
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::new()
    }
}
