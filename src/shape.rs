//! Shape and type inference for the sampling operators
//!
//! Runs once, before any sampling. For parameter shape `[s]` (rank n) and a
//! configured sample shape `[t]` (rank m):
//!
//! - `[t]` empty: the output shape is `[s]`, one sample per element
//! - otherwise: the output shape is `[s] ++ [t]`, rank n + m
//!
//! Two-parameter distributions first broadcast their parameter shapes to a
//! common `[s]` using the usual right-aligned rules.

use crate::distribution::{Distribution, OutputPolicy};
use crate::dtype::DType;
use crate::error::{Result, SampleError};

/// Compute the broadcast shape of two shapes
///
/// Returns None if the shapes are incompatible for broadcasting.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let max_ndim = a.len().max(b.len());
    let mut result = Vec::with_capacity(max_ndim);

    // Iterate from right to left
    for i in 0..max_ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else if b_dim == 1 {
            result.push(a_dim);
        } else {
            return None;
        }
    }

    result.reverse();
    Some(result)
}

/// Reject sample shapes with a zero dimension or an overflowing size
pub fn validate_sample_shape(sample_shape: &[usize]) -> Result<()> {
    let overflows = sample_shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .is_none();
    if overflows || sample_shape.iter().any(|&d| d == 0) {
        return Err(SampleError::InvalidSampleShape {
            shape: sample_shape.to_vec(),
        });
    }
    Ok(())
}

/// Number of samples drawn per parameter element
pub fn samples_per_element(sample_shape: &[usize]) -> usize {
    sample_shape.iter().product::<usize>().max(1)
}

/// Broadcast all parameter shapes to their common shape
///
/// Returns `Ok(None)` when any input shape is still unresolved.
pub fn broadcast_inputs(inputs: &[Option<&[usize]>]) -> Result<Option<Vec<usize>>> {
    let mut common: Option<Vec<usize>> = None;
    for input in inputs {
        let Some(shape) = input else {
            return Ok(None);
        };
        common = Some(match common {
            None => shape.to_vec(),
            Some(acc) => {
                broadcast_shape(&acc, shape).ok_or_else(|| SampleError::broadcast(&acc, shape))?
            }
        });
    }
    Ok(common)
}

/// Compose the output shape from parameter shapes and the sample shape
///
/// `Ok(None)` defers: at least one input shape is not known yet.
pub fn compose_output_shape(
    inputs: &[Option<&[usize]>],
    sample_shape: &[usize],
) -> Result<Option<Vec<usize>>> {
    validate_sample_shape(sample_shape)?;
    let Some(mut shape) = broadcast_inputs(inputs)? else {
        return Ok(None);
    };
    shape.extend_from_slice(sample_shape);
    Ok(Some(shape))
}

/// Recover the common parameter shape from a known output shape
///
/// The output must end with the sample shape; the remaining prefix is the
/// parameter shape.
pub fn infer_input_shape(output: &[usize], sample_shape: &[usize]) -> Result<Vec<usize>> {
    validate_sample_shape(sample_shape)?;
    if output.len() < sample_shape.len() {
        return Err(SampleError::shape_mismatch(sample_shape, output));
    }
    let split = output.len() - sample_shape.len();
    if &output[split..] != sample_shape {
        return Err(SampleError::shape_mismatch(sample_shape, &output[split..]));
    }
    Ok(output[..split].to_vec())
}

/// Resolve the output element type for a distribution
///
/// All inputs must be resolved to one common type. A requested type must be
/// a float type. Without a request, `PreserveInput` keeps the input type and
/// `Count` keeps float inputs while mapping integral inputs to `float32`.
pub fn infer_output_dtype(
    distribution: Distribution,
    inputs: &[Option<DType>],
    requested: Option<DType>,
) -> Result<DType> {
    let mut common: Option<DType> = None;
    for (i, input) in inputs.iter().enumerate() {
        let dtype = input.ok_or_else(|| {
            SampleError::type_mismatch(format!(
                "{}: type of input '{}' is unresolved",
                distribution.op_name(),
                distribution.input_names()[i]
            ))
        })?;
        match common {
            None => common = Some(dtype),
            Some(c) if c != dtype => {
                return Err(SampleError::type_mismatch(format!(
                    "{}: inputs must share one type, got {} and {}",
                    distribution.op_name(),
                    c,
                    dtype
                )));
            }
            Some(_) => {}
        }
    }
    let input = common.ok_or_else(|| {
        SampleError::type_mismatch(format!("{}: no input types given", distribution.op_name()))
    })?;

    if let Some(dtype) = requested {
        if !dtype.is_float() {
            return Err(SampleError::type_mismatch(format!(
                "{}: requested output type {} is not a float type",
                distribution.op_name(),
                dtype
            )));
        }
        return Ok(dtype);
    }

    Ok(match distribution.output_policy() {
        OutputPolicy::PreserveInput => input,
        OutputPolicy::Count if input.is_float() => input,
        OutputPolicy::Count => DType::Float32,
    })
}

/// Maps flat indices of a broadcast shape onto a source array
///
/// Dimensions where the source has extent 1 (or that the source lacks
/// entirely) get stride 0, so the same source element is read repeatedly.
#[derive(Debug, Clone)]
pub struct BroadcastIndexer {
    target: Vec<usize>,
    strides: Vec<usize>,
    identity: bool,
}

impl BroadcastIndexer {
    pub fn new(source: &[usize], target: &[usize]) -> Result<Self> {
        if source.len() > target.len() {
            return Err(SampleError::broadcast(source, target));
        }
        let offset = target.len() - source.len();
        let mut strides = vec![0; target.len()];
        let mut stride = 1;
        for i in (0..source.len()).rev() {
            let dim = source[i];
            let t = target[offset + i];
            if dim == t {
                strides[offset + i] = stride;
            } else if dim != 1 {
                return Err(SampleError::broadcast(source, target));
            }
            stride *= dim;
        }
        Ok(Self {
            target: target.to_vec(),
            strides,
            identity: source == target,
        })
    }

    /// Source offset for flat index `index` in the target shape
    #[inline]
    pub fn source_index(&self, index: usize) -> usize {
        if self.identity {
            return index;
        }
        let mut rem = index;
        let mut offset = 0;
        for (dim, stride) in self.target.iter().zip(&self.strides).rev() {
            offset += (rem % dim) * stride;
            rem /= dim;
        }
        offset
    }
}
