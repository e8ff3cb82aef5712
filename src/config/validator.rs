//! Configuration validation
//!
//! Catches malformed runs before any engine is created or seed is drawn.

use super::*;
use crate::array::elem_count;
use anyhow::{Context, Result};

/// Validate complete configuration
pub fn validate_config(config: &SamplingConfig) -> Result<()> {
    validate_inputs(config)?;
    validate_sampling(config)?;

    // Shapes and types must also pass the operator's own inference
    let op = config.operator();
    let shapes: Vec<Vec<usize>> = config.inputs.iter().map(|i| i.resolved_shape()).collect();
    let shape_refs: Vec<Option<&[usize]>> = shapes.iter().map(|s| Some(s.as_slice())).collect();
    op.infer_shape(&shape_refs)
        .with_context(|| format!("{} inputs cannot be combined", op.name()))?;

    let dtypes: Vec<Option<DType>> = config
        .inputs
        .iter()
        .map(|i| Some(i.resolved_dtype()))
        .collect();
    op.infer_type(&dtypes)
        .with_context(|| format!("{} has no valid output type", op.name()))?;

    Ok(())
}

/// Validate input count and per-input shapes
pub fn validate_inputs(config: &SamplingConfig) -> Result<()> {
    let d = config.distribution;
    if config.inputs.len() != d.num_inputs() {
        anyhow::bail!(
            "{} takes {} input(s) ({}), got {}",
            d,
            d.num_inputs(),
            d.input_names().join(", "),
            config.inputs.len()
        );
    }

    for (input, name) in config.inputs.iter().zip(d.input_names()) {
        if input.values.is_empty() {
            anyhow::bail!("input '{}' has no values", name);
        }
        let shape = input.resolved_shape();
        let expected = elem_count(&shape);
        if expected != input.values.len() {
            anyhow::bail!(
                "input '{}' declares shape {:?} ({} elements) but has {} values",
                name,
                shape,
                expected,
                input.values.len()
            );
        }
    }

    Ok(())
}

/// Validate sample shape, requested type and thread count
pub fn validate_sampling(config: &SamplingConfig) -> Result<()> {
    if config.shape.contains(&0) {
        anyhow::bail!(
            "sample shape dimensions must be positive, got {:?}",
            config.shape
        );
    }

    if let Some(dtype) = config.dtype {
        if !dtype.is_float() {
            anyhow::bail!("requested dtype must be a float type, got {}", dtype);
        }
    }

    if config.threads > 1024 {
        anyhow::bail!("threads must be at most 1024, got {}", config.threads);
    }

    Ok(())
}
