//! Result reporting
//!
//! A `SampleReport` captures one finished sampling call; `text` renders it
//! for the console and `json` serializes it.

pub mod json;
pub mod text;

use crate::array::DynArray;
use crate::engine::ExecContext;
use crate::kernel::ExecPolicy;
use crate::op::MultiSampleOp;
use crate::shape::samples_per_element;

/// Everything needed to report one sampling call
#[derive(Debug, Clone)]
pub struct SampleReport {
    pub operator: &'static str,
    pub input_names: &'static [&'static str],
    pub context: ExecContext,
    pub policy: ExecPolicy,
    pub seed: Option<u64>,
    pub sample_shape: Vec<usize>,
    pub output: DynArray,
}

impl SampleReport {
    pub fn new(
        op: &MultiSampleOp,
        output: DynArray,
        context: ExecContext,
        policy: ExecPolicy,
        seed: Option<u64>,
    ) -> Self {
        Self {
            operator: op.name(),
            input_names: op.input_names(),
            context,
            policy,
            seed,
            sample_shape: op.param().shape.clone(),
            output,
        }
    }

    pub fn output_shape(&self) -> &[usize] {
        self.output.shape()
    }

    /// Broadcast parameter shape (output shape minus the sample dimensions)
    pub fn input_shape(&self) -> &[usize] {
        let shape = self.output.shape();
        let n = shape.len().saturating_sub(self.sample_shape.len());
        &shape[..n]
    }

    /// Mean of each parameter element's block of samples
    pub fn block_means(&self) -> Vec<f64> {
        let k = samples_per_element(&self.sample_shape);
        self.output
            .to_f64_vec()
            .chunks(k)
            .map(|block| block.iter().sum::<f64>() / block.len() as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::NdArray;
    use crate::distribution::Distribution;
    use crate::op::MultiSampleParam;

    pub(crate) fn report() -> SampleReport {
        let op = MultiSampleOp::new(Distribution::Uniform, MultiSampleParam::with_shape(vec![2]));
        let output = NdArray::new(vec![2, 2], vec![0.25f32, 0.75, 3.0, 3.5])
            .unwrap()
            .into();
        SampleReport::new(&op, output, ExecContext::cpu(0), ExecPolicy::Sequential, Some(42))
    }

    #[test]
    fn test_report_shapes() {
        let r = report();
        assert_eq!(r.output_shape(), &[2, 2]);
        assert_eq!(r.input_shape(), &[2]);
        assert_eq!(r.sample_shape, vec![2]);
    }

    #[test]
    fn test_block_means() {
        assert_eq!(report().block_means(), vec![0.5, 3.25]);
    }
}
