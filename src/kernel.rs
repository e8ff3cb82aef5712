//! Multi-sample forward kernel
//!
//! For every element `i` of the broadcast parameter shape, the kernel builds
//! one sampler from the parameter values at `i` and writes its `K` draws to
//! output positions `[i*K, (i+1)*K)`.
//!
//! # Engine discipline
//!
//! Per-element seeds are drawn from the shared engine under one lock, in
//! element order, before the element loop starts. The loop itself never
//! touches the engine, so it can run sequentially or on a rayon pool and
//! produce bit-identical output either way. Changing the engine state
//! (another call on the same context in between) changes the output.
//!
//! # Parameter domains
//!
//! The kernel does not validate parameter values. Values the underlying
//! distribution rejects surface as `SampleError::InvalidParameter` with the
//! element index, and no output array is returned.

use crate::array::{elem_count, NdArray};
use crate::distribution::Sampler;
use crate::dtype::Element;
use crate::engine::EngineResource;
use crate::error::{Result, SampleError};
use crate::shape::{broadcast_shape, samples_per_element, validate_sample_shape, BroadcastIndexer};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// How the element loop is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecPolicy {
    /// Elements in index order on the calling thread
    Sequential,
    /// Elements spread over a rayon pool; `threads == 0` uses the global pool,
    /// other counts share one dedicated pool per thread count
    Parallel { threads: usize },
}

impl ExecPolicy {
    /// Policy for a configured thread count (1 means sequential)
    pub fn from_threads(threads: usize) -> Self {
        if threads == 1 {
            ExecPolicy::Sequential
        } else {
            ExecPolicy::Parallel { threads }
        }
    }
}

impl Default for ExecPolicy {
    fn default() -> Self {
        Self::Sequential
    }
}

impl fmt::Display for ExecPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecPolicy::Sequential => write!(f, "sequential"),
            ExecPolicy::Parallel { threads: 0 } => write!(f, "parallel (global pool)"),
            ExecPolicy::Parallel { threads } => write!(f, "parallel ({} threads)", threads),
        }
    }
}

/// Dedicated pools, built once per thread count and reused across calls
fn thread_pool(threads: usize) -> Result<Arc<ThreadPool>> {
    static POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();

    let mut pools = POOLS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .map_err(|_| SampleError::ThreadPool("thread pool cache poisoned".to_string()))?;
    if let Some(pool) = pools.get(&threads) {
        return Ok(Arc::clone(pool));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SampleError::ThreadPool(e.to_string()))?;
    tracing::debug!("Built rayon pool with {} thread(s)", threads);
    let pool = Arc::new(pool);
    pools.insert(threads, Arc::clone(&pool));
    Ok(pool)
}

/// Draw `prod(sample_shape)` samples of `S` per broadcast parameter element
///
/// `p2` is None for one-parameter distributions; the sampler then receives
/// `0.0` as its unused second parameter. The output shape is the broadcast
/// parameter shape followed by `sample_shape`.
pub fn multi_sample<S, I, O>(
    p1: &NdArray<I>,
    p2: Option<&NdArray<I>>,
    sample_shape: &[usize],
    engine: &EngineResource,
    policy: ExecPolicy,
) -> Result<NdArray<O>>
where
    S: Sampler<O>,
    I: Element,
    O: Element,
{
    validate_sample_shape(sample_shape)?;
    let param_shape = match p2 {
        Some(arr) => broadcast_shape(p1.shape(), arr.shape())
            .ok_or_else(|| SampleError::broadcast(p1.shape(), arr.shape()))?,
        None => p1.shape().to_vec(),
    };

    let n = elem_count(&param_shape);
    let k = samples_per_element(sample_shape);
    let total = n.checked_mul(k).ok_or_else(|| SampleError::InvalidSampleShape {
        shape: sample_shape.to_vec(),
    })?;
    let mut out_shape = param_shape.clone();
    out_shape.extend_from_slice(sample_shape);

    let idx1 = BroadcastIndexer::new(p1.shape(), &param_shape)?;
    let second = match p2 {
        Some(arr) => Some((arr, BroadcastIndexer::new(arr.shape(), &param_shape)?)),
        None => None,
    };

    let seeds = engine.draw_seeds(n)?;
    tracing::debug!(
        "multi_sample: {} element(s) x {} sample(s), context {}, {}",
        n,
        k,
        engine.context(),
        policy
    );

    let fill = |(i, block): (usize, &mut [O])| -> Result<()> {
        let a = p1.data()[idx1.source_index(i)].to_f64();
        let b = match &second {
            Some((arr, idx)) => arr.data()[idx.source_index(i)].to_f64(),
            None => 0.0,
        };
        let mut sampler = S::new(a, b, seeds[i]).map_err(|e| e.at_index(i))?;
        for slot in block.iter_mut() {
            *slot = sampler.draw();
        }
        Ok(())
    };

    let mut out = vec![O::default(); total];
    match policy {
        ExecPolicy::Sequential => {
            out.chunks_mut(k).enumerate().try_for_each(fill)?;
        }
        ExecPolicy::Parallel { threads: 0 } => {
            out.par_chunks_mut(k).enumerate().try_for_each(fill)?;
        }
        ExecPolicy::Parallel { threads } => {
            let pool = thread_pool(threads)?;
            pool.install(|| out.par_chunks_mut(k).enumerate().try_for_each(fill))?;
        }
    }

    NdArray::new(out_shape, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::exponential::ExponentialSampler;
    use crate::distribution::gamma::GammaSampler;
    use crate::distribution::normal::NormalSampler;
    use crate::distribution::poisson::PoissonSampler;
    use crate::distribution::uniform::UniformSampler;

    #[test]
    fn test_uniform_one_sample_per_element() {
        let low = NdArray::from_vec(vec![0.0f32, 2.5]);
        let high = NdArray::from_vec(vec![1.0f32, 3.7]);
        let engine = EngineResource::with_seed(42);

        let out: NdArray<f32> = multi_sample::<UniformSampler<f32>, _, _>(
            &low,
            Some(&high),
            &[],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert_eq!(out.shape(), &[2]);
        assert!((0.0..1.0).contains(&out.data()[0]));
        assert!((2.5..3.7).contains(&out.data()[1]));
    }

    #[test]
    fn test_sample_blocks_are_contiguous() {
        let low = NdArray::from_vec(vec![0.0f64, 100.0, 200.0]);
        let high = NdArray::from_vec(vec![1.0f64, 101.0, 201.0]);
        let engine = EngineResource::with_seed(1);

        let out: NdArray<f64> = multi_sample::<UniformSampler<f64>, _, _>(
            &low,
            Some(&high),
            &[2, 2],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert_eq!(out.shape(), &[3, 2, 2]);
        for (i, block) in out.data().chunks(4).enumerate() {
            let lo = i as f64 * 100.0;
            assert!(block.iter().all(|v| (lo..lo + 1.0).contains(v)));
        }
    }

    #[test]
    fn test_exponential_scenario() {
        let lam = NdArray::from_vec(vec![1.0f32, 8.5]);
        let engine = EngineResource::with_seed(7);

        let out: NdArray<f32> = multi_sample::<ExponentialSampler<f32>, _, _>(
            &lam,
            None,
            &[2],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert_eq!(out.shape(), &[2, 2]);
        assert!(out.data().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_broadcast_scalar_against_vector() {
        // mu broadcasts across four sigmas
        let mu = NdArray::scalar(10.0f64);
        let sigma = NdArray::from_vec(vec![0.0f64, 0.0, 0.0, 0.0]);
        let engine = EngineResource::with_seed(3);

        let out: NdArray<f64> = multi_sample::<NormalSampler<f64>, _, _>(
            &mu,
            Some(&sigma),
            &[],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert_eq!(out.shape(), &[4]);
        assert!(out.data().iter().all(|&v| v == 10.0));
    }

    #[test]
    fn test_broadcast_row_and_column() {
        let low = NdArray::new(vec![2, 1], vec![0.0f64, 10.0]).unwrap();
        let high = NdArray::new(vec![1, 3], vec![11.0f64, 12.0, 13.0]).unwrap();
        let engine = EngineResource::with_seed(3);

        let out: NdArray<f64> = multi_sample::<UniformSampler<f64>, _, _>(
            &low,
            Some(&high),
            &[],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert_eq!(out.shape(), &[2, 3]);
        let d = out.data();
        assert!((0.0..11.0).contains(&d[0]));
        assert!((0.0..12.0).contains(&d[1]));
        assert!((0.0..13.0).contains(&d[2]));
        assert!((10.0..11.0).contains(&d[3]));
        assert!((10.0..13.0).contains(&d[5]));
    }

    #[test]
    fn test_invalid_parameter_reports_element_index() {
        let low = NdArray::new(vec![2, 1], vec![0.0f64, 10.0]).unwrap();
        let high = NdArray::new(vec![1, 3], vec![1.0f64, 2.0, 3.0]).unwrap();
        let engine = EngineResource::with_seed(3);

        // low 10 exceeds every high on the second row; element 3 fails first
        let err = multi_sample::<UniformSampler<f64>, _, f64>(
            &low,
            Some(&high),
            &[],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::InvalidParameter { index: 3, .. }));
    }

    #[test]
    fn test_mismatched_shapes_fail_before_sampling() {
        let low = NdArray::from_vec(vec![0.0f32; 3]);
        let high = NdArray::from_vec(vec![1.0f32; 2]);
        let engine = EngineResource::with_seed(3);

        let err = multi_sample::<UniformSampler<f32>, _, f32>(
            &low,
            Some(&high),
            &[],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap_err();

        assert!(err.is_shape_error());
        // No seeds were consumed
        assert_eq!(engine.lock().unwrap().draws(), 0);
    }

    #[test]
    fn test_zero_sample_dimension_fails() {
        let lam = NdArray::from_vec(vec![1.0f32]);
        let engine = EngineResource::with_seed(3);
        let err = multi_sample::<PoissonSampler<f32>, _, f32>(
            &lam,
            None,
            &[0],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::InvalidSampleShape { .. }));
    }

    #[test]
    fn test_determinism_for_fixed_seed() {
        let alpha = NdArray::from_vec(vec![0.5f64, 1.0, 2.5, 9.0]);
        let beta = NdArray::from_vec(vec![1.0f64, 0.7, 0.7, 2.0]);

        let run = || {
            let engine = EngineResource::with_seed(2024);
            multi_sample::<GammaSampler<f64>, _, f64>(
                &alpha,
                Some(&beta),
                &[8],
                &engine,
                ExecPolicy::Sequential,
            )
            .unwrap()
        };

        let a = run();
        let b = run();
        let bits = |x: &NdArray<f64>| x.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let lam: Vec<f64> = (1..=64).map(|i| i as f64 * 0.5).collect();
        let lam = NdArray::from_vec(lam);

        let seq_engine = EngineResource::with_seed(99);
        let seq: NdArray<f64> = multi_sample::<PoissonSampler<f64>, _, _>(
            &lam,
            None,
            &[16],
            &seq_engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        for policy in [ExecPolicy::Parallel { threads: 4 }, ExecPolicy::Parallel { threads: 0 }] {
            let par_engine = EngineResource::with_seed(99);
            let par: NdArray<f64> =
                multi_sample::<PoissonSampler<f64>, _, _>(&lam, None, &[16], &par_engine, policy)
                    .unwrap();
            assert_eq!(seq, par, "{} output differs from sequential", policy);
        }
    }

    #[test]
    fn test_shared_engine_advances_between_calls() {
        let lam = NdArray::from_vec(vec![3.0f64; 4]);
        let engine = EngineResource::with_seed(5);

        let first: NdArray<f64> = multi_sample::<ExponentialSampler<f64>, _, _>(
            &lam,
            None,
            &[4],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();
        let second: NdArray<f64> = multi_sample::<ExponentialSampler<f64>, _, _>(
            &lam,
            None,
            &[4],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert_ne!(first, second);
        assert_eq!(engine.lock().unwrap().draws(), 8);
    }

    #[test]
    fn test_integral_parameters_continuous_output() {
        let low = NdArray::from_vec(vec![0i32, 10]);
        let high = NdArray::from_vec(vec![5i32, 20]);
        let engine = EngineResource::with_seed(11);

        let out: NdArray<i32> = multi_sample::<UniformSampler<i32>, _, _>(
            &low,
            Some(&high),
            &[50],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();

        assert!(out.data()[..50].iter().all(|v| (0..5).contains(v)));
        assert!(out.data()[50..].iter().all(|v| (10..20).contains(v)));
    }

    #[test]
    fn test_empty_parameter_array() {
        let lam = NdArray::<f32>::new(vec![0], vec![]).unwrap();
        let engine = EngineResource::with_seed(1);
        let out: NdArray<f32> = multi_sample::<PoissonSampler<f32>, _, _>(
            &lam,
            None,
            &[3],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();
        assert_eq!(out.shape(), &[0, 3]);
        assert_eq!(out.elem_count(), 0);
    }

    #[test]
    fn test_one_parameter_distribution_without_second_input() {
        let lam = NdArray::new(vec![2, 2], vec![1.0f64, 2.0, 3.0, 4.0]).unwrap();
        let engine = EngineResource::with_seed(3);
        let out: NdArray<f64> = multi_sample::<PoissonSampler<f64>, _, _>(
            &lam,
            None,
            &[5],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap();
        assert_eq!(out.shape(), &[2, 2, 5]);
        assert!(out.data().iter().all(|v| *v >= 0.0 && v.fract() == 0.0));
        assert_eq!(engine.lock().unwrap().draws(), 4);
    }

    #[test]
    fn test_output_size_overflow_fails_before_sampling() {
        let lam = NdArray::from_vec(vec![1.0f32, 2.0, 3.0]);
        let engine = EngineResource::with_seed(1);
        let err = multi_sample::<ExponentialSampler<f32>, _, f32>(
            &lam,
            None,
            &[usize::MAX / 2],
            &engine,
            ExecPolicy::Sequential,
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::InvalidSampleShape { .. }));
        assert_eq!(engine.lock().unwrap().draws(), 0);
    }

    #[test]
    fn test_thread_pool_is_reused() {
        let a = thread_pool(3).unwrap();
        let b = thread_pool(3).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.current_num_threads(), 3);
    }

    #[test]
    fn test_policy_from_threads() {
        assert_eq!(ExecPolicy::from_threads(1), ExecPolicy::Sequential);
        assert_eq!(ExecPolicy::from_threads(0), ExecPolicy::Parallel { threads: 0 });
        assert_eq!(ExecPolicy::from_threads(8), ExecPolicy::Parallel { threads: 8 });
    }
}
