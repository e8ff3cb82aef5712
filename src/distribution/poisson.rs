//! Poisson distribution sampler
//!
//! One parameter, the rate `lam`; the second parameter slot is ignored.
//! Draws are integral counts in `T::Count` (the element type itself for
//! integral outputs, `i32` for float outputs) before coercion to `T`.
//!
//! A zero rate is the point mass at zero.

use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::Element;
use rand::Rng;
use rand_distr::{Distribution as _, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Build a Poisson distribution, or None for a zero rate
pub(crate) fn poisson(
    distribution: Distribution,
    rate: f64,
) -> crate::Result<Option<Poisson<f64>>> {
    if rate == 0.0 {
        return Ok(None);
    }
    if !rate.is_finite() {
        return Err(invalid(distribution, format!("rate must be finite, got {}", rate)));
    }
    Poisson::new(rate)
        .map(Some)
        .map_err(|e| invalid(distribution, e.to_string()))
}

/// One Poisson count for a rate produced on the fly
///
/// Rates from a gamma mixing step can underflow to zero; those count as zero.
#[inline]
pub(crate) fn poisson_count<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    if !(rate > 0.0) {
        return 0.0;
    }
    match Poisson::new(rate) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}

/// Coerce a count through the working integral type
#[inline]
pub(crate) fn coerce_count<T: Element>(count: f64) -> T {
    T::from_count(<T::Count as Element>::from_f64(count))
}

/// Poisson sampler with rate `lam`
pub struct PoissonSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    dist: Option<Poisson<f64>>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Element> Sampler<T> for PoissonSampler<T> {
    fn new(lambda: f64, _unused: f64, seed: u32) -> crate::Result<Self> {
        Ok(Self {
            rng: sampler_rng(seed),
            dist: poisson(Distribution::Poisson, lambda)?,
            _marker: std::marker::PhantomData,
        })
    }

    #[inline]
    fn draw(&mut self) -> T {
        let count: f64 = match &self.dist {
            Some(dist) => dist.sample(&mut self.rng),
            None => 0.0,
        };
        coerce_count(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poisson_sampler_integral_values_in_float_output() {
        let mut sampler = PoissonSampler::<f32>::new(8.5, 0.0, 1).unwrap();
        for _ in 0..1000 {
            let v: f32 = sampler.draw();
            assert!(v >= 0.0);
            assert_eq!(v.fract(), 0.0, "Poisson sample {} is not integral", v);
        }
    }

    #[test]
    fn test_poisson_sampler_mean_and_variance() {
        let mut sampler = PoissonSampler::<f64>::new(4.0, 0.0, 42).unwrap();
        let n = 20000;
        let samples: Vec<f64> = (0..n).map(|_| sampler.draw()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        assert!((mean - 4.0).abs() < 0.1, "mean {} too far from 4", mean);
        assert!((var - 4.0).abs() < 0.3, "variance {} too far from 4", var);
    }

    #[test]
    fn test_poisson_sampler_integral_output() {
        let mut sampler = PoissonSampler::<i64>::new(3.0, 0.0, 5).unwrap();
        for _ in 0..100 {
            let v: i64 = sampler.draw();
            assert!(v >= 0);
        }
    }

    #[test]
    fn test_poisson_sampler_zero_rate() {
        let mut sampler = PoissonSampler::<f64>::new(0.0, 0.0, 5).unwrap();
        for _ in 0..5 {
            let v: f64 = sampler.draw();
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_poisson_sampler_rejects_bad_rate() {
        assert!(PoissonSampler::<f64>::new(-2.0, 0.0, 1).is_err());
        assert!(PoissonSampler::<f64>::new(f64::INFINITY, 0.0, 1).is_err());
    }

    #[test]
    fn test_poisson_count_non_positive_rate() {
        let mut rng = sampler_rng(1);
        assert_eq!(poisson_count(&mut rng, 0.0), 0.0);
        assert_eq!(poisson_count(&mut rng, -1.0), 0.0);
        assert_eq!(poisson_count(&mut rng, f64::NAN), 0.0);
    }
}
