//! Negative binomial distribution sampler
//!
//! Counts the failures before the `k`-th success in Bernoulli trials with
//! success probability `p`; the mean is `k (1 - p) / p`. Realized as a
//! Poisson draw whose rate is Gamma(`k`, `(1 - p) / p`)-distributed.
//!
//! `p == 1` never fails and always yields zero.

use super::poisson::{coerce_count, poisson_count};
use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::Element;
use rand_distr::{Distribution as _, Gamma};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Negative binomial sampler with failure limit `k` and probability `p`
pub struct NegativeBinomialSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    /// Mixing distribution for the Poisson rate; None when `p == 1`
    rate: Option<Gamma<f64>>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Element> Sampler<T> for NegativeBinomialSampler<T> {
    fn new(k: f64, p: f64, seed: u32) -> crate::Result<Self> {
        if !(p > 0.0 && p <= 1.0) {
            return Err(invalid(
                Distribution::NegativeBinomial,
                format!("p must be in (0, 1], got {}", p),
            ));
        }

        let rate = if p == 1.0 {
            None
        } else {
            let gamma = Gamma::new(k, (1.0 - p) / p)
                .map_err(|e| invalid(Distribution::NegativeBinomial, e.to_string()))?;
            Some(gamma)
        };

        Ok(Self {
            rng: sampler_rng(seed),
            rate,
            _marker: std::marker::PhantomData,
        })
    }

    #[inline]
    fn draw(&mut self) -> T {
        let count: f64 = match &self.rate {
            Some(gamma) => {
                let rate = gamma.sample(&mut self.rng);
                poisson_count(&mut self.rng, rate)
            }
            None => 0.0,
        };
        coerce_count(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_binomial_mean() {
        // k = 20, p = 0.4: mean = 20 * 0.6 / 0.4 = 30
        let mut sampler = NegativeBinomialSampler::<f64>::new(20.0, 0.4, 42).unwrap();
        let n = 20000;
        let samples: Vec<f64> = (0..n).map(|_| sampler.draw()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        // Variance = k (1 - p) / p^2 = 75
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        assert!((mean - 30.0).abs() < 0.5, "mean {} too far from 30", mean);
        assert!((var - 75.0).abs() < 6.0, "variance {} too far from 75", var);
    }

    #[test]
    fn test_negative_binomial_float_output_is_integral() {
        let mut sampler = NegativeBinomialSampler::<f32>::new(49.0, 0.77, 7).unwrap();
        for _ in 0..500 {
            let v: f32 = sampler.draw();
            assert!(v >= 0.0);
            assert_eq!(v.fract(), 0.0);
        }
    }

    #[test]
    fn test_negative_binomial_certain_success() {
        let mut sampler = NegativeBinomialSampler::<f64>::new(5.0, 1.0, 7).unwrap();
        for _ in 0..5 {
            let v: f64 = sampler.draw();
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_negative_binomial_rejects_bad_parameters() {
        assert!(NegativeBinomialSampler::<f64>::new(5.0, 0.0, 1).is_err());
        assert!(NegativeBinomialSampler::<f64>::new(5.0, 1.5, 1).is_err());
        assert!(NegativeBinomialSampler::<f64>::new(-5.0, 0.5, 1).is_err());
    }
}
