//! Gamma distribution sampler
//!
//! Parameters are the shape `alpha` and the scale `beta`, both expected to
//! be positive. `alpha == 0` is the degenerate distribution at zero and is
//! sampled as such.
//!
//! # Performance
//!
//! `rand_distr` uses Marsaglia and Tsang's method for `alpha >= 1` and a
//! power transform for `alpha < 1`; both are O(1) expected per sample.

use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::{Element, Real};
use rand_distr::Distribution as _;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Gamma sampler with shape `alpha` and scale `beta`
pub struct GammaSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    /// None for the point mass at zero (`alpha == 0`)
    dist: Option<<T::Real as Real>::Gamma>,
}

impl<T: Element> Sampler<T> for GammaSampler<T> {
    fn new(alpha: f64, beta: f64, seed: u32) -> crate::Result<Self> {
        let dist = if alpha == 0.0 {
            None
        } else {
            let gamma = <T::Real as Real>::gamma(
                <T::Real as Real>::from_f64(alpha),
                <T::Real as Real>::from_f64(beta),
            )
            .map_err(|e| invalid(Distribution::Gamma, e))?;
            Some(gamma)
        };

        Ok(Self {
            rng: sampler_rng(seed),
            dist,
        })
    }

    #[inline]
    fn draw(&mut self) -> T {
        match &self.dist {
            Some(dist) => T::from_real(dist.sample(&mut self.rng)),
            None => T::from_f64(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_sampler_positive() {
        let mut sampler = GammaSampler::<f32>::new(2.5, 0.7, 1).unwrap();
        for _ in 0..1000 {
            let v: f32 = sampler.draw();
            assert!(v > 0.0);
        }
    }

    #[test]
    fn test_gamma_sampler_mean() {
        // Mean of Gamma(alpha, beta) is alpha * beta
        let mut sampler = GammaSampler::<f64>::new(2.5, 0.7, 42).unwrap();
        let n = 20000;
        let mean = (0..n).map(|_| sampler.draw()).sum::<f64>() / n as f64;
        assert!((mean - 1.75).abs() < 0.05, "mean {} too far from 1.75", mean);
    }

    #[test]
    fn test_gamma_sampler_small_shape() {
        let mut sampler = GammaSampler::<f64>::new(0.3, 2.0, 5).unwrap();
        let n = 20000;
        let mean = (0..n).map(|_| sampler.draw()).sum::<f64>() / n as f64;
        assert!((mean - 0.6).abs() < 0.05, "mean {} too far from 0.6", mean);
    }

    #[test]
    fn test_gamma_sampler_zero_shape_is_point_mass() {
        let mut sampler = GammaSampler::<f64>::new(0.0, 1.0, 9).unwrap();
        for _ in 0..5 {
            let v: f64 = sampler.draw();
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_gamma_sampler_rejects_negative_parameters() {
        assert!(GammaSampler::<f64>::new(-1.0, 1.0, 1).is_err());
        assert!(GammaSampler::<f64>::new(1.0, -1.0, 1).is_err());
    }
}
