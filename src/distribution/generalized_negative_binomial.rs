//! Generalized negative binomial distribution sampler
//!
//! Parameterized by the mean `mu` and the dispersion `alpha`, with variance
//! `mu + alpha * mu^2`. Realized as a Poisson–Gamma mixture: each draw takes
//! a rate from Gamma(`1 / alpha`, `mu * alpha`) and then one Poisson draw
//! with that rate.
//!
//! `alpha == 0` is the Poisson boundary: no mixing step, every draw is
//! Poisson(`mu`). `mu == 0` is the point mass at zero.

use super::poisson::{coerce_count, poisson, poisson_count};
use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::Element;
use rand_distr::{Distribution as _, Gamma, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;

enum Rate {
    /// Poisson boundary; None for a zero mean
    Fixed(Option<Poisson<f64>>),
    /// Gamma-distributed rate per draw
    Mixed(Gamma<f64>),
}

/// Generalized negative binomial sampler with mean `mu` and dispersion `alpha`
pub struct GeneralizedNegativeBinomialSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    rate: Rate,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Element> Sampler<T> for GeneralizedNegativeBinomialSampler<T> {
    fn new(mu: f64, alpha: f64, seed: u32) -> crate::Result<Self> {
        const DIST: Distribution = Distribution::GeneralizedNegativeBinomial;

        if !(mu >= 0.0) {
            return Err(invalid(DIST, format!("mu must be non-negative, got {}", mu)));
        }
        if !(alpha >= 0.0) {
            return Err(invalid(DIST, format!("alpha must be non-negative, got {}", alpha)));
        }

        let rate = if alpha == 0.0 || mu == 0.0 {
            Rate::Fixed(poisson(DIST, mu)?)
        } else {
            let gamma =
                Gamma::new(1.0 / alpha, mu * alpha).map_err(|e| invalid(DIST, e.to_string()))?;
            Rate::Mixed(gamma)
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
            Rate::Fixed(Some(dist)) => dist.sample(&mut self.rng),
            Rate::Fixed(None) => 0.0,
            Rate::Mixed(gamma) => {
                let rate = gamma.sample(&mut self.rng);
                poisson_count(&mut self.rng, rate)
            }
        };
        coerce_count(count)
    }
}
