//! Normal (Gaussian) distribution sampler
//!
//! Parameters are the mean `mu` and the standard deviation `sigma`. A zero
//! `sigma` is accepted and yields `mu` on every draw.
//!
//! # Performance
//!
//! Uses the ziggurat method from `rand_distr` (O(1) expected per sample).

use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::{Element, Real};
use rand_distr::Distribution as _;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Normal sampler with mean `mu` and standard deviation `sigma`
pub struct NormalSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    dist: <T::Real as Real>::Normal,
}

impl<T: Element> Sampler<T> for NormalSampler<T> {
    fn new(mu: f64, sigma: f64, seed: u32) -> crate::Result<Self> {
        let dist = <T::Real as Real>::normal(
            <T::Real as Real>::from_f64(mu),
            <T::Real as Real>::from_f64(sigma),
        )
        .map_err(|e| invalid(Distribution::Normal, e))?;

        Ok(Self {
            rng: sampler_rng(seed),
            dist,
        })
    }

    #[inline]
    fn draw(&mut self) -> T {
        T::from_real(self.dist.sample(&mut self.rng))
    }
}
