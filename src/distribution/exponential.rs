//! Exponential distribution sampler
//!
//! One parameter, the rate `lam`; the second parameter slot is ignored.

use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::{Element, Real};
use rand_distr::Distribution as _;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Exponential sampler with rate `lam`
pub struct ExponentialSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    dist: <T::Real as Real>::Exp,
}

impl<T: Element> Sampler<T> for ExponentialSampler<T> {
    fn new(lambda: f64, _unused: f64, seed: u32) -> crate::Result<Self> {
        let dist = <T::Real as Real>::exp(<T::Real as Real>::from_f64(lambda))
            .map_err(|e| invalid(Distribution::Exponential, e))?;

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
