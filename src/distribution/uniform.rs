//! Uniform distribution sampler
//!
//! Draws from the half-open interval `[low, high)`. Float elements sample in
//! their own precision; integral elements sample in `f64` and round toward
//! negative infinity, so every draw stays below `high`.
//!
//! A zero-width interval (`low == high`) always yields `low`.
//!
//! # Example
//!
//! ```
//! use multisample::distribution::{Sampler, uniform::UniformSampler};
//!
//! let mut sampler = UniformSampler::<f64>::new(2.5, 3.7, 7).unwrap();
//! for _ in 0..10 {
//!     let v: f64 = sampler.draw();
//!     assert!(v >= 2.5 && v < 3.7);
//! }
//! ```

use super::{invalid, sampler_rng, Distribution, Sampler};
use crate::dtype::{Element, Real};
use num_traits::Float;
use rand::distributions::{Distribution as _, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform sampler over `[low, high)`
pub struct UniformSampler<T: Element> {
    rng: Xoshiro256PlusPlus,
    /// None for a zero-width interval
    dist: Option<Uniform<T::Real>>,
    low: T::Real,
}

impl<T: Element> Sampler<T> for UniformSampler<T> {
    fn new(p1: f64, p2: f64, seed: u32) -> crate::Result<Self> {
        let low = <T::Real as Real>::from_f64(p1);
        let high = <T::Real as Real>::from_f64(p2);

        if !(low.is_finite() && high.is_finite() && (high - low).is_finite()) {
            return Err(invalid(
                Distribution::Uniform,
                format!("bounds must be finite, got [{}, {})", p1, p2),
            ));
        }
        if low > high {
            return Err(invalid(
                Distribution::Uniform,
                format!("low ({}) must not exceed high ({})", p1, p2),
            ));
        }

        let dist = if low < high {
            Some(Uniform::new(low, high))
        } else {
            None
        };

        Ok(Self {
            rng: sampler_rng(seed),
            dist,
            low,
        })
    }

    #[inline]
    fn draw(&mut self) -> T {
        let v = match &self.dist {
            Some(dist) => dist.sample(&mut self.rng),
            None => self.low,
        };
        T::from_real_floor(v)
    }
}
