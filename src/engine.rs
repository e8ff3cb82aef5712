//! Random engine resource
//!
//! Each execution context owns one pseudo-random engine, seeded once and
//! shared by every sampling call issued against that context. Kernels never
//! draw samples from the engine directly: they take one 32-bit seed per
//! parameter element and hand it to a freshly constructed sampler.
//!
//! # Concurrency
//!
//! The engine is not safe for unsynchronized mutation. `EngineResource`
//! wraps it in `Arc<Mutex<_>>`; a kernel locks it once, draws every seed it
//! needs in element order, and releases it before the element loop starts.
//! The element loop can then run on any number of threads without touching
//! the engine again.
//!
//! # Algorithm
//!
//! Engines are xoshiro256++ seeded through `seed_from_u64`. Sequences are
//! reproducible for a fixed seed within this crate only; no compatibility
//! with other generators is implied.

use crate::error::{Result, SampleError};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Pseudo-random bit generator backing one execution context
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: Xoshiro256PlusPlus,
    seed: Option<u64>,
    draws: u64,
}

impl RandomEngine {
    /// Create an engine seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
            seed: None,
            draws: 0,
        }
    }

    /// Create an engine with a specific seed
    ///
    /// Useful for reproducible runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            seed: Some(seed),
            draws: 0,
        }
    }

    /// Restart the stream from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        self.seed = Some(seed);
        self.draws = 0;
    }

    /// Seed the engine was last seeded with (None for entropy)
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of seeds drawn since the last (re)seed
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draw one sampler seed
    #[inline]
    pub fn next_seed(&mut self) -> u32 {
        self.draws += 1;
        self.rng.gen()
    }

    /// Draw `n` sampler seeds in order
    pub fn seeds(&mut self, n: usize) -> Vec<u32> {
        (0..n).map(|_| self.next_seed()).collect()
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of device an execution context runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Cpu,
    Accelerator,
}

/// Identity of an execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecContext {
    pub device: DeviceKind,
    pub id: u32,
}

impl ExecContext {
    pub fn cpu(id: u32) -> Self {
        Self {
            device: DeviceKind::Cpu,
            id,
        }
    }

    /// Stable value mixed into the base seed for this context
    fn seed_salt(&self) -> u64 {
        let device = match self.device {
            DeviceKind::Cpu => 0u64,
            DeviceKind::Accelerator => 1u64,
        };
        (device << 32) | self.id as u64
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::cpu(0)
    }
}

impl fmt::Display for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.device {
            DeviceKind::Cpu => write!(f, "cpu({})", self.id),
            DeviceKind::Accelerator => write!(f, "accel({})", self.id),
        }
    }
}

/// Shared handle to one context's engine
///
/// Clones refer to the same engine.
#[derive(Debug, Clone)]
pub struct EngineResource {
    context: ExecContext,
    engine: Arc<Mutex<RandomEngine>>,
}

impl EngineResource {
    /// Wrap a standalone engine (not registered with any manager)
    pub fn new(context: ExecContext, engine: RandomEngine) -> Self {
        Self {
            context,
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Standalone seeded resource on the default context
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ExecContext::default(), RandomEngine::with_seed(seed))
    }

    pub fn context(&self) -> ExecContext {
        self.context
    }

    /// Exclusive access to the engine
    pub fn lock(&self) -> Result<MutexGuard<'_, RandomEngine>> {
        self.engine.lock().map_err(|_| SampleError::EngineUnavailable)
    }

    /// Draw `n` seeds under a single lock acquisition
    pub fn draw_seeds(&self, n: usize) -> Result<Vec<u32>> {
        let mut engine = self.lock()?;
        Ok(engine.seeds(n))
    }

    /// Whether two handles share the same engine
    pub fn same_engine(&self, other: &EngineResource) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }
}

/// Owns one engine per execution context
///
/// Engines are created on first request. With a base seed, the engine for a
/// context is seeded from the base seed mixed with the context identity, so
/// each context gets an independent but reproducible stream.
#[derive(Debug, Default)]
pub struct ResourceManager {
    base_seed: Mutex<Option<u64>>,
    engines: Mutex<HashMap<ExecContext, EngineResource>>,
}

impl ResourceManager {
    /// Manager whose engines are seeded from entropy
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager whose engines derive from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            base_seed: Mutex::new(Some(seed)),
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Get (or create) the engine resource for `ctx`
    pub fn request(&self, ctx: ExecContext) -> Result<EngineResource> {
        let base = *self.base_seed.lock().map_err(|_| SampleError::EngineUnavailable)?;
        let mut engines = self.engines.lock().map_err(|_| SampleError::EngineUnavailable)?;
        let resource = engines.entry(ctx).or_insert_with(|| {
            let engine = match base {
                Some(seed) => RandomEngine::with_seed(context_seed(seed, ctx)),
                None => RandomEngine::new(),
            };
            tracing::debug!("Created random engine for {} (seeded: {})", ctx, base.is_some());
            EngineResource::new(ctx, engine)
        });
        Ok(resource.clone())
    }

    /// Reseed every existing engine and future engines from `seed`
    pub fn seed(&self, seed: u64) -> Result<()> {
        *self.base_seed.lock().map_err(|_| SampleError::EngineUnavailable)? = Some(seed);
        let engines = self.engines.lock().map_err(|_| SampleError::EngineUnavailable)?;
        for (ctx, resource) in engines.iter() {
            resource.lock()?.reseed(context_seed(seed, *ctx));
        }
        tracing::info!("Reseeded {} random engine(s) from base seed {}", engines.len(), seed);
        Ok(())
    }

    /// Number of contexts with a live engine
    pub fn len(&self) -> usize {
        self.engines.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-context seed: splitmix64 finalizer over base seed and context salt
fn context_seed(base: u64, ctx: ExecContext) -> u64 {
    let mut z = base ^ ctx.seed_salt().wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
