//! multisample - Concurrent sampling from many parameterized distributions
//!
//! Given arrays of distribution parameters, the sampling operators draw a
//! configurable number of samples from the distribution at every element
//! position and return them in a single array of shape
//! `parameter_shape ++ sample_shape`.
//!
//! # Architecture
//!
//! - **Samplers** (`distribution`): uniform, normal, gamma, exponential,
//!   Poisson, negative binomial, generalized negative binomial
//! - **Shape/type inference** (`shape`): broadcasting and output types
//! - **Kernel** (`kernel`): per-element seeding and the element loop,
//!   sequential or on a rayon pool
//! - **Operators** (`op`): the `sample_*` operator surface and registry
//! - **Engines** (`engine`): one seeded random engine per execution context
//!
//! # Example
//!
//! ```
//! use multisample::{DynArray, EngineResource, ExecPolicy, MultiSampleOp, NdArray, OpRegistry};
//! use multisample::op::MultiSampleParam;
//!
//! let registry = OpRegistry::new();
//! let op = registry
//!     .create("sample_poisson", MultiSampleParam::with_shape(vec![3]))
//!     .unwrap();
//!
//! let lam: DynArray = NdArray::from_vec(vec![1.0f32, 8.5]).into();
//! let engine = EngineResource::with_seed(7);
//! let out = op.forward(&[&lam], &engine, ExecPolicy::Sequential).unwrap();
//! assert_eq!(out.shape(), &[2, 3]);
//! ```

pub mod array;
pub mod config;
pub mod distribution;
pub mod dtype;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod op;
pub mod output;
pub mod shape;

// Re-export commonly used types
pub use array::{DynArray, NdArray};
pub use config::SamplingConfig;
pub use distribution::{Distribution, Sampler};
pub use dtype::{DType, Element};
pub use engine::{EngineResource, ExecContext, ResourceManager};
pub use error::{Result, SampleError};
pub use kernel::{multi_sample, ExecPolicy};
pub use op::{MultiSampleOp, OpRegistry};
