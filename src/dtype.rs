//! Element types and the working-type policy
//!
//! Every element type carries two associated working types:
//!
//! - **`Real`**: the floating precision continuous distributions sample in.
//!   `f32` samples in `f32`; every other type samples through `f64`.
//! - **`Count`**: the integral type count distributions (Poisson and the
//!   negative binomials) produce before coercion. Integral elements count in
//!   themselves, float elements count in `i32`.
//!
//! The coercion chain for one draw is therefore `E -> W -> E`, resolved at
//! compile time through the `Element` impls below.

use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use rand_distr::{Distribution, Exp, Gamma, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float32,
    Float64,
    Int32,
    Int64,
    Uint8,
}

impl DType {
    /// All supported types, floats first
    pub const ALL: [DType; 5] = [
        DType::Float32,
        DType::Float64,
        DType::Int32,
        DType::Int64,
        DType::Uint8,
    ];

    pub fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    pub fn is_integral(self) -> bool {
        !self.is_float()
    }

    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::Float32 | DType::Int32 => 4,
            DType::Float64 | DType::Int64 => 8,
            DType::Uint8 => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Uint8 => "uint8",
        }
    }
}

impl Default for DType {
    fn default() -> Self {
        Self::Float32
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "float32" | "f32" => Ok(DType::Float32),
            "float64" | "f64" => Ok(DType::Float64),
            "int32" | "i32" => Ok(DType::Int32),
            "int64" | "i64" => Ok(DType::Int64),
            "uint8" | "u8" => Ok(DType::Uint8),
            _ => Err(format!("unknown dtype '{}'", s)),
        }
    }
}

/// Floating working precision for continuous distributions
///
/// Builds the `rand_distr` distributions in `Self` precision. The associated
/// distribution types keep the `Distribution<Self>` bounds attached to the
/// trait so generic samplers never have to restate them.
pub trait Real: Float + SampleUniform + Send + Sync + fmt::Debug + 'static {
    type Normal: Distribution<Self> + Send;
    type Gamma: Distribution<Self> + Send;
    type Exp: Distribution<Self> + Send;

    fn from_f64(v: f64) -> Self;

    fn widen(self) -> f64;

    fn normal(mean: Self, std_dev: Self) -> Result<Self::Normal, String>;

    fn gamma(shape: Self, scale: Self) -> Result<Self::Gamma, String>;

    fn exp(lambda: Self) -> Result<Self::Exp, String>;
}

macro_rules! impl_real {
    ($t:ty) => {
        impl Real for $t {
            type Normal = Normal<$t>;
            type Gamma = Gamma<$t>;
            type Exp = Exp<$t>;

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn widen(self) -> f64 {
                self as f64
            }

            fn normal(mean: Self, std_dev: Self) -> Result<Self::Normal, String> {
                Normal::new(mean, std_dev).map_err(|e| e.to_string())
            }

            fn gamma(shape: Self, scale: Self) -> Result<Self::Gamma, String> {
                Gamma::new(shape, scale).map_err(|e| e.to_string())
            }

            fn exp(lambda: Self) -> Result<Self::Exp, String> {
                Exp::new(lambda).map_err(|e| e.to_string())
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);

/// Array element type
///
/// Implemented for every `DType`. Conversions from the working types
/// saturate at the element's range; integral elements truncate continuous
/// samples toward zero, except interval draws which round down.
pub trait Element: Copy + Send + Sync + PartialOrd + Default + fmt::Debug + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Working precision for continuous distributions
    type Real: Real;

    /// Working integral type for count distributions
    type Count: Element;

    /// Convert to f64 (used to read distribution parameters)
    fn to_f64(self) -> f64;

    /// Convert from f64
    fn from_f64(v: f64) -> Self;

    /// Coerce a continuous draw into this element type
    fn from_real(v: Self::Real) -> Self;

    /// Coerce a draw from a half-open interval, rounding toward negative
    /// infinity so integral results stay below the upper bound
    #[inline]
    fn from_real_floor(v: Self::Real) -> Self {
        Self::from_real(v)
    }

    /// Coerce a count draw into this element type
    #[inline]
    fn from_count(v: Self::Count) -> Self {
        Self::from_f64(v.to_f64())
    }
}

macro_rules! impl_float_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            type Real = $t;
            type Count = i32;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn from_real(v: $t) -> Self {
                v
            }
        }
    };
}

macro_rules! impl_int_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            type Real = f64;
            type Count = $t;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn from_real(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn from_real_floor(v: f64) -> Self {
                v.floor() as $t
            }

            #[inline]
            fn from_count(v: $t) -> Self {
                v
            }
        }
    };
}

impl_float_element!(f32, DType::Float32);
impl_float_element!(f64, DType::Float64);
impl_int_element!(i32, DType::Int32);
impl_int_element!(i64, DType::Int64);
impl_int_element!(u8, DType::Uint8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_names_round_trip() {
        for dtype in DType::ALL {
            assert_eq!(dtype.name().parse::<DType>().unwrap(), dtype);
        }
        assert_eq!("F64".parse::<DType>().unwrap(), DType::Float64);
        assert!("float16".parse::<DType>().is_err());
    }

    #[test]
    fn test_dtype_classification() {
        assert!(DType::Float32.is_float());
        assert!(DType::Float64.is_float());
        assert!(DType::Int32.is_integral());
        assert!(DType::Uint8.is_integral());
        assert_eq!(DType::Float64.size_in_bytes(), 8);
        assert_eq!(DType::Uint8.size_in_bytes(), 1);
    }

    #[test]
    fn test_element_dtype_constants() {
        assert_eq!(<f32 as Element>::DTYPE, DType::Float32);
        assert_eq!(<f64 as Element>::DTYPE, DType::Float64);
        assert_eq!(<i32 as Element>::DTYPE, DType::Int32);
        assert_eq!(<i64 as Element>::DTYPE, DType::Int64);
        assert_eq!(<u8 as Element>::DTYPE, DType::Uint8);
    }

    #[test]
    fn test_integral_from_real_truncates() {
        assert_eq!(<i32 as Element>::from_real(2.9), 2);
        assert_eq!(<i32 as Element>::from_real(-1.5), -1);
        assert_eq!(<i64 as Element>::from_real(-0.25), 0);
        // Saturating casts
        assert_eq!(<u8 as Element>::from_real(300.0), 255);
        assert_eq!(<u8 as Element>::from_real(-3.0), 0);
    }

    #[test]
    fn test_integral_from_real_floor() {
        assert_eq!(<i32 as Element>::from_real_floor(2.9), 2);
        assert_eq!(<i32 as Element>::from_real_floor(-1.5), -2);
        assert_eq!(<i64 as Element>::from_real_floor(-0.25), -1);
        assert_eq!(<f32 as Element>::from_real_floor(-0.25), -0.25);
        // Saturating casts
        assert_eq!(<u8 as Element>::from_real(300.0), 255);
        assert_eq!(<u8 as Element>::from_real(-3.0), 0);
    }

    #[test]
    fn test_count_coercion() {
        assert_eq!(<f32 as Element>::from_count(13), 13.0f32);
        assert_eq!(<f64 as Element>::from_count(0), 0.0f64);
        assert_eq!(<i64 as Element>::from_count(42i64), 42i64);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DType::Float64).unwrap();
        assert_eq!(json, "\"float64\"");
        let dtype: DType = serde_json::from_str("\"uint8\"").unwrap();
        assert_eq!(dtype, DType::Uint8);
    }
}
