//! Contiguous n-dimensional arrays
//!
//! `NdArray<T>` is the typed buffer the kernels read parameters from and
//! write samples into. `DynArray` tags it with its `DType` so the operator
//! surface can dispatch on element types chosen at runtime.

use crate::dtype::{DType, Element};
use crate::error::{Result, SampleError};
use serde::Serialize;

/// Number of elements described by a shape (1 for a scalar shape)
pub fn elem_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Owned, row-major, contiguous array
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Element> NdArray<T> {
    /// Create an array, checking that `data` fills `shape` exactly
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected = elem_count(&shape);
        if expected != data.len() {
            return Err(SampleError::shape_mismatch(&shape, &[data.len()]));
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array over `data`
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Zero-dimensional array holding one value
    pub fn scalar(value: T) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            data: vec![T::default(); elem_count(shape)],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn elem_count(&self) -> usize {
        self.data.len()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Values widened to f64, in storage order
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.data.iter().map(|v| v.to_f64()).collect()
    }

    /// Same data viewed under a new shape with the same element count
    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Self::new(shape, self.data)
    }
}

/// Dtype-tagged array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DynArray {
    Float32(NdArray<f32>),
    Float64(NdArray<f64>),
    Int32(NdArray<i32>),
    Int64(NdArray<i64>),
    Uint8(NdArray<u8>),
}

/// Run `$body` with `$arr` bound to the typed array inside a `DynArray`
///
/// The element type is available as the type alias `$T` inside the body.
#[macro_export]
macro_rules! with_dyn_array {
    ($value:expr, $arr:ident, $T:ident => $body:expr) => {
        match $value {
            $crate::array::DynArray::Float32($arr) => {
                #[allow(dead_code)]
                type $T = f32;
                $body
            }
            $crate::array::DynArray::Float64($arr) => {
                #[allow(dead_code)]
                type $T = f64;
                $body
            }
            $crate::array::DynArray::Int32($arr) => {
                #[allow(dead_code)]
                type $T = i32;
                $body
            }
            $crate::array::DynArray::Int64($arr) => {
                #[allow(dead_code)]
                type $T = i64;
                $body
            }
            $crate::array::DynArray::Uint8($arr) => {
                #[allow(dead_code)]
                type $T = u8;
                $body
            }
        }
    };
}

/// Run `$body` with the type alias `$T` bound to the Rust type of a `DType`
#[macro_export]
macro_rules! with_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::dtype::DType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::Float64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::Uint8 => {
                type $T = u8;
                $body
            }
        }
    };
}

impl DynArray {
    /// Build an array of `dtype` from f64 values
    pub fn from_f64(dtype: DType, shape: Vec<usize>, values: &[f64]) -> Result<Self> {
        with_dtype!(dtype, T => {
            let data: Vec<T> = values.iter().map(|&v| <T as Element>::from_f64(v)).collect();
            Ok(NdArray::<T>::new(shape, data)?.into())
        })
    }

    /// Zero-filled array of `dtype`
    pub fn zeros(dtype: DType, shape: &[usize]) -> Self {
        with_dtype!(dtype, T => NdArray::<T>::zeros(shape).into())
    }

    /// Zero-filled array with the same dtype and shape
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.dtype(), self.shape())
    }

    pub fn dtype(&self) -> DType {
        with_dyn_array!(self, a, T => a.dtype())
    }

    pub fn shape(&self) -> &[usize] {
        with_dyn_array!(self, a, T => a.shape())
    }

    pub fn elem_count(&self) -> usize {
        with_dyn_array!(self, a, T => a.elem_count())
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_dyn_array!(self, a, T => a.to_f64_vec())
    }

    pub fn as_f32(&self) -> Option<&NdArray<f32>> {
        match self {
            DynArray::Float32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&NdArray<f64>> {
        match self {
            DynArray::Float64(a) => Some(a),
            _ => None,
        }
    }
}

macro_rules! impl_from_ndarray {
    ($t:ty, $variant:ident) => {
        impl From<NdArray<$t>> for DynArray {
            fn from(a: NdArray<$t>) -> Self {
                DynArray::$variant(a)
            }
        }
    };
}

impl_from_ndarray!(f32, Float32);
impl_from_ndarray!(f64, Float64);
impl_from_ndarray!(i32, Int32);
impl_from_ndarray!(i64, Int64);
impl_from_ndarray!(u8, Uint8);

/// Typed view into a `DynArray`
pub trait FromDynArray: Element {
    fn from_dyn(array: &DynArray) -> Option<&NdArray<Self>>;
}

macro_rules! impl_from_dyn {
    ($t:ty, $variant:ident) => {
        impl FromDynArray for $t {
            fn from_dyn(array: &DynArray) -> Option<&NdArray<$t>> {
                match array {
                    DynArray::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_from_dyn!(f32, Float32);
impl_from_dyn!(f64, Float64);
impl_from_dyn!(i32, Int32);
impl_from_dyn!(i64, Int64);
impl_from_dyn!(u8, Uint8);
