//! Typed tensor container passed across the inference boundary.
//!
//! A [`Tensor`] is a flat, row-major buffer plus a shape vector. Only the two
//! element types the TTS graphs use are supported: `f32` and `i64`. Shape and
//! buffer length are checked once at construction so stages can hand tensors
//! to the backend by reference without re-validating them.

use super::{AdapterError, AdapterResult};
use ndarray::{ArrayViewD, ArrayViewMutD, IxDyn};
use std::fmt;

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    F32,
    I64,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::F32 => write!(f, "f32"),
            ElementType::I64 => write!(f, "i64"),
        }
    }
}

/// Flat tensor storage.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    I64(Vec<i64>),
}

impl TensorData {
    fn len(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::I64(v) => v.len(),
        }
    }
}

/// A shaped, typed tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: TensorData,
}

impl Tensor {
    /// Create an `f32` tensor, checking that `data` fills `shape` exactly.
    pub fn from_f32(shape: impl Into<Vec<usize>>, data: Vec<f32>) -> AdapterResult<Self> {
        Self::new(shape.into(), TensorData::F32(data))
    }

    /// Create an `i64` tensor, checking that `data` fills `shape` exactly.
    pub fn from_i64(shape: impl Into<Vec<usize>>, data: Vec<i64>) -> AdapterResult<Self> {
        Self::new(shape.into(), TensorData::I64(data))
    }

    fn new(shape: Vec<usize>, data: TensorData) -> AdapterResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(AdapterError::ShapeMismatch(format!(
                "shape {:?} needs {} elements, buffer has {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Zero-filled `f32` tensor.
    pub fn zeros_f32(shape: impl Into<Vec<usize>>) -> Self {
        Self::filled_f32(shape, 0.0)
    }

    /// `f32` tensor with every element set to `value`.
    pub fn filled_f32(shape: impl Into<Vec<usize>>, value: f32) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self {
            shape,
            data: TensorData::F32(vec![value; len]),
        }
    }

    /// Zero-filled `i64` tensor.
    pub fn zeros_i64(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self {
            shape,
            data: TensorData::I64(vec![0; len]),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Size of one axis, if the tensor has that many axes.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.shape.get(axis).copied()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self.data {
            TensorData::F32(_) => ElementType::F32,
            TensorData::I64(_) => ElementType::I64,
        }
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn as_f32(&self) -> AdapterResult<&[f32]> {
        match &self.data {
            TensorData::F32(v) => Ok(v),
            TensorData::I64(_) => Err(self.type_error(ElementType::F32)),
        }
    }

    pub fn as_f32_mut(&mut self) -> AdapterResult<&mut [f32]> {
        match &mut self.data {
            TensorData::F32(v) => Ok(v),
            TensorData::I64(_) => Err(AdapterError::InvalidInput(
                "expected f32 tensor, found i64".to_string(),
            )),
        }
    }

    pub fn as_i64(&self) -> AdapterResult<&[i64]> {
        match &self.data {
            TensorData::I64(v) => Ok(v),
            TensorData::F32(_) => Err(self.type_error(ElementType::I64)),
        }
    }

    /// Consume the tensor, returning its `f32` buffer.
    pub fn into_f32(self) -> AdapterResult<Vec<f32>> {
        match self.data {
            TensorData::F32(v) => Ok(v),
            TensorData::I64(_) => Err(AdapterError::InvalidInput(
                "expected f32 tensor, found i64".to_string(),
            )),
        }
    }

    /// Borrow the `f32` buffer as an `ndarray` view with this tensor's shape.
    pub fn view_f32(&self) -> AdapterResult<ArrayViewD<'_, f32>> {
        let data = self.as_f32()?;
        ArrayViewD::from_shape(IxDyn(&self.shape), data)
            .map_err(|e| AdapterError::ShapeMismatch(e.to_string()))
    }

    /// Mutable `ndarray` view over the `f32` buffer.
    pub fn view_f32_mut(&mut self) -> AdapterResult<ArrayViewMutD<'_, f32>> {
        let shape = self.shape.clone();
        let data = self.as_f32_mut()?;
        ArrayViewMutD::from_shape(IxDyn(&shape), data)
            .map_err(|e| AdapterError::ShapeMismatch(e.to_string()))
    }

    /// Check the tensor has exactly `rank` axes.
    pub fn expect_rank(&self, name: &str, rank: usize) -> AdapterResult<()> {
        if self.rank() != rank {
            return Err(AdapterError::ShapeMismatch(format!(
                "'{}' must be rank {}, got shape {:?}",
                name, rank, self.shape
            )));
        }
        Ok(())
    }

    fn type_error(&self, expected: ElementType) -> AdapterError {
        AdapterError::InvalidInput(format!(
            "expected {} tensor, found {}",
            expected,
            self.element_type()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_checks_length() {
        assert!(Tensor::from_f32(vec![2, 3], vec![0.0; 6]).is_ok());
        let err = Tensor::from_f32(vec![2, 3], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, AdapterError::ShapeMismatch(_)));
    }

    #[test]
    fn test_element_type_accessors() {
        let ids = Tensor::from_i64(vec![1, 3], vec![4, 5, 6]).unwrap();
        assert_eq!(ids.element_type(), ElementType::I64);
        assert_eq!(ids.as_i64().unwrap(), &[4, 5, 6]);
        assert!(ids.as_f32().is_err());
    }

    #[test]
    fn test_view_matches_shape() {
        let t = Tensor::from_f32(vec![1, 2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let view = t.view_f32().unwrap();
        assert_eq!(view.shape(), &[1, 2, 2]);
        assert_eq!(view[[0, 1, 0]], 3.0);
    }

    #[test]
    fn test_view_mut_broadcast_multiply() {
        let mut t = Tensor::filled_f32(vec![1, 2, 3], 2.0);
        let mask = Tensor::from_f32(vec![1, 1, 3], vec![1.0, 1.0, 0.0]).unwrap();
        {
            let mut view = t.view_f32_mut().unwrap();
            view *= &mask.view_f32().unwrap();
        }
        assert_eq!(t.as_f32().unwrap(), &[2.0, 2.0, 0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_expect_rank() {
        let t = Tensor::zeros_f32(vec![1, 4]);
        assert!(t.expect_rank("x", 2).is_ok());
        assert!(t.expect_rank("x", 3).is_err());
        assert_eq!(t.dim(1), Some(4));
        assert_eq!(t.dim(2), None);
    }
}
