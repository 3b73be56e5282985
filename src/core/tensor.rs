//! Tensor descriptors handed to the inference front end.
//!
//! A [`TensorView`] describes the batch tensor (shape, element type, device,
//! layout) and borrows the preprocessor's working buffer instead of copying
//! it. Its lifetime is bounded by that borrow, so it cannot outlive the
//! storage it aliases.

use crate::processors::ChannelOrder;
use ndarray::{Array4, ArrayView4};

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Element type of a batch tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Raw 8-bit pixel values.
    U8,
    /// Normalized 32-bit floats.
    F32,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size_of(&self) -> usize {
        match self {
            DataType::U8 => std::mem::size_of::<u8>(),
            DataType::F32 => std::mem::size_of::<f32>(),
        }
    }
}

/// Device holding a tensor's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
}

/// Device index reported for host memory.
pub const CPU_DEVICE_ID: i32 = -1;

/// Borrowed element data of a [`TensorView`].
#[derive(Debug, Clone)]
pub enum TensorData<'a> {
    U8(ArrayView4<'a, u8>),
    F32(ArrayView4<'a, f32>),
}

/// Owned counterpart of [`TensorData`].
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedTensor {
    U8(Array4<u8>),
    F32(Tensor4D),
}

impl OwnedTensor {
    /// Returns the tensor shape.
    pub fn shape(&self) -> [usize; 4] {
        match self {
            OwnedTensor::U8(a) => dims(a.dim()),
            OwnedTensor::F32(a) => dims(a.dim()),
        }
    }

    /// Returns the f32 data, if this tensor is normalized.
    pub fn as_f32(&self) -> Option<&Tensor4D> {
        match self {
            OwnedTensor::F32(a) => Some(a),
            OwnedTensor::U8(_) => None,
        }
    }

    /// Returns the raw u8 data, if this tensor is not normalized.
    pub fn as_u8(&self) -> Option<&Array4<u8>> {
        match self {
            OwnedTensor::U8(a) => Some(a),
            OwnedTensor::F32(_) => None,
        }
    }
}

fn dims(d: (usize, usize, usize, usize)) -> [usize; 4] {
    [d.0, d.1, d.2, d.3]
}

/// Non-owning descriptor of a batch tensor.
#[derive(Debug, Clone)]
pub struct TensorView<'a> {
    shape: [usize; 4],
    dtype: DataType,
    device: Device,
    device_id: i32,
    layout: ChannelOrder,
    data: TensorData<'a>,
}

impl<'a> TensorView<'a> {
    /// Creates a host-memory view over `data`.
    pub fn cpu(data: TensorData<'a>, layout: ChannelOrder) -> Self {
        let (shape, dtype) = match &data {
            TensorData::U8(a) => (dims(a.dim()), DataType::U8),
            TensorData::F32(a) => (dims(a.dim()), DataType::F32),
        };
        Self {
            shape,
            dtype,
            device: Device::Cpu,
            device_id: CPU_DEVICE_ID,
            layout,
            data,
        }
    }

    /// Shape as `[batch, C, H, W]` for CHW or `[batch, H, W, C]` for HWC.
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    pub fn layout(&self) -> ChannelOrder {
        self.layout
    }

    /// Row-major element strides, one per axis of [`shape`](Self::shape).
    pub fn strides(&self) -> [usize; 4] {
        let [_, d1, d2, d3] = self.shape;
        [d1 * d2 * d3, d2 * d3, d3, 1]
    }

    /// Number of images in the batch.
    pub fn batch_size(&self) -> usize {
        self.shape[0]
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the aliased buffer in bytes.
    pub fn nbytes(&self) -> usize {
        self.len() * self.dtype.size_of()
    }

    /// Borrowed element data.
    pub fn data(&self) -> &TensorData<'a> {
        &self.data
    }

    /// Returns the f32 view, if the batch was normalized.
    pub fn as_f32(&self) -> Option<ArrayView4<'a, f32>> {
        match &self.data {
            TensorData::F32(a) => Some(a.clone()),
            TensorData::U8(_) => None,
        }
    }

    /// Returns the u8 view, if normalization was disabled.
    pub fn as_u8(&self) -> Option<ArrayView4<'a, u8>> {
        match &self.data {
            TensorData::U8(a) => Some(a.clone()),
            TensorData::F32(_) => None,
        }
    }

    /// Copies the viewed data into an owned tensor.
    pub fn to_owned_tensor(&self) -> OwnedTensor {
        match &self.data {
            TensorData::U8(a) => OwnedTensor::U8(a.to_owned()),
            TensorData::F32(a) => OwnedTensor::F32(a.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_describes_buffer_without_copy() {
        let buffer = Tensor4D::zeros((2, 3, 32, 64));
        let view = TensorView::cpu(TensorData::F32(buffer.view()), ChannelOrder::CHW);

        assert_eq!(view.shape(), [2, 3, 32, 64]);
        assert_eq!(view.dtype(), DataType::F32);
        assert_eq!(view.device(), Device::Cpu);
        assert_eq!(view.device_id(), CPU_DEVICE_ID);
        assert_eq!(view.batch_size(), 2);
        assert_eq!(view.nbytes(), 2 * 3 * 32 * 64 * 4);
        assert_eq!(view.as_f32().unwrap().as_ptr(), buffer.as_ptr());
        assert!(view.as_u8().is_none());
    }

    #[test]
    fn test_strides_are_row_major() {
        let buffer = Tensor4D::zeros((2, 3, 32, 64));
        let view = TensorView::cpu(TensorData::F32(buffer.view()), ChannelOrder::CHW);
        assert_eq!(view.strides(), [6144, 2048, 64, 1]);
        let expected: Vec<isize> = view.strides().iter().map(|&s| s as isize).collect();
        assert_eq!(buffer.strides(), expected.as_slice());

        let buffer = Array4::<u8>::zeros((1, 4, 5, 3));
        let view = TensorView::cpu(TensorData::U8(buffer.view()), ChannelOrder::HWC);
        assert_eq!(view.strides(), [60, 15, 3, 1]);
    }

    #[test]
    fn test_empty_view() {
        let buffer = Array4::<u8>::zeros((0, 0, 0, 3));
        let view = TensorView::cpu(TensorData::U8(buffer.view()), ChannelOrder::HWC);
        assert!(view.is_empty());
        assert_eq!(view.dtype(), DataType::U8);
        assert_eq!(view.to_owned_tensor().shape(), [0, 0, 0, 3]);
    }
}
