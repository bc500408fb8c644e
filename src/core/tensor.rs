// Copyright (C) 2024 Bellande Artificial Intelligence Computer Vision Research Innovation Center, Ronaldson Bellande

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::core::error::BellandeError;

/// Dense row-major `f32` tensor. Images are stored as `[C, H, W]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Self {
        let size: usize = shape.iter().product();
        assert_eq!(data.len(), size, "Data size does not match shape");

        Tensor { data, shape }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        let size = shape.iter().product();
        Tensor::new(vec![0.0; size], shape.to_vec())
    }

    // Data access methods
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    // Calculate stride for the current shape
    pub fn stride(&self) -> Vec<usize> {
        let mut stride = Vec::with_capacity(self.shape.len());
        let mut current_stride = 1;
        for &dim in self.shape.iter().rev() {
            stride.push(current_stride);
            current_stride *= dim;
        }
        stride.reverse();
        stride
    }

    /// Value at a multi-dimensional index, `None` when any coordinate is out of range.
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &dim), stride) in index.iter().zip(&self.shape).zip(self.stride()) {
            if i >= dim {
                return None;
            }
            offset += i * stride;
        }
        self.data.get(offset).copied()
    }

    /// Stacks equally shaped tensors along a new leading batch dimension.
    pub fn stack(tensors: &[Tensor]) -> Result<Tensor, BellandeError> {
        if tensors.is_empty() {
            return Err(BellandeError::InvalidInputs(
                "Cannot stack an empty tensor list".to_string(),
            ));
        }

        let base_shape = tensors[0].shape();

        // Verify all tensors have the same shape
        for (i, tensor) in tensors.iter().enumerate().skip(1) {
            if tensor.shape() != base_shape {
                return Err(BellandeError::ShapeMismatch(format!(
                    "tensor 0 has shape {:?} but tensor {} has shape {:?}",
                    base_shape,
                    i,
                    tensor.shape()
                )));
            }
        }

        let mut new_shape = vec![tensors.len()];
        new_shape.extend(base_shape);

        let mut result_data = Vec::with_capacity(new_shape.iter().product());
        for tensor in tensors {
            result_data.extend_from_slice(&tensor.data);
        }

        Ok(Tensor::new(result_data, new_shape))
    }
}
