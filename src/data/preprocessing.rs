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

use crate::core::{error::BellandeError, tensor::Tensor};
use image::{DynamicImage, GenericImageView};

pub trait Preprocessor: Send + Sync {
    fn process(&self, tensor: &Tensor) -> Result<Tensor, BellandeError>;
}

/// Converts an image into a `[C, H, W]` tensor with values in `[0, 1]`.
///
/// Luma images produce one channel, everything else is read as RGB.
pub fn to_tensor(img: &DynamicImage) -> Tensor {
    let (width, height) = img.dimensions();
    let (width, height) = (width as usize, height as usize);

    match img {
        DynamicImage::ImageLuma8(gray) => {
            let data = gray.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
            Tensor::new(data, vec![1, height, width])
        }
        _ => {
            let rgb = img.to_rgb8();
            let hw = height * width;
            let mut data = vec![0.0; 3 * hw];

            // Convert HWC to CHW
            for (idx, pixel) in rgb.pixels().enumerate() {
                data[idx] = f32::from(pixel[0]) / 255.0;
                data[hw + idx] = f32::from(pixel[1]) / 255.0;
                data[2 * hw + idx] = f32::from(pixel[2]) / 255.0;
            }
            Tensor::new(data, vec![3, height, width])
        }
    }
}

pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalize {
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Self {
        assert_eq!(mean.len(), std.len());
        Normalize { mean, std }
    }

    /// Mean 0.5 and std 0.5 on every channel, mapping `[0, 1]` onto `[-1, 1]`.
    pub fn symmetric(channels: usize) -> Self {
        Normalize::new(vec![0.5; channels], vec![0.5; channels])
    }
}

impl Preprocessor for Normalize {
    fn process(&self, tensor: &Tensor) -> Result<Tensor, BellandeError> {
        if tensor.shape.len() != 3 {
            return Err(BellandeError::InvalidShape(format!(
                "Normalize expects a [C, H, W] tensor, got {:?}",
                tensor.shape
            )));
        }

        let channels = tensor.shape[0];
        if channels != self.mean.len() {
            return Err(BellandeError::ShapeMismatch(format!(
                "Normalize configured for {} channels, tensor has {}",
                self.mean.len(),
                channels
            )));
        }

        let plane = tensor.shape[1] * tensor.shape[2];
        let mut normalized = tensor.data.clone();
        for (c, values) in normalized.chunks_mut(plane.max(1)).enumerate().take(channels) {
            for value in values.iter_mut() {
                *value = (*value - self.mean[c]) / self.std[c];
            }
        }

        Ok(Tensor::new(normalized, tensor.shape.clone()))
    }
}
