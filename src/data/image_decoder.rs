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
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Pixel dimensions of an image before any transform, as `(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn of(img: &DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        ImageSize { width, height }
    }
}

/// Decodes an image file and normalizes it to 8-bit, three channel RGB.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<DynamicImage, BellandeError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(err) => BellandeError::IOError(format!(
            "Failed to open image file {}: {}",
            path.display(),
            err
        )),
        other => BellandeError::ImageError(format!(
            "Failed to decode {}: {}",
            path.display(),
            other
        )),
    })?;

    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}
