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

use crate::core::{error::BellandeError, random};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage};

/// Bicubic resampling, used by every resizing transform.
pub const BICUBIC: FilterType = FilterType::CatmullRom;

/// Base used when padding the translation input before its transform.
pub const PADDING_BASE: u32 = 256;

pub trait ImageTransform: Send + Sync {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError>;
    fn name(&self) -> &str;
}

/// Reduces an image to a single luma channel.
pub struct Grayscale;

impl ImageTransform for Grayscale {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        Ok(DynamicImage::ImageLuma8(img.to_luma8()))
    }

    fn name(&self) -> &str {
        "Grayscale"
    }
}

pub struct Resize {
    height: u32,
    width: u32,
}

impl Resize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

impl ImageTransform for Resize {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        if img.dimensions() == (self.width, self.height) {
            return Ok(img);
        }
        Ok(img.resize_exact(self.width, self.height, BICUBIC))
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Scales the width to `target_width`, keeping the aspect ratio but never
/// letting the height drop below `min_height`.
pub struct ScaleWidth {
    target_width: u32,
    min_height: u32,
}

impl ScaleWidth {
    pub fn new(target_width: u32, min_height: u32) -> Self {
        Self {
            target_width,
            min_height,
        }
    }
}

impl ImageTransform for ScaleWidth {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        let (ow, oh) = img.dimensions();
        if ow == self.target_width && oh >= self.min_height {
            return Ok(img);
        }
        if ow == 0 {
            return Err(BellandeError::InvalidShape(
                "Cannot scale an image of zero width".into(),
            ));
        }

        let scaled = (u64::from(self.target_width) * u64::from(oh) / u64::from(ow)) as u32;
        let height = scaled.max(self.min_height);
        Ok(img.resize_exact(self.target_width, height, BICUBIC))
    }

    fn name(&self) -> &str {
        "ScaleWidth"
    }
}

/// Top-left corner and extent of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub top: u32,
    pub left: u32,
    pub height: u32,
    pub width: u32,
}

impl CropWindow {
    /// Draws a uniformly placed `height x width` window inside an image of the
    /// given dimensions.
    pub fn random(
        image_width: u32,
        image_height: u32,
        height: u32,
        width: u32,
    ) -> Result<Self, BellandeError> {
        if image_height < height || image_width < width {
            return Err(BellandeError::InvalidOperation(format!(
                "Crop size {}x{} larger than input size {}x{}",
                height, width, image_height, image_width
            )));
        }

        let top = random::index_inclusive((image_height - height) as usize) as u32;
        let left = random::index_inclusive((image_width - width) as usize) as u32;

        Ok(CropWindow {
            top,
            left,
            height,
            width,
        })
    }

    pub fn apply(&self, img: &DynamicImage) -> Result<DynamicImage, BellandeError> {
        let (w, h) = img.dimensions();
        if self.left + self.width > w || self.top + self.height > h {
            return Err(BellandeError::InvalidOperation(format!(
                "Crop window {:?} exceeds image size {}x{}",
                self, h, w
            )));
        }
        Ok(img.crop_imm(self.left, self.top, self.width, self.height))
    }
}

pub struct RandomCrop {
    height: u32,
    width: u32,
}

impl RandomCrop {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

impl ImageTransform for RandomCrop {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        let (w, h) = img.dimensions();
        CropWindow::random(w, h, self.height, self.width)?.apply(&img)
    }

    fn name(&self) -> &str {
        "RandomCrop"
    }
}

/// Resizes each side to the nearest multiple of `base`.
pub struct MakePower2 {
    base: u32,
}

impl MakePower2 {
    pub fn new(base: u32) -> Self {
        Self { base }
    }

    fn nearest(&self, size: u32) -> u32 {
        let steps = (f64::from(size) / f64::from(self.base)).round_ties_even() as u32;
        steps.max(1) * self.base
    }
}

impl ImageTransform for MakePower2 {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        let (ow, oh) = img.dimensions();
        let (w, h) = (self.nearest(ow), self.nearest(oh));
        if (w, h) == (ow, oh) {
            return Ok(img);
        }
        Ok(img.resize_exact(w, h, BICUBIC))
    }

    fn name(&self) -> &str {
        "MakePower2"
    }
}

pub struct RandomHorizontalFlip {
    probability: f32,
}

impl RandomHorizontalFlip {
    pub fn new(probability: f32) -> Result<Self, BellandeError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(BellandeError::InvalidParameter(format!(
                "Flip probability must be between 0 and 1, got {}",
                probability
            )));
        }
        Ok(Self { probability })
    }
}

impl ImageTransform for RandomHorizontalFlip {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        if random::bernoulli(self.probability) {
            Ok(img.fliph())
        } else {
            Ok(img)
        }
    }

    fn name(&self) -> &str {
        "RandomHorizontalFlip"
    }
}

/// Smallest multiple of `base` that is `>= size`.
pub fn next_multiple(size: u32, base: u32) -> u32 {
    if size % base == 0 {
        size
    } else {
        (size / base + 1) * base
    }
}

/// Places `img` at the top-left of a zero-filled canvas whose sides are the
/// next multiples of `base`.
pub fn pad_to_multiple(img: &DynamicImage, base: u32) -> DynamicImage {
    let (ow, oh) = img.dimensions();
    let (w, h) = (next_multiple(ow, base), next_multiple(oh, base));
    if (w, h) == (ow, oh) {
        return img.clone();
    }

    let mut canvas = RgbImage::new(w, h);
    imageops::replace(&mut canvas, &img.to_rgb8(), 0, 0);
    DynamicImage::ImageRgb8(canvas)
}
