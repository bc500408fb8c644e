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
use crate::data::image_transformation_augmentation::{
    Grayscale, ImageTransform, MakePower2, RandomCrop, RandomHorizontalFlip, Resize, ScaleWidth,
};
use crate::data::preprocessing::{to_tensor, Normalize, Preprocessor};
use crate::utilities::config::{DatasetOptions, Domain};
use image::DynamicImage;
use log::debug;

pub struct Compose {
    transforms: Vec<Box<dyn ImageTransform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn ImageTransform>>) -> Self {
        Compose { transforms }
    }

    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

impl ImageTransform for Compose {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage, BellandeError> {
        let mut current = img;
        for transform in &self.transforms {
            current = transform.apply(current)?;
        }
        Ok(current)
    }

    fn name(&self) -> &str {
        "Compose"
    }
}

/// Image-to-tensor transform of one domain, built once and shared by every sample.
pub struct TransformPipeline {
    compose: Compose,
    normalize: Option<Normalize>,
}

impl TransformPipeline {
    pub fn new(compose: Compose, normalize: Option<Normalize>) -> Self {
        TransformPipeline { compose, normalize }
    }

    pub fn apply(&self, img: DynamicImage) -> Result<Tensor, BellandeError> {
        let img = self.compose.apply(img)?;
        let tensor = to_tensor(&img);
        match &self.normalize {
            Some(normalize) => normalize.process(&tensor),
            None => Ok(tensor),
        }
    }

    pub fn steps(&self) -> Vec<&str> {
        let mut steps = self.compose.names();
        steps.push("ToTensor");
        if self.normalize.is_some() {
            steps.push("Normalize");
        }
        steps
    }
}

/// Builds the pipeline for `domain` from a preprocess mode string such as
/// `resize_and_crop`, `scale_width_and_crop`, `crop` or `none`.
pub fn get_transform(
    options: &DatasetOptions,
    preprocess: &str,
    domain: Domain,
    grayscale: bool,
) -> Result<TransformPipeline, BellandeError> {
    let mut transforms: Vec<Box<dyn ImageTransform>> = Vec::new();

    if grayscale {
        transforms.push(Box::new(Grayscale));
    }

    if preprocess.contains("resize") {
        transforms.push(Box::new(Resize::new(options.load_size, options.load_size)));
    } else if preprocess.contains("scale_width") {
        transforms.push(Box::new(ScaleWidth::new(
            options.load_size,
            options.crop_size,
        )));
    }

    if preprocess.contains("crop") {
        transforms.push(Box::new(RandomCrop::new(
            options.crop_size,
            options.crop_size,
        )));
    }

    if preprocess == "none" {
        transforms.push(Box::new(MakePower2::new(4)));
    }

    if !options.no_flip {
        transforms.push(Box::new(RandomHorizontalFlip::new(0.5)?));
    }

    let channels = if grayscale { 1 } else { 3 };
    let pipeline = TransformPipeline::new(
        Compose::new(transforms),
        Some(Normalize::symmetric(channels)),
    );

    debug!(
        "Transform for domain {} ({}): {:?}",
        domain,
        preprocess,
        pipeline.steps()
    );

    Ok(pipeline)
}
