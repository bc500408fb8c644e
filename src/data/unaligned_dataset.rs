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

use crate::core::{error::BellandeError, random, tensor::Tensor};
use crate::data::augmentation::{get_transform, TransformPipeline};
use crate::data::dataloader::Collate;
use crate::data::dataset::Dataset;
use crate::data::image_decoder::{load_rgb, ImageSize};
use crate::data::image_folder::{make_dataset, split_by_ratio};
use crate::data::image_transformation_augmentation::{
    pad_to_multiple, CropWindow, PADDING_BASE,
};
use crate::data::preprocessing::to_tensor;
use crate::utilities::config::{DatasetOptions, Domain};
use image::{DynamicImage, GenericImageView};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

const PADDING_MARKER: &str = "padding";

pub const TRAIN_KEYS: [&str; 9] = [
    "A", "B", "C", "D", "A_paths", "B_paths", "C_paths", "D_paths", "sizeA",
];
pub const TEST_KEYS: [&str; 3] = ["A", "A_paths", "sizeA"];

/// One training item: an unpaired A/B draw plus the aligned C/D crops.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    pub a: Tensor,
    pub b: Tensor,
    pub c: Tensor,
    pub d: Tensor,
    pub a_path: PathBuf,
    pub b_path: PathBuf,
    pub c_path: PathBuf,
    pub d_path: PathBuf,
    pub size_a: ImageSize,
}

#[derive(Debug, Clone)]
pub struct TestSample {
    pub a: Tensor,
    pub a_path: PathBuf,
    pub size_a: ImageSize,
}

#[derive(Debug, Clone)]
pub enum UnalignedSample {
    Train(TrainingSample),
    Test(TestSample),
}

impl UnalignedSample {
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            UnalignedSample::Train(_) => &TRAIN_KEYS,
            UnalignedSample::Test(_) => &TEST_KEYS,
        }
    }

    pub fn a(&self) -> &Tensor {
        match self {
            UnalignedSample::Train(sample) => &sample.a,
            UnalignedSample::Test(sample) => &sample.a,
        }
    }

    pub fn a_path(&self) -> &Path {
        match self {
            UnalignedSample::Train(sample) => &sample.a_path,
            UnalignedSample::Test(sample) => &sample.a_path,
        }
    }

    pub fn size_a(&self) -> ImageSize {
        match self {
            UnalignedSample::Train(sample) => sample.size_a,
            UnalignedSample::Test(sample) => sample.size_a,
        }
    }

    pub fn as_train(&self) -> Option<&TrainingSample> {
        match self {
            UnalignedSample::Train(sample) => Some(sample),
            UnalignedSample::Test(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingBatch {
    pub a: Tensor,
    pub b: Tensor,
    pub c: Tensor,
    pub d: Tensor,
    pub a_paths: Vec<PathBuf>,
    pub b_paths: Vec<PathBuf>,
    pub c_paths: Vec<PathBuf>,
    pub d_paths: Vec<PathBuf>,
    pub sizes_a: Vec<ImageSize>,
}

#[derive(Debug, Clone)]
pub struct TestBatch {
    pub a: Tensor,
    pub a_paths: Vec<PathBuf>,
    pub sizes_a: Vec<ImageSize>,
}

/// Samples stacked into `[N, C, H, W]` tensors, paths and sizes kept in order.
#[derive(Debug, Clone)]
pub enum UnalignedBatch {
    Train(TrainingBatch),
    Test(TestBatch),
}

impl UnalignedBatch {
    pub fn len(&self) -> usize {
        match self {
            UnalignedBatch::Train(batch) => batch.a_paths.len(),
            UnalignedBatch::Test(batch) => batch.a_paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Collate for UnalignedSample {
    type Batch = UnalignedBatch;

    fn collate(items: Vec<Self>) -> Result<UnalignedBatch, BellandeError> {
        let is_train = match items.first() {
            Some(first) => first.as_train().is_some(),
            None => {
                return Err(BellandeError::InvalidInputs(
                    "Empty batch provided".to_string(),
                ))
            }
        };

        if is_train {
            let samples = items
                .into_iter()
                .map(|item| match item {
                    UnalignedSample::Train(sample) => Ok(sample),
                    UnalignedSample::Test(_) => Err(BellandeError::InvalidInputs(
                        "Cannot mix training and test samples in one batch".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(UnalignedBatch::Train(TrainingBatch {
                a: stack_field(&samples, |s| &s.a)?,
                b: stack_field(&samples, |s| &s.b)?,
                c: stack_field(&samples, |s| &s.c)?,
                d: stack_field(&samples, |s| &s.d)?,
                a_paths: samples.iter().map(|s| s.a_path.clone()).collect(),
                b_paths: samples.iter().map(|s| s.b_path.clone()).collect(),
                c_paths: samples.iter().map(|s| s.c_path.clone()).collect(),
                d_paths: samples.iter().map(|s| s.d_path.clone()).collect(),
                sizes_a: samples.iter().map(|s| s.size_a).collect(),
            }))
        } else {
            let samples = items
                .into_iter()
                .map(|item| match item {
                    UnalignedSample::Test(sample) => Ok(sample),
                    UnalignedSample::Train(_) => Err(BellandeError::InvalidInputs(
                        "Cannot mix training and test samples in one batch".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;

            let a: Vec<Tensor> = samples.iter().map(|s| s.a.clone()).collect();
            Ok(UnalignedBatch::Test(TestBatch {
                a: Tensor::stack(&a)?,
                a_paths: samples.iter().map(|s| s.a_path.clone()).collect(),
                sizes_a: samples.iter().map(|s| s.size_a).collect(),
            }))
        }
    }
}

fn stack_field(
    samples: &[TrainingSample],
    select: impl Fn(&TrainingSample) -> &Tensor,
) -> Result<Tensor, BellandeError> {
    let tensors: Vec<Tensor> = samples.iter().map(|s| select(s).clone()).collect();
    Tensor::stack(&tensors)
}

/// Crops `c` and `d` with one shared random `height x width` window drawn
/// against the dimensions of `c`.
pub fn synchronized_crop(
    c: &DynamicImage,
    d: &DynamicImage,
    height: u32,
    width: u32,
) -> Result<(CropWindow, DynamicImage, DynamicImage), BellandeError> {
    let (cw, ch) = c.dimensions();
    let window = CropWindow::random(cw, ch, height, width)?;
    let c_crop = window.apply(c)?;
    let d_crop = window.apply(d)?;
    Ok((window, c_crop, d_crop))
}

/// Dataset over two unpaired domains (A blur, B sharp) with an auxiliary paired
/// set (C known blur, D known sharp) indexed in lockstep with B.
///
/// Expects `{dataroot}/{phase}A` .. `{phase}D` unless a directory override is set.
pub struct UnalignedDataset {
    options: DatasetOptions,
    is_train: bool,
    b_to_a: bool,
    a_paths: Vec<PathBuf>,
    b_paths: Vec<PathBuf>,
    c_paths: Vec<PathBuf>,
    d_paths: Vec<PathBuf>,
    transform_a: TransformPipeline,
    transform_b: Option<TransformPipeline>,
}

impl UnalignedDataset {
    pub fn new(options: DatasetOptions) -> Result<Self, BellandeError> {
        options
            .validate()
            .map_err(BellandeError::InvalidConfiguration)?;

        let is_train = options.is_train();
        let b_to_a = options.is_b_to_a();
        let ratio = options.effective_ratio();

        let discover =
            |domain: Domain| make_dataset(&options.domain_dir(domain), options.max_dataset_size);
        let a_all = discover(Domain::A)?;
        let b_all = discover(Domain::B)?;
        let c_paths = discover(Domain::C)?;
        let d_paths = discover(Domain::D)?;

        // Outside training only A is sampled, and the ratio is 1.0
        let (a_paths, b_paths) = if is_train {
            split_by_ratio(a_all, b_all, ratio)
        } else {
            split_by_ratio(a_all, Vec::new(), ratio)
        };

        let (input_nc, output_nc) = options.channels();
        let ((input_preprocess, input_domain), (output_preprocess, output_domain)) = if b_to_a {
            (
                (&options.preprocess_b, Domain::B),
                (&options.preprocess_a, Domain::A),
            )
        } else {
            (
                (&options.preprocess_a, Domain::A),
                (&options.preprocess_b, Domain::B),
            )
        };
        let transform_a = get_transform(&options, input_preprocess, input_domain, input_nc == 1)?;
        let transform_b = if is_train {
            Some(get_transform(
                &options,
                output_preprocess,
                output_domain,
                output_nc == 1,
            )?)
        } else {
            None
        };

        info!(
            "Unaligned dataset [{}]: A={} B={} C={} D={} (ratio {})",
            options.phase,
            a_paths.len(),
            b_paths.len(),
            c_paths.len(),
            d_paths.len(),
            ratio
        );

        if is_train && (c_paths.len() < b_paths.len() || d_paths.len() < b_paths.len()) {
            warn!(
                "Paired domains are shorter than B (B={}, C={}, D={}); some B indices have no pair",
                b_paths.len(),
                c_paths.len(),
                d_paths.len()
            );
        }

        Ok(UnalignedDataset {
            options,
            is_train,
            b_to_a,
            a_paths,
            b_paths,
            c_paths,
            d_paths,
            transform_a,
            transform_b,
        })
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    pub fn is_train(&self) -> bool {
        self.is_train
    }

    pub fn paths(&self, domain: Domain) -> &[PathBuf] {
        match domain {
            Domain::A => &self.a_paths,
            Domain::B => &self.b_paths,
            Domain::C => &self.c_paths,
            Domain::D => &self.d_paths,
        }
    }

    pub fn domain_size(&self, domain: Domain) -> usize {
        self.paths(domain).len()
    }

    /// Index shared by B, C and D: `index mod |B|` with serial batches, a
    /// uniform draw over B otherwise.
    pub fn resolve_paired_index(&self, index: usize) -> Result<usize, BellandeError> {
        let b_size = self.b_paths.len();
        if b_size == 0 {
            return Err(BellandeError::EmptyDomain(Domain::B.to_string()));
        }

        if self.options.serial_batches {
            Ok(index % b_size)
        } else {
            Ok(random::index_inclusive(b_size - 1))
        }
    }

    fn pads(&self, preprocess: &str) -> bool {
        preprocess.contains(PADDING_MARKER)
    }

    fn training_sample(
        &self,
        index: usize,
        a: Tensor,
        a_path: PathBuf,
        size_a: ImageSize,
        transform_b: &TransformPipeline,
    ) -> Result<TrainingSample, BellandeError> {
        let index_b = self.resolve_paired_index(index)?;
        let b_path = self.b_paths[index_b].clone();
        let c_path = self
            .c_paths
            .get(index_b)
            .ok_or(BellandeError::IndexOutOfBounds)?
            .clone();
        let d_path = self
            .d_paths
            .get(index_b)
            .ok_or(BellandeError::IndexOutOfBounds)?
            .clone();

        let mut b_img = load_rgb(&b_path)?;
        let c_img = load_rgb(&c_path)?;
        let d_img = load_rgb(&d_path)?;

        if self.b_to_a && self.pads(&self.options.preprocess_b) {
            b_img = pad_to_multiple(&b_img, PADDING_BASE);
        }

        let b = transform_b.apply(b_img)?;

        let (crop_h, crop_w) = (a.shape()[1] as u32, a.shape()[2] as u32);
        let (window, c_crop, d_crop) = synchronized_crop(&c_img, &d_img, crop_h, crop_w)?;

        debug!(
            "Sample {}: A={} B/C/D index {} crop {:?}",
            index,
            a_path.display(),
            index_b,
            window
        );

        Ok(TrainingSample {
            a,
            b,
            c: to_tensor(&c_crop),
            d: to_tensor(&d_crop),
            a_path,
            b_path,
            c_path,
            d_path,
            size_a,
        })
    }
}

impl Dataset for UnalignedDataset {
    type Item = UnalignedSample;

    fn len(&self) -> usize {
        if self.is_train {
            self.a_paths.len().max(self.b_paths.len())
        } else {
            self.a_paths.len()
        }
    }

    fn get(&self, index: usize) -> Result<UnalignedSample, BellandeError> {
        if self.a_paths.is_empty() {
            return Err(BellandeError::EmptyDomain(Domain::A.to_string()));
        }

        let a_path = self.a_paths[index % self.a_paths.len()].clone();
        let mut a_img = load_rgb(&a_path)?;
        let size_a = ImageSize::of(&a_img);

        if self.is_train && !self.b_to_a && self.pads(&self.options.preprocess_a) {
            a_img = pad_to_multiple(&a_img, PADDING_BASE);
        }

        let a = self.transform_a.apply(a_img)?;

        match &self.transform_b {
            Some(transform_b) => Ok(UnalignedSample::Train(
                self.training_sample(index, a, a_path, size_a, transform_b)?,
            )),
            None => Ok(UnalignedSample::Test(TestSample { a, a_path, size_a })),
        }
    }
}
