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
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Translation direction between the unpaired domains.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AtoB,
    BtoA,
}

/// The four image domains: A (blur), B (sharp), C (known blur), D (known sharp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    A,
    B,
    C,
    D,
}

impl Domain {
    pub fn letter(&self) -> &'static str {
        match self {
            Domain::A => "A",
            Domain::B => "B",
            Domain::C => "C",
            Domain::D => "D",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetOptions {
    // Data location
    pub dataroot: PathBuf,
    pub phase: String,
    pub blur_dir: Option<PathBuf>,
    pub sharp_dir: Option<PathBuf>,
    pub known_blur_dir: Option<PathBuf>,
    pub known_sharp_dir: Option<PathBuf>,

    // Split
    pub ratio: f64,
    pub max_dataset_size: Option<usize>,

    // Translation setup
    pub direction: Direction,
    pub input_nc: usize,
    pub output_nc: usize,

    // Preprocessing
    pub preprocess_a: String,
    pub preprocess_b: String,
    pub load_size: u32,
    pub crop_size: u32,
    pub no_flip: bool,

    // Loading
    pub serial_batches: bool,
    pub batch_size: usize,
    pub num_threads: usize,
    pub seed: Option<u64>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        DatasetOptions {
            dataroot: PathBuf::from("datasets"),
            phase: "train".to_string(),
            blur_dir: None,
            sharp_dir: None,
            known_blur_dir: None,
            known_sharp_dir: None,
            ratio: 0.5,
            max_dataset_size: None,
            direction: Direction::AtoB,
            input_nc: 3,
            output_nc: 3,
            preprocess_a: "resize_and_crop".to_string(),
            preprocess_b: "resize_and_crop".to_string(),
            load_size: 286,
            crop_size: 256,
            no_flip: false,
            serial_batches: false,
            batch_size: 1,
            num_threads: num_cpus::get(),
            seed: None,
        }
    }
}

impl DatasetOptions {
    /// Loads options from a `.yaml`/`.yml` or `.json` file and validates them.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BellandeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let options: DatasetOptions = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        options
            .validate()
            .map_err(BellandeError::InvalidConfiguration)?;

        Ok(options)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BellandeError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.phase.trim().is_empty() {
            return Err("Phase cannot be empty".to_string());
        }

        if !(0.0..=1.0).contains(&self.ratio) {
            return Err("Ratio must be between 0 and 1".to_string());
        }

        for (name, nc) in [("input_nc", self.input_nc), ("output_nc", self.output_nc)] {
            if nc != 1 && nc != 3 {
                return Err(format!("{} must be 1 or 3, got {}", name, nc));
            }
        }

        if self.load_size == 0 || self.crop_size == 0 {
            return Err("Load size and crop size must be greater than 0".to_string());
        }

        for preprocess in [&self.preprocess_a, &self.preprocess_b] {
            if preprocess.contains("resize")
                && preprocess.contains("crop")
                && self.crop_size > self.load_size
            {
                return Err(format!(
                    "Crop size {} exceeds load size {} for preprocess '{}'",
                    self.crop_size, self.load_size, preprocess
                ));
            }
        }

        if self.batch_size == 0 {
            return Err("Batch size must be greater than 0".to_string());
        }

        if self.num_threads == 0 {
            return Err("Number of threads must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn is_train(&self) -> bool {
        self.phase == "train"
    }

    /// Split ratio in effect: the configured one while training, 1.0 otherwise.
    pub fn effective_ratio(&self) -> f64 {
        if self.is_train() {
            self.ratio
        } else {
            1.0
        }
    }

    pub fn is_b_to_a(&self) -> bool {
        self.direction == Direction::BtoA
    }

    /// Directory of a domain: the explicit override or `{dataroot}/{phase}{letter}`.
    pub fn domain_dir(&self, domain: Domain) -> PathBuf {
        let override_dir = match domain {
            Domain::A => &self.blur_dir,
            Domain::B => &self.sharp_dir,
            Domain::C => &self.known_blur_dir,
            Domain::D => &self.known_sharp_dir,
        };

        match override_dir {
            Some(dir) => dir.clone(),
            None => self
                .dataroot
                .join(format!("{}{}", self.phase, domain.letter())),
        }
    }

    /// Channel counts of the translation input and output, swapped under `BtoA`.
    pub fn channels(&self) -> (usize, usize) {
        if self.is_b_to_a() {
            (self.output_nc, self.input_nc)
        } else {
            (self.input_nc, self.output_nc)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
