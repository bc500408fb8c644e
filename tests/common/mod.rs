// Copyright (C) 2025 Bellande Artificial Intelligence Computer Vision Research Innovation Center, Ronaldson Bellande

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

#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bellande_unaligned_image_dataset::utilities::config::DatasetOptions;
use image::{Rgb, RgbImage};

pub fn pattern(width: u32, height: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x as u8).wrapping_mul(7).wrapping_add(seed),
            (y as u8).wrapping_mul(3),
            seed,
        ])
    })
}

pub fn write_image(path: &Path, img: &RgbImage) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    Ok(())
}

/// Writes `count` patterned PNGs named `img_000.png`.. into `root/dir`.
pub fn populate(
    root: &Path,
    dir: &str,
    count: usize,
    width: u32,
    height: u32,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut paths = Vec::with_capacity(count);
    for i in 0..count {
        let path = root.join(dir).join(format!("img_{:03}.png", i));
        write_image(&path, &pattern(width, height, i as u8))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Options sized for tiny fixture images: resize to 32, crop 24, no flips,
/// serial batches, one thread.
pub fn small_options(root: &Path) -> DatasetOptions {
    DatasetOptions {
        dataroot: root.to_path_buf(),
        phase: "train".to_string(),
        ratio: 0.5,
        load_size: 32,
        crop_size: 24,
        no_flip: true,
        serial_batches: true,
        num_threads: 1,
        ..DatasetOptions::default()
    }
}

/// A training tree with `count` images in each of trainA..trainD.
pub fn training_tree(root: &Path, count: usize) -> Result<(), Box<dyn Error>> {
    populate(root, "trainA", count, 40, 30)?;
    populate(root, "trainB", count, 36, 36)?;
    populate(root, "trainC", count, 48, 40)?;
    populate(root, "trainD", count, 48, 40)?;
    Ok(())
}
