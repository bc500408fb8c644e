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
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "ppm", "bmp", "tif", "tiff"];

/// Checks if a file is an image based on its extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Recursively collects the image files under `root`, sorted and capped at `max_size`.
///
/// A missing root yields an empty list.
pub fn make_dataset(root: &Path, max_size: Option<usize>) -> Result<Vec<PathBuf>, BellandeError> {
    if !root.exists() {
        warn!("Image directory {} does not exist", root.display());
        return Ok(Vec::new());
    }

    if !root.is_dir() {
        return Err(BellandeError::IOError(format!(
            "{} is not a valid directory",
            root.display()
        )));
    }

    // Symlinked directories are not descended; symlinked files are kept
    let mut images = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            BellandeError::IOError(format!("Failed to scan {}: {}", root.display(), e))
        })?;
        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if is_file && is_image_file(entry.path()) {
            images.push(entry.into_path());
        }
    }
    images.sort();

    if let Some(max_size) = max_size {
        images.truncate(max_size);
    }

    Ok(images)
}

/// Number of leading paths domain A keeps: `floor(ratio * total)`.
pub fn head_count(total: usize, ratio: f64) -> usize {
    (total as f64 * ratio).floor() as usize
}

/// Number of trailing paths domain B keeps: `floor((1 - ratio) * total)`.
pub fn tail_count(total: usize, ratio: f64) -> usize {
    (total as f64 * (1.0 - ratio)).floor() as usize
}

/// Splits two path lists by `ratio`: the head of `a` and the tail of `b`.
pub fn split_by_ratio(
    mut a: Vec<PathBuf>,
    mut b: Vec<PathBuf>,
    ratio: f64,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    a.truncate(head_count(a.len(), ratio));
    let keep = tail_count(b.len(), ratio);
    let b = b.split_off(b.len() - keep);
    (a, b)
}
