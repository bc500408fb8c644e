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

mod common;

use std::collections::HashSet;
use std::error::Error;

use bellande_unaligned_image_dataset::{
    core::{error::BellandeError, random},
    data::{
        dataset::Dataset,
        image_decoder::ImageSize,
        unaligned_dataset::{UnalignedDataset, UnalignedSample, TEST_KEYS, TRAIN_KEYS},
    },
    utilities::config::{Direction, Domain},
};
use common::{pattern, populate, small_options, training_tree, write_image};
use image::{Rgb, RgbImage};

#[test]
fn test_ratio_split_sizes() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    let a = populate(temp.path(), "trainA", 10, 8, 8)?;
    let b = populate(temp.path(), "trainB", 10, 8, 8)?;

    let mut options = small_options(temp.path());
    options.ratio = 0.7;
    let dataset = UnalignedDataset::new(options)?;

    assert_eq!(dataset.domain_size(Domain::A), 7);
    assert_eq!(dataset.domain_size(Domain::B), 3);
    assert_eq!(dataset.len(), 7);

    // A keeps the head, B keeps the tail
    assert_eq!(dataset.paths(Domain::A), &a[..7]);
    assert_eq!(dataset.paths(Domain::B), &b[7..]);
    Ok(())
}

#[test]
fn test_length_is_max_of_domains_while_training() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 4, 8, 8)?;
    populate(temp.path(), "trainB", 10, 8, 8)?;

    let mut options = small_options(temp.path());
    options.ratio = 0.5;
    let dataset = UnalignedDataset::new(options)?;

    assert_eq!(dataset.domain_size(Domain::A), 2);
    assert_eq!(dataset.domain_size(Domain::B), 5);
    assert_eq!(dataset.len(), 5);
    Ok(())
}

#[test]
fn test_test_phase_ignores_ratio() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "testA", 5, 40, 30)?;
    populate(temp.path(), "testB", 5, 40, 30)?;

    let mut options = small_options(temp.path());
    options.phase = "test".to_string();
    options.ratio = 0.2;
    let dataset = UnalignedDataset::new(options)?;

    assert!(!dataset.is_train());
    assert_eq!(dataset.domain_size(Domain::A), 5);
    assert_eq!(dataset.len(), 5);

    let sample = dataset.get(3)?;
    assert!(matches!(sample, UnalignedSample::Test(_)));
    assert_eq!(sample.keys(), &TEST_KEYS[..]);
    assert_eq!(sample.a().shape(), &[3, 24, 24]);
    assert_eq!(
        sample.size_a(),
        ImageSize {
            width: 40,
            height: 30
        }
    );
    Ok(())
}

#[test]
fn test_training_sample_contents() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    training_tree(temp.path(), 4)?;
    let dataset = UnalignedDataset::new(small_options(temp.path()))?;

    let sample = dataset.get(1)?;
    assert_eq!(sample.keys(), &TRAIN_KEYS[..]);

    let train = sample.as_train().ok_or("expected a training sample")?;
    assert_eq!(train.a.shape(), &[3, 24, 24]);
    assert_eq!(train.b.shape(), &[3, 24, 24]);
    assert_eq!(train.c.shape(), &[3, 24, 24]);
    assert_eq!(train.d.shape(), &[3, 24, 24]);
    assert_eq!(
        train.size_a,
        ImageSize {
            width: 40,
            height: 30
        }
    );

    // Domain transforms normalize to [-1, 1]; the paired crops stay in [0, 1]
    assert!(train.a.data().iter().all(|v| (-1.0..=1.0).contains(v)));
    assert!(train.a.data().iter().any(|v| *v < 0.0));
    assert!(train.c.data().iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(train.d.data().iter().all(|v| (0.0..=1.0).contains(v)));
    Ok(())
}

#[test]
fn test_domain_a_index_wraps() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 4, 40, 30)?;
    populate(temp.path(), "trainB", 12, 36, 36)?;
    populate(temp.path(), "trainC", 12, 48, 40)?;
    populate(temp.path(), "trainD", 12, 48, 40)?;

    let dataset = UnalignedDataset::new(small_options(temp.path()))?;
    let size_a = dataset.domain_size(Domain::A);
    assert_eq!(size_a, 2);
    assert_eq!(dataset.len(), 6);

    for index in 0..dataset.len() {
        let sample = dataset.get(index)?;
        assert_eq!(sample.a_path(), dataset.paths(Domain::A)[index % size_a]);
    }
    Ok(())
}

#[test]
fn test_serial_batches_pair_b_c_d_by_modulo() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    training_tree(temp.path(), 6)?;
    let dataset = UnalignedDataset::new(small_options(temp.path()))?;
    let size_b = dataset.domain_size(Domain::B);
    assert_eq!(size_b, 3);

    for index in 0..7 {
        let expected = index % size_b;
        assert_eq!(dataset.resolve_paired_index(index)?, expected);
        assert_eq!(dataset.resolve_paired_index(index)?, expected);

        let sample = dataset.get(index)?;
        let train = sample.as_train().ok_or("expected a training sample")?;
        assert_eq!(train.b_path, dataset.paths(Domain::B)[expected]);
        assert_eq!(train.c_path, dataset.paths(Domain::C)[expected]);
        assert_eq!(train.d_path, dataset.paths(Domain::D)[expected]);
    }
    Ok(())
}

#[test]
fn test_random_paired_index() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    training_tree(temp.path(), 6)?;
    let mut options = small_options(temp.path());
    options.serial_batches = false;
    let dataset = UnalignedDataset::new(options)?;

    random::set_seed(7);
    let first: Vec<usize> = (0..60)
        .map(|_| dataset.resolve_paired_index(0))
        .collect::<Result<_, _>>()?;
    assert!(first.iter().all(|&i| i < 3));
    assert!(first.iter().collect::<HashSet<_>>().len() > 1);

    random::set_seed(7);
    let second: Vec<usize> = (0..60)
        .map(|_| dataset.resolve_paired_index(0))
        .collect::<Result<_, _>>()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_crop_is_shared_between_known_domains() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 2, 40, 30)?;
    populate(temp.path(), "trainB", 2, 36, 36)?;

    // D is the exact inverse of C, so an aligned crop satisfies c + d == 1
    for i in 0..2u8 {
        let blur = pattern(64, 56, i.wrapping_mul(40));
        let sharp = RgbImage::from_fn(64, 56, |x, y| {
            let p = blur.get_pixel(x, y);
            Rgb([255 - p[0], 255 - p[1], 255 - p[2]])
        });
        let name = format!("img_{:03}.png", i);
        write_image(&temp.path().join("trainC").join(&name), &blur)?;
        write_image(&temp.path().join("trainD").join(&name), &sharp)?;
    }

    let dataset = UnalignedDataset::new(small_options(temp.path()))?;
    random::set_seed(3);
    for index in 0..8 {
        let sample = dataset.get(index % dataset.len())?;
        let train = sample.as_train().ok_or("expected a training sample")?;

        assert_eq!(train.c.shape()[1..], train.a.shape()[1..]);
        assert_eq!(train.d.shape()[1..], train.a.shape()[1..]);
        for (c, d) in train.c.data().iter().zip(train.d.data()) {
            assert!((c + d - 1.0).abs() < 1e-5);
        }
    }
    Ok(())
}

#[test]
fn test_fixed_seed_reproduces_sample() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    training_tree(temp.path(), 4)?;
    let mut options = small_options(temp.path());
    options.serial_batches = false;
    options.no_flip = false;
    let dataset = UnalignedDataset::new(options)?;

    random::set_seed(42);
    let first = dataset.get(0)?;
    random::set_seed(42);
    let second = dataset.get(0)?;

    let (first, second) = (
        first.as_train().ok_or("expected a training sample")?,
        second.as_train().ok_or("expected a training sample")?,
    );
    assert_eq!(first.b_path, second.b_path);
    assert_eq!(first.a, second.a);
    assert_eq!(first.c, second.c);
    assert_eq!(first.d, second.d);
    Ok(())
}

#[test]
fn test_padding_applies_to_input_domain() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 2, 20, 12)?;
    populate(temp.path(), "trainB", 2, 36, 36)?;
    populate(temp.path(), "trainC", 2, 260, 258)?;
    populate(temp.path(), "trainD", 2, 260, 258)?;

    let mut options = small_options(temp.path());
    options.preprocess_a = "padding".to_string();
    let dataset = UnalignedDataset::new(options)?;

    let sample = dataset.get(0)?;
    let train = sample.as_train().ok_or("expected a training sample")?;

    assert_eq!(
        train.size_a,
        ImageSize {
            width: 20,
            height: 12
        }
    );
    assert_eq!(train.a.shape(), &[3, 256, 256]);
    assert_eq!(train.c.shape(), &[3, 256, 256]);
    assert_eq!(train.b.shape(), &[3, 24, 24]);

    // Original pixel at (x=1, y=0) survives, the padded area is zero (-1 once normalized)
    let expected = (7.0 / 255.0 - 0.5) / 0.5;
    let value = train.a.get(&[0, 0, 1]).ok_or("missing pixel")?;
    assert!((value - expected).abs() < 1e-5);
    assert_eq!(train.a.get(&[0, 200, 200]), Some(-1.0));
    assert_eq!(train.a.get(&[1, 12, 5]), Some(-1.0));
    Ok(())
}

#[test]
fn test_padding_applies_to_b_under_b_to_a() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 2, 36, 36)?;
    populate(temp.path(), "trainB", 2, 20, 12)?;
    populate(temp.path(), "trainC", 2, 48, 40)?;
    populate(temp.path(), "trainD", 2, 48, 40)?;

    let mut options = small_options(temp.path());
    options.direction = Direction::BtoA;
    options.preprocess_a = "padding".to_string();
    options.preprocess_b = "padding".to_string();
    let dataset = UnalignedDataset::new(options)?;

    let sample = dataset.get(0)?;
    let train = sample.as_train().ok_or("expected a training sample")?;

    // A is the translation output here and keeps its size
    assert_eq!(train.a.shape(), &[3, 36, 36]);
    assert_eq!(train.b.shape(), &[3, 256, 256]);
    assert_eq!(train.b.get(&[0, 200, 200]), Some(-1.0));
    assert_eq!(train.c.shape(), &[3, 36, 36]);
    assert_eq!(train.d.shape(), &[3, 36, 36]);
    Ok(())
}

#[test]
fn test_padding_marker_on_output_domain_is_ignored() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 2, 40, 30)?;
    populate(temp.path(), "trainB", 2, 20, 12)?;
    populate(temp.path(), "trainC", 2, 48, 40)?;
    populate(temp.path(), "trainD", 2, 48, 40)?;

    let mut options = small_options(temp.path());
    options.preprocess_b = "padding".to_string();
    let dataset = UnalignedDataset::new(options)?;

    let sample = dataset.get(0)?;
    let train = sample.as_train().ok_or("expected a training sample")?;
    assert_eq!(train.a.shape(), &[3, 24, 24]);
    assert_eq!(train.b.shape(), &[3, 12, 20]);
    Ok(())
}

#[test]
fn test_padding_skipped_outside_training() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "testA", 2, 20, 12)?;

    let mut options = small_options(temp.path());
    options.phase = "test".to_string();
    options.preprocess_a = "padding".to_string();
    let dataset = UnalignedDataset::new(options)?;

    let sample = dataset.get(1)?;
    assert!(matches!(sample, UnalignedSample::Test(_)));
    assert_eq!(sample.a().shape(), &[3, 12, 20]);
    assert_eq!(
        sample.size_a(),
        ImageSize {
            width: 20,
            height: 12
        }
    );
    Ok(())
}

#[test]
fn test_grayscale_follows_direction() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    training_tree(temp.path(), 4)?;

    let mut options = small_options(temp.path());
    options.input_nc = 1;
    let dataset = UnalignedDataset::new(options.clone())?;
    let sample = dataset.get(0)?;
    let train = sample.as_train().ok_or("expected a training sample")?;
    assert_eq!(train.a.shape(), &[1, 24, 24]);
    assert_eq!(train.b.shape(), &[3, 24, 24]);
    assert_eq!(train.c.shape(), &[3, 24, 24]);

    // Under BtoA the input channel count comes from output_nc
    options.direction = Direction::BtoA;
    let dataset = UnalignedDataset::new(options)?;
    let sample = dataset.get(0)?;
    let train = sample.as_train().ok_or("expected a training sample")?;
    assert_eq!(train.a.shape(), &[3, 24, 24]);
    assert_eq!(train.b.shape(), &[1, 24, 24]);
    Ok(())
}

#[test]
fn test_missing_known_directory_is_empty() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "trainA", 4, 40, 30)?;
    populate(temp.path(), "trainB", 4, 36, 36)?;
    populate(temp.path(), "trainD", 4, 48, 40)?;

    let mut options = small_options(temp.path());
    options.known_blur_dir = Some(temp.path().join("does_not_exist"));
    let dataset = UnalignedDataset::new(options)?;

    assert!(dataset.paths(Domain::C).is_empty());
    assert_eq!(dataset.domain_size(Domain::C), 0);

    let err = dataset.get(0).err().ok_or("expected a failure")?;
    assert!(matches!(err, BellandeError::IndexOutOfBounds));
    Ok(())
}

#[test]
fn test_empty_b_domain_is_a_fault() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    training_tree(temp.path(), 4)?;

    let mut options = small_options(temp.path());
    options.ratio = 1.0;
    let dataset = UnalignedDataset::new(options)?;
    assert_eq!(dataset.domain_size(Domain::B), 0);
    assert_eq!(dataset.len(), 4);

    let err = dataset.get(0).err().ok_or("expected a failure")?;
    assert!(matches!(err, BellandeError::EmptyDomain(_)));
    Ok(())
}

#[test]
fn test_directory_overrides() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    populate(temp.path(), "blur", 4, 40, 30)?;
    populate(temp.path(), "sharp", 4, 36, 36)?;

    let mut options = small_options(temp.path());
    options.blur_dir = Some(temp.path().join("blur"));
    options.sharp_dir = Some(temp.path().join("sharp"));
    let dataset = UnalignedDataset::new(options)?;

    assert_eq!(dataset.domain_size(Domain::A), 2);
    assert_eq!(dataset.domain_size(Domain::B), 2);
    assert!(dataset.paths(Domain::A)[0].starts_with(temp.path().join("blur")));
    Ok(())
}

#[test]
fn test_corrupt_image_is_reported() -> Result<(), Box<dyn Error>> {
    let temp = tempfile::tempdir()?;
    let dir = temp.path().join("testA");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("broken.png"), b"not a png")?;

    let mut options = small_options(temp.path());
    options.phase = "test".to_string();
    let dataset = UnalignedDataset::new(options)?;
    assert_eq!(dataset.len(), 1);

    let err = dataset.get(0).err().ok_or("expected a failure")?;
    assert!(matches!(err, BellandeError::ImageError(_)));
    Ok(())
}
