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
use crate::data::dataset::Dataset;
use crate::data::sampler::{RandomSampler, Sampler, SequentialSampler};
use crate::utilities::config::DatasetOptions;
use log::{debug, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;

/// Merges the items of one batch.
pub trait Collate: Sized {
    type Batch;

    fn collate(items: Vec<Self>) -> Result<Self::Batch, BellandeError>;
}

pub struct DataLoader<D: Dataset> {
    dataset: Arc<D>,
    batch_size: usize,
    max_size: Option<usize>,
    sampler: Box<dyn Sampler>,
    pool: Option<ThreadPool>,
    drop_last: bool,
}

impl<D> DataLoader<D>
where
    D: Dataset,
    D::Item: Collate,
{
    pub fn new(
        dataset: Arc<D>,
        batch_size: usize,
        shuffle: bool,
        num_threads: usize,
        max_size: Option<usize>,
        drop_last: bool,
    ) -> Result<Self, BellandeError> {
        if batch_size == 0 {
            return Err(BellandeError::InvalidParameter(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        let sampler: Box<dyn Sampler> = if shuffle {
            Box::new(RandomSampler::new(dataset.len()))
        } else {
            Box::new(SequentialSampler::new(dataset.len()))
        };

        let pool = if num_threads > 1 {
            Some(build_pool(num_threads, None)?)
        } else {
            None
        };

        Ok(DataLoader {
            dataset,
            batch_size,
            max_size,
            sampler,
            pool,
            drop_last,
        })
    }

    /// Loader configured from dataset options: shuffled unless `serial_batches`,
    /// epochs capped at `max_dataset_size`, last partial batch kept.
    pub fn from_options(dataset: Arc<D>, options: &DatasetOptions) -> Result<Self, BellandeError> {
        let loader = DataLoader::new(
            dataset,
            options.batch_size,
            !options.serial_batches,
            options.num_threads,
            options.max_dataset_size,
            false,
        )?;

        match options.seed {
            Some(seed) => loader.with_worker_seed(seed),
            None => Ok(loader),
        }
    }

    /// Reseeds every worker thread, worker `i` with `seed + i + 1`.
    ///
    /// Which worker assembles which sample is up to rayon, so parallel epochs are
    /// seeded but not reproducible.
    pub fn with_worker_seed(mut self, seed: u64) -> Result<Self, BellandeError> {
        if self.pool.is_none() {
            return Ok(self);
        }
        let num_threads = self.num_threads();

        warn!(
            "Seed {} applies per worker across {} threads; sample order is not reproducible",
            seed, num_threads
        );
        self.pool = Some(build_pool(num_threads, Some(seed))?);
        Ok(self)
    }

    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map(|pool| pool.current_num_threads())
            .unwrap_or(1)
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// Number of samples visited per epoch.
    pub fn len(&self) -> usize {
        match self.max_size {
            Some(max_size) => self.dataset.len().min(max_size),
            None => self.dataset.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_batches(&self) -> usize {
        let len = self.len();
        if self.drop_last {
            len / self.batch_size
        } else {
            (len + self.batch_size - 1) / self.batch_size
        }
    }

    /// Starts a new epoch.
    pub fn iter(&mut self) -> DataLoaderIterator<'_, D> {
        let mut order = self.sampler.epoch();
        order.truncate(self.len());
        debug!(
            "Epoch of {} samples in {} batches",
            order.len(),
            self.num_batches()
        );

        DataLoaderIterator {
            dataloader: self,
            order,
            position: 0,
        }
    }

    fn load_batch(&self, indices: &[usize]) -> Result<Vec<D::Item>, BellandeError> {
        match &self.pool {
            Some(pool) => pool.install(|| {
                indices
                    .par_iter()
                    .map(|&idx| self.dataset.get(idx))
                    .collect()
            }),
            None => indices.iter().map(|&idx| self.dataset.get(idx)).collect(),
        }
    }
}

fn build_pool(num_threads: usize, seed: Option<u64>) -> Result<ThreadPool, BellandeError> {
    let mut builder = rayon::ThreadPoolBuilder::new().num_threads(num_threads);
    if let Some(seed) = seed {
        builder = builder.start_handler(move |worker| {
            random::set_seed(seed.wrapping_add(worker as u64 + 1));
        });
    }
    builder
        .build()
        .map_err(|e| BellandeError::InvalidConfiguration(e.to_string()))
}

pub struct DataLoaderIterator<'a, D: Dataset> {
    dataloader: &'a DataLoader<D>,
    order: Vec<usize>,
    position: usize,
}

impl<'a, D> Iterator for DataLoaderIterator<'a, D>
where
    D: Dataset,
    D::Item: Collate,
{
    type Item = Result<<D::Item as Collate>::Batch, BellandeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }

        let end = (self.position + self.dataloader.batch_size).min(self.order.len());
        let batch_indices = &self.order[self.position..end];

        if self.dataloader.drop_last && batch_indices.len() < self.dataloader.batch_size {
            return None;
        }

        self.position = end;

        Some(
            self.dataloader
                .load_batch(batch_indices)
                .and_then(<D::Item as Collate>::collate),
        )
    }
}
