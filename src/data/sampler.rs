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

use crate::core::random;

/// Produces the visiting order of one epoch.
pub trait Sampler: Send + Sync {
    fn epoch(&mut self) -> Vec<usize>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fresh permutation of `0..data_len` every epoch.
pub struct RandomSampler {
    data_len: usize,
}

impl RandomSampler {
    pub fn new(data_len: usize) -> Self {
        RandomSampler { data_len }
    }
}

impl Sampler for RandomSampler {
    fn epoch(&mut self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.data_len).collect();
        random::shuffle(&mut indices);
        indices
    }

    fn len(&self) -> usize {
        self.data_len
    }
}

pub struct SequentialSampler {
    data_len: usize,
}

impl SequentialSampler {
    pub fn new(data_len: usize) -> Self {
        SequentialSampler { data_len }
    }
}

impl Sampler for SequentialSampler {
    fn epoch(&mut self) -> Vec<usize> {
        (0..self.data_len).collect()
    }

    fn len(&self) -> usize {
        self.data_len
    }
}
