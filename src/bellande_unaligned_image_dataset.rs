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
use crate::data::{dataloader::DataLoader, unaligned_dataset::UnalignedDataset};
use crate::utilities::config::DatasetOptions;
use log::info;
use std::path::Path;
use std::sync::Arc;

pub mod core;
pub mod data;
pub mod utilities;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const FRAMEWORK_NAME: &str = "Bellande Unaligned Image Dataset";

pub struct Framework {
    options: DatasetOptions,
    initialized: bool,
}

impl Framework {
    pub fn new() -> Self {
        Framework::with_options(DatasetOptions::default())
    }

    pub fn with_options(options: DatasetOptions) -> Self {
        Framework {
            options,
            initialized: false,
        }
    }

    pub fn with_config<P: AsRef<Path>>(config_path: P) -> Result<Self, BellandeError> {
        let options = DatasetOptions::from_file(config_path)?;
        Ok(Framework::with_options(options))
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    pub fn initialize(&mut self) -> Result<(), BellandeError> {
        if self.initialized {
            return Ok(());
        }

        self.options
            .validate()
            .map_err(BellandeError::InvalidConfiguration)?;

        // Set random seed if specified
        if let Some(seed) = self.options.seed {
            crate::core::random::set_seed(seed);
            info!("Random seed set to {}", seed);
        }

        self.initialized = true;
        Ok(())
    }

    pub fn dataset(&mut self) -> Result<UnalignedDataset, BellandeError> {
        self.initialize()?;
        UnalignedDataset::new(self.options.clone())
    }

    pub fn data_loader(&mut self) -> Result<DataLoader<UnalignedDataset>, BellandeError> {
        let dataset = Arc::new(self.dataset()?);
        DataLoader::from_options(dataset, &self.options)
    }

    pub fn get_version() -> &'static str {
        VERSION
    }

    pub fn get_name() -> &'static str {
        FRAMEWORK_NAME
    }

    pub fn system_info() -> String {
        format!(
            "{} v{}\n\
            CPU Threads: {}",
            FRAMEWORK_NAME,
            VERSION,
            num_cpus::get(),
        )
    }
}

impl Default for Framework {
    fn default() -> Self {
        Framework::new()
    }
}
