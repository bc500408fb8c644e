pub mod augmentation;
pub mod dataloader;
pub mod dataset;
pub mod image_decoder;
pub mod image_folder;
pub mod image_transformation_augmentation;
pub mod preprocessing;
pub mod sampler;
pub mod unaligned_dataset;
