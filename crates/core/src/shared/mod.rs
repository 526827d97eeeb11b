pub mod bounding_box;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod error;
pub mod face_crop;
pub mod image;
pub mod model_resolver;
