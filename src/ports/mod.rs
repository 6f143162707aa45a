//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the workflow and an external
//! system. Implementations live in `src/adapters/`.

pub mod image_fetcher;
pub mod image_generator;
pub mod image_host;
pub mod link_opener;

pub use image_fetcher::{ImageData, ImageFetcher};
pub use image_generator::{ImageGenerator, ImageReference};
pub use image_host::{HostedImageRecord, ImageHost, UploadRequest};
pub use link_opener::LinkOpener;
