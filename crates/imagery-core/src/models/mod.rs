//! Data models for the image lifecycle

mod image;

pub use image::*;
