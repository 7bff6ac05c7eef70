//! Individual preprocessing steps, in the order the pipeline runs them

pub mod grayscale;
pub mod upscale;
pub mod denoise;
pub mod threshold;
pub mod deskew;
