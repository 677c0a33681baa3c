//! Export of analysis results to external formats.

#[cfg(feature = "png_export")]
pub mod image;
