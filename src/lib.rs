// Textmark library: semi-transparent text watermarks for raster images

pub mod config;
pub mod error;
pub mod logging;
pub mod watermark;
