use thiserror::Error;

#[derive(Debug, Error)]
pub enum HullPackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Sprite '{key}' ({width}x{height} with padding) exceeds max texture size {max}")]
    Oversized {
        key: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("Failed to generate convex hull for sprite '{key}' ({points} hull points)")]
    DegenerateHull { key: String, points: usize },
    #[error("Out of space: placed {placed} of {total} sprites")]
    OutOfSpace { placed: usize, total: usize },
    #[error("Nothing to pack")]
    Empty,
    #[error("Overlap detected on page {page} between placed sprites {a} and {b}")]
    Overlap { page: usize, a: usize, b: usize },
}

pub type Result<T> = std::result::Result<T, HullPackerError>;
