pub mod geometry;
pub mod types;

pub use geometry::{PixelRect, Point, Rect};
pub use types::*;
