pub mod capture;
pub mod concat;
pub mod display;
pub mod encode;
pub mod error;
pub mod guard;
pub mod preprocess;
pub mod service;

pub use capture::{CaptureMode, CaptureSettings, Capturer};
pub use concat::{CaptureFrame, ConcatBuffer, compose_vertical, slice_bands};
pub use display::{Addressing, CaptureCoordinateMapper, DisplayInfo, desktop_bounds};
pub use encode::encode_png;
pub use error::CaptureError;
pub use guard::{HiddenOverlays, OpacityCell, OverlaySurface};
pub use service::{CaptureService, StillImageCapture};

#[cfg(feature = "xcap")]
pub use service::ScreenCapture;
