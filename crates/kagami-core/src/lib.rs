pub mod editor;
pub mod error;
pub mod hit_test;
pub mod input;
pub mod jobs;
pub mod region;
pub mod selection;

pub use editor::{EditSession, HoverState, RegionEditor};
pub use error::EditError;
pub use hit_test::{CursorShape, Handle, HitTestEngine, HitZone};
pub use input::CommandEdges;
pub use jobs::{JobScheduler, JobState, JobTicket};
pub use region::{Limits, Polygon, Region, RegionModel};
pub use selection::{SelectionKind, SelectionPreview, SelectionStrategy};
