//! Read-only overlay snapshot for renderers

use kagami_capture::CaptureMode;
use kagami_core::{CursorShape, Handle, HoverState, SelectionPreview};
use kagami_types::{Point, Rect, RegionSlot};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub slot: RegionSlot,
    pub bounds: Rect,
    /// Outline for polygon regions
    pub outline: Option<Vec<Point>>,
    pub visible: bool,
    /// Handle squares to draw; empty when handles are hidden
    pub handles: Vec<(Handle, Rect)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub frames: Vec<FrameView>,
    pub hover: Option<HoverState>,
    pub darkened: bool,
    pub input_transparent: bool,
    pub cursor: CursorShape,
    pub selection: SelectionPreview,
    pub text_band: Rect,
    pub text: String,
    pub busy: bool,
    pub dots: u8,
    pub font_pt: u32,
    pub concat_frames: usize,
    pub capture_mode: CaptureMode,
}

impl OverlayView {
    /// Line shown in the text band
    pub fn caption(&self) -> String {
        if self.busy {
            format!("translating{}", ".".repeat(self.dots as usize))
        } else {
            self.text.clone()
        }
    }
}

/// Draws overlay snapshots
pub trait Renderer: Send {
    fn render(&mut self, view: &OverlayView);
}

/// Logs what a renderer would draw whenever it changes
#[derive(Default)]
pub struct LogRenderer {
    last: Option<OverlayView>,
}

impl Renderer for LogRenderer {
    fn render(&mut self, view: &OverlayView) {
        let Some(last) = &self.last else {
            tracing::info!("[VIEW] {} frame(s), band {:?}", view.frames.len(), view.text_band);
            self.last = Some(view.clone());
            return;
        };
        if last == view {
            return;
        }
        if last.caption() != view.caption() {
            tracing::info!("[VIEW] {}", view.caption());
        }
        if last.frames != view.frames || last.darkened != view.darkened {
            for frame in &view.frames {
                tracing::debug!(
                    "[VIEW] {:?} {:?} visible={} handles={}",
                    frame.slot,
                    frame.bounds,
                    frame.visible,
                    frame.handles.len()
                );
            }
        }
        if last.cursor != view.cursor {
            tracing::trace!("[VIEW] cursor {:?}", view.cursor);
        }
        self.last = Some(view.clone());
    }
}
