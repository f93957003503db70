//! Interactive region editing: hover, manual edit mode, drags and selections
//!
//! The editor owns the [`RegionModel`] and is driven by the overlay loop.
//! Hover classification runs once per tick and only toggles input
//! transparency; regions change only through drags and completed selections.

use kagami_config::region::RegionConfig;
use kagami_types::{Point, Rect, RegionSlot};

use crate::error::EditError;
use crate::hit_test::{CursorShape, HitTestEngine, HitZone};
use crate::region::{Region, RegionModel};
use crate::selection::{SelectionKind, SelectionPreview, SelectionStrategy};

/// Active drag, alive from press to release
#[derive(Debug, Clone)]
pub struct EditSession {
    pub slot: RegionSlot,
    pub zone: HitZone,
    pub anchor_cursor: Point,
    pub anchor_region: Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverState {
    pub slot: RegionSlot,
    pub zone: HitZone,
}

struct ActiveSelection {
    slot: RegionSlot,
    strategy: Box<dyn SelectionStrategy>,
}

pub struct RegionEditor {
    model: RegionModel,
    engine: HitTestEngine,
    auto_edit: bool,
    manual: Option<RegionSlot>,
    session: Option<EditSession>,
    hover: Option<HoverState>,
    input_transparent: bool,
    show_main: bool,
    show_speaker: bool,
    selection_kind: SelectionKind,
    selection: Option<ActiveSelection>,
}

impl RegionEditor {
    pub fn new(desktop: Rect, config: &RegionConfig) -> Self {
        Self {
            model: RegionModel::new(desktop, config),
            engine: HitTestEngine::from_config(config),
            auto_edit: config.auto_edit,
            manual: None,
            session: None,
            hover: None,
            input_transparent: true,
            show_main: true,
            show_speaker: true,
            selection_kind: SelectionKind::default(),
            selection: None,
        }
    }

    pub fn model(&self) -> &RegionModel {
        &self.model
    }

    pub fn engine(&self) -> &HitTestEngine {
        &self.engine
    }

    pub fn region(&self, slot: RegionSlot) -> Option<&Region> {
        self.model.get(slot)
    }

    pub fn hover(&self) -> Option<HoverState> {
        self.hover
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn manual_edit(&self) -> Option<RegionSlot> {
        self.manual
    }

    pub fn is_selecting(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selecting_slot(&self) -> Option<RegionSlot> {
        self.selection.as_ref().map(|s| s.slot)
    }

    pub fn selection_kind(&self) -> SelectionKind {
        self.selection_kind
    }

    pub fn set_selection_kind(&mut self, kind: SelectionKind) {
        self.selection_kind = kind;
    }

    pub fn selection_preview(&self) -> SelectionPreview {
        self.selection
            .as_ref()
            .map(|s| s.strategy.preview())
            .unwrap_or(SelectionPreview::Empty)
    }

    pub fn frame_visible(&self, slot: RegionSlot) -> bool {
        match slot {
            RegionSlot::Main => self.show_main,
            RegionSlot::Speaker => self.show_speaker,
        }
    }

    pub fn set_frame_visible(&mut self, slot: RegionSlot, visible: bool) {
        match slot {
            RegionSlot::Main => self.show_main = visible,
            RegionSlot::Speaker => self.show_speaker = visible,
        }
    }

    /// Background dims while selecting or in manual edit mode
    pub fn darkened(&self) -> bool {
        self.selection.is_some() || self.manual.is_some()
    }

    pub fn handles_visible(&self, slot: RegionSlot) -> bool {
        if self.selecting_slot() == Some(slot) || self.model.get(slot).is_none() {
            return false;
        }
        self.manual == Some(slot) || self.hover.map(|h| h.slot) == Some(slot)
    }

    /// Whether pointer events should pass through the overlay
    pub fn input_transparent(&self) -> bool {
        self.input_transparent
    }

    pub fn cursor(&self) -> CursorShape {
        if self.selection.is_some() {
            return CursorShape::Crosshair;
        }
        if let Some(session) = &self.session {
            return session.zone.cursor();
        }
        self.hover
            .map(|h| h.zone.cursor())
            .unwrap_or(CursorShape::Arrow)
    }

    /// Enter or leave manual edit mode for `slot`
    pub fn set_manual_edit(&mut self, slot: RegionSlot, on: bool) -> Result<(), EditError> {
        if on && self.model.get(slot).is_none() {
            return Err(EditError::SpeakerUnset);
        }
        if on {
            self.manual = Some(slot);
            self.set_frame_visible(slot, true);
        } else if self.manual == Some(slot) {
            self.manual = None;
        }
        self.selection = None;
        self.hover = None;
        self.input_transparent = self.manual.is_none();
        tracing::debug!("[EDITOR] manual edit: {:?}", self.manual);
        Ok(())
    }

    pub fn toggle_manual_edit(&mut self, slot: RegionSlot) -> Result<bool, EditError> {
        let on = self.manual != Some(slot);
        self.set_manual_edit(slot, on)?;
        Ok(on)
    }

    /// Start drawing a new region for `slot` with the current strategy
    pub fn start_selection(&mut self, slot: RegionSlot) {
        self.manual = None;
        self.hover = None;
        self.session = None;
        self.input_transparent = false;
        self.selection = Some(ActiveSelection {
            slot,
            strategy: self.selection_kind.strategy(),
        });
        tracing::debug!("[EDITOR] selecting {:?} ({:?})", slot, self.selection_kind);
    }

    pub fn cancel_selection(&mut self) {
        if self.selection.take().is_some() {
            self.input_transparent = self.manual.is_none();
        }
    }

    pub fn clear_speaker(&mut self) {
        // Speaker is always clearable
        let _ = self.model.clear(RegionSlot::Speaker);
        if self.manual == Some(RegionSlot::Speaker) {
            self.manual = None;
            self.input_transparent = true;
        }
        if self.session.as_ref().map(|s| s.slot) == Some(RegionSlot::Speaker) {
            self.session = None;
        }
        self.hover = None;
    }

    /// Recompute hover for auto-edit mode; safe to call any number of times
    pub fn tick_hover(&mut self, cursor: Point) -> Option<HoverState> {
        if !self.auto_edit || self.manual.is_some() || self.selection.is_some() {
            return self.hover;
        }

        self.hover = RegionSlot::ORDER.into_iter().find_map(|slot| {
            if !self.frame_visible(slot) {
                return None;
            }
            let region = self.model.get(slot)?;
            self.engine
                .hit_test(&region.bounds(), cursor)
                .map(|zone| HoverState { slot, zone })
        });

        self.input_transparent = !(self.hover.is_some() || self.session.is_some());
        self.hover
    }

    /// Returns true if the press was consumed by the editor
    pub fn press(&mut self, p: Point) -> bool {
        if let Some(sel) = self.selection.as_mut() {
            sel.strategy.begin(p);
            return true;
        }

        let (slot, manual) = match (self.manual, self.hover) {
            (Some(slot), _) => (slot, true),
            (None, Some(h)) => (h.slot, false),
            (None, None) => return false,
        };
        let Some(region) = self.model.get(slot) else {
            return false;
        };
        let bounds = region.bounds();
        let zone = match self.engine.hit_test(&bounds, p) {
            Some(zone) => Some(zone),
            // Manual mode moves from anywhere inside
            None if manual && bounds.contains(p) => Some(HitZone::Move),
            None => None,
        };
        let Some(zone) = zone else {
            return false;
        };

        tracing::debug!("[EDITOR] drag start {:?} {:?} at {:?}", slot, zone, p);
        self.session = Some(EditSession {
            slot,
            zone,
            anchor_cursor: p,
            anchor_region: region.clone(),
        });
        self.input_transparent = false;
        true
    }

    pub fn drag(&mut self, p: Point) {
        if let Some(session) = &self.session {
            let (dx, dy) = p.delta_from(session.anchor_cursor);
            self.model
                .apply_drag(session.slot, &session.anchor_region, session.zone, dx, dy);
            return;
        }
        if let Some(sel) = self.selection.as_mut() {
            sel.strategy.extend(p);
        }
    }

    /// Finish the active drag or selection; returns the slot that changed
    pub fn release(&mut self, p: Point) -> Option<RegionSlot> {
        if let Some(session) = self.session.take() {
            self.input_transparent = self.manual.is_none() && self.hover.is_none();
            tracing::debug!(
                "[EDITOR] drag end {:?}: {:?}",
                session.slot,
                self.model.get(session.slot).map(|r| r.bounds())
            );
            return Some(session.slot);
        }

        let mut sel = self.selection.take()?;
        sel.strategy.extend(p);
        self.input_transparent = self.manual.is_none();
        let region = sel.strategy.finish(self.model.limits())?;
        self.model.replace(sel.slot, region);
        Some(sel.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::Handle;

    fn editor() -> RegionEditor {
        // Main region starts at (40, 40, 1880, 1040)
        RegionEditor::new(Rect::new(0, 0, 1920, 1080), &RegionConfig::default())
    }

    #[test]
    fn test_hover_is_idempotent_and_toggles_transparency() {
        let mut ed = editor();
        assert!(ed.input_transparent());

        let on_handle = Point::new(40, 40);
        let first = ed.tick_hover(on_handle);
        let second = ed.tick_hover(on_handle);
        assert_eq!(first, second);
        assert_eq!(
            first,
            Some(HoverState {
                slot: RegionSlot::Main,
                zone: HitZone::Resize(Handle::TopLeft)
            })
        );
        assert!(!ed.input_transparent());
        assert!(ed.handles_visible(RegionSlot::Main));
        assert_eq!(ed.model().main().bounds(), Rect::new(40, 40, 1880, 1040));

        assert_eq!(ed.tick_hover(Point::new(900, 500)), None);
        assert!(ed.input_transparent());
        assert!(!ed.handles_visible(RegionSlot::Main));
        assert!(!ed.darkened());
    }

    #[test]
    fn test_hidden_frame_is_not_hoverable() {
        let mut ed = editor();
        ed.set_frame_visible(RegionSlot::Main, false);
        assert_eq!(ed.tick_hover(Point::new(40, 40)), None);
    }

    #[test]
    fn test_auto_drag_resizes_main() {
        let mut ed = editor();
        ed.tick_hover(Point::new(1880, 1040));
        assert!(ed.press(Point::new(1880, 1040)));
        ed.drag(Point::new(1000, 700));
        // Hover ticks during a drag keep input captured
        ed.tick_hover(Point::new(1000, 700));
        assert!(!ed.input_transparent());
        assert_eq!(ed.release(Point::new(1000, 700)), Some(RegionSlot::Main));
        assert_eq!(ed.model().main().bounds(), Rect::new(40, 40, 1000, 700));
    }

    #[test]
    fn test_press_without_hover_is_not_consumed() {
        let mut ed = editor();
        ed.tick_hover(Point::new(900, 500));
        assert!(!ed.press(Point::new(900, 500)));
        assert!(ed.session().is_none());
    }

    #[test]
    fn test_manual_mode_moves_from_interior() {
        let mut ed = editor();
        ed.set_manual_edit(RegionSlot::Main, true).unwrap();
        assert!(ed.darkened());
        assert!(!ed.input_transparent());
        assert!(ed.handles_visible(RegionSlot::Main));
        // Hover is frozen in manual mode
        assert_eq!(ed.tick_hover(Point::new(40, 40)), None);

        assert!(ed.press(Point::new(900, 500)));
        ed.drag(Point::new(880, 490));
        ed.release(Point::new(880, 490));
        assert_eq!(ed.model().main().bounds(), Rect::new(20, 30, 1860, 1030));

        ed.set_manual_edit(RegionSlot::Main, false).unwrap();
        assert!(ed.input_transparent());
        assert!(!ed.darkened());
    }

    #[test]
    fn test_manual_edit_of_unset_speaker_is_refused() {
        let mut ed = editor();
        assert!(matches!(
            ed.set_manual_edit(RegionSlot::Speaker, true),
            Err(EditError::SpeakerUnset)
        ));
        assert!(ed.manual_edit().is_none());
    }

    #[test]
    fn test_manual_modes_are_exclusive() {
        let mut ed = editor();
        ed.start_selection(RegionSlot::Speaker);
        ed.press(Point::new(100, 100));
        ed.drag(Point::new(300, 200));
        ed.release(Point::new(300, 200));

        ed.set_manual_edit(RegionSlot::Main, true).unwrap();
        ed.set_manual_edit(RegionSlot::Speaker, true).unwrap();
        assert_eq!(ed.manual_edit(), Some(RegionSlot::Speaker));
        assert!(!ed.handles_visible(RegionSlot::Main));
    }

    #[test]
    fn test_rectangle_selection_replaces_region() {
        let mut ed = editor();
        ed.set_manual_edit(RegionSlot::Main, true).unwrap();
        ed.start_selection(RegionSlot::Main);
        assert!(ed.manual_edit().is_none());
        assert!(ed.darkened());
        assert_eq!(ed.cursor(), CursorShape::Crosshair);

        ed.press(Point::new(500, 300));
        ed.drag(Point::new(200, 100));
        assert_eq!(ed.selection_preview(), SelectionPreview::Rect(Rect::new(200, 100, 500, 300)));
        assert_eq!(ed.release(Point::new(200, 100)), Some(RegionSlot::Main));
        assert_eq!(ed.model().main().bounds(), Rect::new(200, 100, 500, 300));
        assert!(!ed.is_selecting());
        assert!(ed.input_transparent());
    }

    #[test]
    fn test_polygon_selection_sets_polygon_region() {
        let mut ed = editor();
        ed.set_selection_kind(SelectionKind::Polygon);
        ed.start_selection(RegionSlot::Main);
        ed.press(Point::new(100, 100));
        ed.drag(Point::new(400, 120));
        ed.drag(Point::new(300, 380));
        ed.release(Point::new(120, 360));
        let region = ed.region(RegionSlot::Main).unwrap();
        assert!(region.polygon().is_some());
        assert_eq!(region.bounds(), Rect::new(100, 100, 400, 380));
    }

    #[test]
    fn test_clear_speaker_leaves_manual_mode() {
        let mut ed = editor();
        ed.start_selection(RegionSlot::Speaker);
        ed.press(Point::new(100, 100));
        ed.release(Point::new(300, 200));
        ed.set_manual_edit(RegionSlot::Speaker, true).unwrap();
        ed.clear_speaker();
        assert!(ed.region(RegionSlot::Speaker).is_none());
        assert!(ed.manual_edit().is_none());
        assert!(ed.input_transparent());
    }
}
