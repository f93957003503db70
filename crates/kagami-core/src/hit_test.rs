//! Cursor classification against a region's handles and border band

use kagami_config::region::RegionConfig;
use kagami_types::{Point, Rect};

/// Resize handle at a corner or edge midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Left,
    Right,
    Top,
    Bottom,
}

impl Handle {
    /// Hit-test iteration order; the first match wins
    pub const ORDER: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::Left,
        Handle::Right,
        Handle::Top,
        Handle::Bottom,
    ];

    pub fn moves_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft | Handle::Left)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::BottomRight | Handle::Right)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight | Handle::Top)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomRight | Handle::Bottom)
    }

    /// Point of `r` the handle sits on
    pub fn position(self, r: &Rect) -> Point {
        let c = r.center();
        match self {
            Handle::TopLeft => Point::new(r.left, r.top),
            Handle::TopRight => Point::new(r.right, r.top),
            Handle::BottomLeft => Point::new(r.left, r.bottom),
            Handle::BottomRight => Point::new(r.right, r.bottom),
            Handle::Left => Point::new(r.left, c.y),
            Handle::Right => Point::new(r.right, c.y),
            Handle::Top => Point::new(c.x, r.top),
            Handle::Bottom => Point::new(c.x, r.bottom),
        }
    }
}

/// What a press at the cursor would start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitZone {
    Resize(Handle),
    Move,
}

impl HitZone {
    pub fn cursor(self) -> CursorShape {
        match self {
            HitZone::Move => CursorShape::SizeAll,
            HitZone::Resize(Handle::TopLeft | Handle::BottomRight) => CursorShape::SizeFDiag,
            HitZone::Resize(Handle::TopRight | Handle::BottomLeft) => CursorShape::SizeBDiag,
            HitZone::Resize(Handle::Left | Handle::Right) => CursorShape::SizeHor,
            HitZone::Resize(Handle::Top | Handle::Bottom) => CursorShape::SizeVer,
        }
    }
}

/// Cursor hint for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    Crosshair,
    SizeFDiag,
    SizeBDiag,
    SizeHor,
    SizeVer,
    SizeAll,
}

#[derive(Debug, Clone)]
pub struct HitTestEngine {
    pub handle_size: i32,
    pub hot_margin: i32,
    pub move_band: i32,
    pub border_move: bool,
    pub interior_move: bool,
}

impl HitTestEngine {
    pub fn from_config(config: &RegionConfig) -> Self {
        Self {
            handle_size: config.handle_size,
            hot_margin: config.handle_hot,
            move_band: config.move_band,
            border_move: config.border_move,
            interior_move: config.interior_move,
        }
    }

    /// Handle squares of side `handle_size + hot`, centered on their anchor points
    pub fn handle_rects(&self, r: &Rect, hot: i32) -> [(Handle, Rect); 8] {
        let hs = self.handle_size + hot;
        Handle::ORDER.map(|h| {
            let p = h.position(r);
            (h, Rect::from_xywh(p.x - hs / 2, p.y - hs / 2, hs, hs))
        })
    }

    /// Drawn handle squares, without hit tolerance
    pub fn drawn_handles(&self, r: &Rect) -> [(Handle, Rect); 8] {
        self.handle_rects(r, 0)
    }

    pub fn handle_at(&self, r: &Rect, p: Point) -> Option<Handle> {
        self.handle_rects(r, self.hot_margin)
            .into_iter()
            .find(|(_, zone)| zone.contains(p))
            .map(|(h, _)| h)
    }

    /// Inside `r`, within `move_band` of its border, and clear of every handle zone
    pub fn in_move_band(&self, r: &Rect, p: Point) -> bool {
        if !r.contains(p) {
            return false;
        }
        if r.inset(self.move_band).contains(p) {
            return false;
        }
        // Exclusion zones are slightly larger than the hit zones
        !self
            .handle_rects(r, self.hot_margin + 2)
            .iter()
            .any(|(_, zone)| zone.contains(p))
    }

    pub fn hit_test(&self, r: &Rect, p: Point) -> Option<HitZone> {
        if let Some(h) = self.handle_at(r, p) {
            return Some(HitZone::Resize(h));
        }
        if self.border_move && self.in_move_band(r, p) {
            return Some(HitZone::Move);
        }
        if self.interior_move && r.contains(p) {
            return Some(HitZone::Move);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HitTestEngine {
        HitTestEngine::from_config(&RegionConfig::default())
    }

    #[test]
    fn test_corner_handles_win_over_edges() {
        let e = engine();
        let r = Rect::new(100, 100, 300, 250);
        assert_eq!(e.hit_test(&r, Point::new(100, 100)), Some(HitZone::Resize(Handle::TopLeft)));
        assert_eq!(e.hit_test(&r, Point::new(300, 100)), Some(HitZone::Resize(Handle::TopRight)));
        assert_eq!(e.hit_test(&r, Point::new(102, 249)), Some(HitZone::Resize(Handle::BottomLeft)));
        assert_eq!(e.hit_test(&r, Point::new(305, 255)), Some(HitZone::Resize(Handle::BottomRight)));
        assert_eq!(e.hit_test(&r, Point::new(100, 175)), Some(HitZone::Resize(Handle::Left)));
        assert_eq!(e.hit_test(&r, Point::new(200, 250)), Some(HitZone::Resize(Handle::Bottom)));
    }

    #[test]
    fn test_handle_zone_extends_outside_region() {
        let e = engine();
        let r = Rect::new(100, 100, 300, 250);
        // (12 + 6) / 2 = 9 px of tolerance before the corner
        assert_eq!(e.handle_at(&r, Point::new(91, 91)), Some(Handle::TopLeft));
        assert_eq!(e.handle_at(&r, Point::new(90, 90)), None);
    }

    #[test]
    fn test_border_band_moves() {
        let e = engine();
        let r = Rect::new(100, 100, 300, 250);
        assert_eq!(e.hit_test(&r, Point::new(150, 103)), Some(HitZone::Move));
        assert_eq!(e.hit_test(&r, Point::new(296, 200)), Some(HitZone::Move));
        // Deep inside the band-adjusted rectangle: nothing
        assert_eq!(e.hit_test(&r, Point::new(150, 150)), None);
        // Outside the region but away from handles: nothing
        assert_eq!(e.hit_test(&r, Point::new(150, 95)), None);
    }

    #[test]
    fn test_interior_move_is_opt_in() {
        let mut e = engine();
        let r = Rect::new(100, 100, 300, 250);
        assert_eq!(e.hit_test(&r, Point::new(200, 170)), None);
        e.interior_move = true;
        assert_eq!(e.hit_test(&r, Point::new(200, 170)), Some(HitZone::Move));
    }

    #[test]
    fn test_border_move_disabled() {
        let mut e = engine();
        e.border_move = false;
        let r = Rect::new(100, 100, 300, 250);
        assert_eq!(e.hit_test(&r, Point::new(150, 103)), None);
    }

    #[test]
    fn test_handle_and_band_are_mutually_exclusive() {
        let e = engine();
        for r in [
            Rect::new(100, 100, 300, 250),
            Rect::new(0, 0, 40, 30),
            Rect::new(-50, 20, 10, 90),
        ] {
            for y in (r.top - 20)..(r.bottom + 20) {
                for x in (r.left - 20)..(r.right + 20) {
                    let p = Point::new(x, y);
                    assert!(
                        !(e.handle_at(&r, p).is_some() && e.in_move_band(&r, p)),
                        "{p:?} is both a handle and a move band point of {r:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_cursor_shapes() {
        assert_eq!(HitZone::Move.cursor(), CursorShape::SizeAll);
        assert_eq!(HitZone::Resize(Handle::TopLeft).cursor(), CursorShape::SizeFDiag);
        assert_eq!(HitZone::Resize(Handle::BottomLeft).cursor(), CursorShape::SizeBDiag);
        assert_eq!(HitZone::Resize(Handle::Right).cursor(), CursorShape::SizeHor);
        assert_eq!(HitZone::Resize(Handle::Top).cursor(), CursorShape::SizeVer);
    }
}
