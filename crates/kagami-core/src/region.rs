//! Region shapes and the model that owns them

use kagami_config::region::RegionConfig;
use kagami_types::{Point, Rect, RegionSlot};

use crate::error::EditError;
use crate::hit_test::{Handle, HitZone};

/// Desktop bounds and minimum rectangle size every region must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub desktop: Rect,
    pub min_width: i32,
    pub min_height: i32,
}

impl Limits {
    pub fn new(desktop: Rect, config: &RegionConfig) -> Self {
        Self {
            desktop,
            min_width: config.min_width,
            min_height: config.min_height,
        }
    }

    /// Grow `r` to the minimum size, then shift it inside the desktop
    pub fn fit(&self, r: Rect) -> Rect {
        let d = self.desktop;
        let w = r.width().max(self.min_width).min(d.width());
        let h = r.height().max(self.min_height).min(d.height());
        let left = r.left.min(d.right - w).max(d.left);
        let top = r.top.min(d.bottom - h).max(d.top);
        Rect::from_xywh(left, top, w, h)
    }

    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.desktop.left, self.desktop.right),
            p.y.clamp(self.desktop.top, self.desktop.bottom),
        )
    }

    /// Apply a handle drag to `anchor`
    ///
    /// Only the edges named by the handle move. The minimum size is enforced by
    /// keeping the opposite edge fixed, and the result is clamped to the desktop.
    pub fn resize(&self, anchor: &Rect, handle: Handle, dx: i32, dy: i32) -> Rect {
        let (mut l, mut t, mut r, mut b) = (anchor.left, anchor.top, anchor.right, anchor.bottom);
        if handle.moves_left() {
            l += dx;
        }
        if handle.moves_right() {
            r += dx;
        }
        if handle.moves_top() {
            t += dy;
        }
        if handle.moves_bottom() {
            b += dy;
        }

        if r - l < self.min_width {
            if handle.moves_left() {
                l = r - self.min_width;
            } else {
                r = l + self.min_width;
            }
        }
        if b - t < self.min_height {
            if handle.moves_top() {
                t = b - self.min_height;
            } else {
                b = t + self.min_height;
            }
        }

        let d = self.desktop;
        let clamped = Rect::new(l.max(d.left), t.max(d.top), r.min(d.right), b.min(d.bottom));
        if clamped.width() >= self.min_width && clamped.height() >= self.min_height {
            clamped
        } else {
            // Only reachable when the anchor itself violated the limits
            self.fit(clamped)
        }
    }

    /// Translate `anchor`, keeping it whole inside the desktop
    pub fn translate(&self, anchor: &Rect, dx: i32, dy: i32) -> Rect {
        let moved = anchor.translate(dx, dy);
        let d = self.desktop;
        let mut sx = 0;
        let mut sy = 0;
        if moved.left < d.left {
            sx = d.left - moved.left;
        } else if moved.right > d.right {
            sx = d.right - moved.right;
        }
        if moved.top < d.top {
            sy = d.top - moved.top;
        } else if moved.bottom > d.bottom {
            sy = d.bottom - moved.bottom;
        }
        self.fit(moved.translate(sx, sy))
    }

    /// Resize or move `anchor` for the given hit zone
    pub fn apply(&self, anchor: &Rect, zone: HitZone, dx: i32, dy: i32) -> Rect {
        match zone {
            HitZone::Resize(h) => self.resize(anchor, h, dx, dy),
            HitZone::Move => self.translate(anchor, dx, dy),
        }
    }
}

/// Closed free-form path with its bounding box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
    bounds: Rect,
}

impl Polygon {
    /// `None` for fewer than three points or a degenerate (zero-area) box
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let bounds = Rect::bounding(&points)?;
        if bounds.is_empty() {
            return None;
        }
        Some(Self { points, bounds })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Even-odd point-in-polygon test on fractional coordinates
    pub fn contains_f(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.points[i].x as f64, self.points[i].y as f64);
            let (xj, yj) = (self.points[j].x as f64, self.points[j].y as f64);
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub fn contains(&self, p: Point) -> bool {
        self.contains_f(p.x as f64 + 0.5, p.y as f64 + 0.5)
    }

    /// Map every point proportionally into `target`
    pub fn refit(&self, target: Rect) -> Polygon {
        let src = self.bounds;
        let map = |v: i32, s0: i32, slen: i32, t0: i32, tlen: i32| -> i32 {
            t0 + ((v - s0) as i64 * tlen as i64 / slen.max(1) as i64) as i32
        };
        let points: Vec<Point> = self
            .points
            .iter()
            .map(|p| {
                Point::new(
                    map(p.x, src.left, src.width(), target.left, target.width()),
                    map(p.y, src.top, src.height(), target.top, target.height()),
                )
            })
            .collect();
        let bounds = Rect::bounding(&points).unwrap_or(target);
        Polygon { points, bounds }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Rectangle(Rect),
    Polygon(Polygon),
}

impl Region {
    /// Box used for hit-testing and capture
    pub fn bounds(&self) -> Rect {
        match self {
            Region::Rectangle(r) => *r,
            Region::Polygon(p) => p.bounds(),
        }
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        match self {
            Region::Polygon(p) => Some(p),
            Region::Rectangle(_) => None,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        match self {
            Region::Rectangle(r) => r.contains(p),
            Region::Polygon(poly) => poly.contains(p),
        }
    }

    /// Same shape fitted into new bounds
    pub fn with_bounds(&self, bounds: Rect) -> Region {
        match self {
            Region::Rectangle(_) => Region::Rectangle(bounds),
            Region::Polygon(p) => Region::Polygon(p.refit(bounds)),
        }
    }
}

/// Owns the overlay's regions and keeps them within limits
#[derive(Debug, Clone)]
pub struct RegionModel {
    main: Region,
    speaker: Option<Region>,
    limits: Limits,
}

impl RegionModel {
    pub fn new(desktop: Rect, config: &RegionConfig) -> Self {
        let limits = Limits::new(desktop, config);
        let main = Region::Rectangle(limits.fit(desktop.inset(config.initial_margin)));
        Self {
            main,
            speaker: None,
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn desktop(&self) -> Rect {
        self.limits.desktop
    }

    pub fn main(&self) -> &Region {
        &self.main
    }

    pub fn get(&self, slot: RegionSlot) -> Option<&Region> {
        match slot {
            RegionSlot::Main => Some(&self.main),
            RegionSlot::Speaker => self.speaker.as_ref(),
        }
    }

    /// Full replacement, as on selection completion
    pub fn replace(&mut self, slot: RegionSlot, region: Region) {
        let region = self.normalize(region);
        tracing::debug!("[REGION] {:?} replaced: {:?}", slot, region.bounds());
        match slot {
            RegionSlot::Main => self.main = region,
            RegionSlot::Speaker => self.speaker = Some(region),
        }
    }

    pub fn clear(&mut self, slot: RegionSlot) -> Result<(), EditError> {
        match slot {
            RegionSlot::Main => Err(EditError::NotClearable(slot)),
            RegionSlot::Speaker => {
                self.speaker = None;
                Ok(())
            }
        }
    }

    /// Resize or move `anchor` by the drag delta and store it in `slot`
    pub fn apply_drag(
        &mut self,
        slot: RegionSlot,
        anchor: &Region,
        zone: HitZone,
        dx: i32,
        dy: i32,
    ) -> Rect {
        let bounds = self.limits.apply(&anchor.bounds(), zone, dx, dy);
        let region = anchor.with_bounds(bounds);
        match slot {
            RegionSlot::Main => self.main = region,
            RegionSlot::Speaker => self.speaker = Some(region),
        }
        bounds
    }

    fn normalize(&self, region: Region) -> Region {
        match region {
            Region::Rectangle(r) => Region::Rectangle(self.limits.fit(r)),
            Region::Polygon(p) => {
                let points: Vec<Point> = p
                    .points()
                    .iter()
                    .map(|pt| self.limits.clamp_point(*pt))
                    .collect();
                match Polygon::new(points) {
                    Some(poly) => {
                        let fitted = self.limits.fit(poly.bounds());
                        if fitted == poly.bounds() {
                            Region::Polygon(poly)
                        } else {
                            Region::Polygon(poly.refit(fitted))
                        }
                    }
                    None => Region::Rectangle(self.limits.fit(p.bounds())),
                }
            }
        }
    }
}

/// Rectangle of the in-region translation band
pub fn text_band_rect(roi: &Rect, margin: i32, ratio: f32) -> Rect {
    let inner = roi.inset(margin);
    let ratio = ratio.clamp(0.12, 0.9);
    let text_h = ((inner.height() as f32 * ratio) as i32).max(60);
    Rect::new(inner.left, inner.bottom - text_h, inner.right, inner.bottom)
}
