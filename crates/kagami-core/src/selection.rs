//! Pluggable ways of drawing a new region

use kagami_types::{Point, Rect};

use crate::region::{Limits, Polygon, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    #[default]
    Rectangle,
    Polygon,
}

impl SelectionKind {
    pub fn strategy(self) -> Box<dyn SelectionStrategy> {
        match self {
            SelectionKind::Rectangle => Box::new(RectangleSelection::default()),
            SelectionKind::Polygon => Box::new(PolygonSelection::default()),
        }
    }
}

/// In-progress selection guide for the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPreview {
    Empty,
    Rect(Rect),
    Path(Vec<Point>),
}

/// Turns a press/drag/release sequence into a region
pub trait SelectionStrategy: Send {
    fn begin(&mut self, p: Point);

    fn extend(&mut self, p: Point);

    /// Completed region, or `None` if the gesture produced nothing usable
    fn finish(&mut self, limits: &Limits) -> Option<Region>;

    fn preview(&self) -> SelectionPreview;
}

#[derive(Debug, Default)]
pub struct RectangleSelection {
    start: Option<Point>,
    current: Option<Point>,
}

impl RectangleSelection {
    fn rect(&self) -> Option<Rect> {
        Some(Rect::from_corners(self.start?, self.current?))
    }
}

impl SelectionStrategy for RectangleSelection {
    fn begin(&mut self, p: Point) {
        self.start = Some(p);
        self.current = Some(p);
    }

    fn extend(&mut self, p: Point) {
        if self.start.is_some() {
            self.current = Some(p);
        }
    }

    fn finish(&mut self, limits: &Limits) -> Option<Region> {
        let rect = self.rect()?;
        self.start = None;
        self.current = None;
        if rect.is_empty() {
            return None;
        }
        let rect = rect.intersect(limits.desktop)?;
        Some(Region::Rectangle(limits.fit(rect)))
    }

    fn preview(&self) -> SelectionPreview {
        match self.rect() {
            Some(r) => SelectionPreview::Rect(r),
            None => SelectionPreview::Empty,
        }
    }
}

/// Free-form path; every press and drag sample adds a vertex
#[derive(Debug, Default)]
pub struct PolygonSelection {
    points: Vec<Point>,
}

impl PolygonSelection {
    fn push(&mut self, p: Point) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }
}

impl SelectionStrategy for PolygonSelection {
    fn begin(&mut self, p: Point) {
        self.push(p);
    }

    fn extend(&mut self, p: Point) {
        if !self.points.is_empty() {
            self.push(p);
        }
    }

    fn finish(&mut self, limits: &Limits) -> Option<Region> {
        let points: Vec<Point> = std::mem::take(&mut self.points)
            .into_iter()
            .map(|p| limits.clamp_point(p))
            .collect();
        Polygon::new(points).map(Region::Polygon)
    }

    fn preview(&self) -> SelectionPreview {
        if self.points.is_empty() {
            SelectionPreview::Empty
        } else {
            SelectionPreview::Path(self.points.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagami_config::region::RegionConfig;

    fn limits() -> Limits {
        Limits::new(Rect::new(0, 0, 1000, 800), &RegionConfig::default())
    }

    #[test]
    fn test_rectangle_drag_is_normalized() {
        let mut sel = RectangleSelection::default();
        sel.begin(Point::new(300, 400));
        sel.extend(Point::new(100, 150));
        assert_eq!(sel.preview(), SelectionPreview::Rect(Rect::new(100, 150, 300, 400)));
        let region = sel.finish(&limits()).unwrap();
        assert_eq!(region, Region::Rectangle(Rect::new(100, 150, 300, 400)));
        assert_eq!(sel.preview(), SelectionPreview::Empty);
    }

    #[test]
    fn test_rectangle_click_without_drag_is_ignored() {
        let mut sel = RectangleSelection::default();
        sel.begin(Point::new(300, 400));
        assert!(sel.finish(&limits()).is_none());
    }

    #[test]
    fn test_rectangle_small_drag_grows_to_minimum() {
        let mut sel = RectangleSelection::default();
        sel.begin(Point::new(10, 10));
        sel.extend(Point::new(20, 15));
        let region = sel.finish(&limits()).unwrap();
        assert_eq!(region.bounds(), Rect::new(10, 10, 50, 40));
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let mut sel = PolygonSelection::default();
        sel.begin(Point::new(10, 10));
        sel.extend(Point::new(10, 10));
        sel.extend(Point::new(50, 10));
        assert!(sel.finish(&limits()).is_none());
    }

    #[test]
    fn test_polygon_bounding_box_becomes_region_bounds() {
        let mut sel = PolygonSelection::default();
        sel.begin(Point::new(100, 100));
        sel.extend(Point::new(300, 120));
        sel.extend(Point::new(250, 400));
        sel.extend(Point::new(-20, 300));
        let region = sel.finish(&limits()).unwrap();
        let poly = region.polygon().unwrap();
        assert_eq!(poly.points().len(), 4);
        assert_eq!(region.bounds(), Rect::new(0, 100, 300, 400));
    }
}
