use std::cell::Cell;

/// Overlay window that can be made transparent for the duration of a grab
pub trait OverlaySurface {
    fn opacity(&self) -> f32;

    fn set_opacity(&self, opacity: f32);

    /// Push pending opacity changes to the compositor
    fn flush(&self) {}
}

/// RAII guard that hides overlay surfaces
///
/// Every surface gets its previous opacity back when the guard is dropped,
/// including on early return or panic.
pub struct HiddenOverlays<'a> {
    saved: Vec<(&'a dyn OverlaySurface, f32)>,
}

impl<'a> HiddenOverlays<'a> {
    pub fn hide(surfaces: &[&'a dyn OverlaySurface]) -> Self {
        let saved: Vec<_> = surfaces.iter().map(|s| (*s, s.opacity())).collect();
        for (surface, _) in &saved {
            surface.set_opacity(0.0);
            surface.flush();
        }
        tracing::trace!("[CAPTURE] Hid {} overlay surface(s)", saved.len());
        Self { saved }
    }

    /// Guard that touches nothing
    pub fn none() -> Self {
        Self { saved: Vec::new() }
    }
}

impl Drop for HiddenOverlays<'_> {
    fn drop(&mut self) {
        for (surface, opacity) in self.saved.drain(..) {
            surface.set_opacity(opacity);
            surface.flush();
        }
    }
}

/// Headless surface that only remembers its opacity
#[derive(Debug)]
pub struct OpacityCell {
    opacity: Cell<f32>,
}

impl OpacityCell {
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: Cell::new(opacity),
        }
    }
}

impl Default for OpacityCell {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl OverlaySurface for OpacityCell {
    fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    fn set_opacity(&self, opacity: f32) {
        self.opacity.set(opacity);
    }
}
