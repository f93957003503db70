use std::time::{Duration, Instant};

/// Window that can be pushed back above other windows
pub trait TopmostWindow: Send {
    fn raise(&self) -> anyhow::Result<()>;
}

/// Stand-in for runs without a native overlay window
#[derive(Default)]
pub struct HeadlessWindow;

impl TopmostWindow for HeadlessWindow {
    fn raise(&self) -> anyhow::Result<()> {
        tracing::trace!("[TOPMOST] raise");
        Ok(())
    }
}

/// Re-asserts topmost placement at a fixed interval
pub struct VisibilityEnforcer {
    interval: Duration,
    last: Option<Instant>,
}

impl VisibilityEnforcer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Raise `window` if the interval has elapsed; returns true if it did
    pub fn tick(&mut self, now: Instant, window: &dyn TopmostWindow) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        if let Err(e) = window.raise() {
            tracing::warn!("[TOPMOST] Failed to raise overlay: {}", e);
        }
        true
    }
}
