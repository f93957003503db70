use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Events flowing from the input collaborators into the overlay loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Current cursor position, sampled by the input layer
    PointerMoved(Point),
    PointerPressed(Point),
    PointerReleased(Point),
    /// Raw key-state sample for a logical command
    CommandSample {
        command: Command,
        down: bool,
    },
    /// Replace persona hints used by subsequent requests
    SetPersona {
        tone: String,
        speaker: String,
    },
    Shutdown,
}

/// Logical commands the overlay understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Translate,
    Cancel,
    SelectMain,
    SelectSpeaker,
    ClearSpeaker,
    TogglePolygonSelection,
    ConcatAppend,
    ConcatClear,
    ToggleEditMain,
    ToggleEditSpeaker,
    ToggleCaptureMode,
    ToggleHideOnCapture,
    ToggleMainFrame,
    ToggleSpeakerFrame,
    FontSmaller,
    FontLarger,
    AreaSmaller,
    AreaLarger,
    Quit,
}

impl Command {
    /// Parse a console/hotkey name such as `translate` or `edit-main`
    pub fn from_name(name: &str) -> Option<Self> {
        let cmd = match name.trim().to_ascii_lowercase().as_str() {
            "translate" | "t" => Command::Translate,
            "cancel" | "x" => Command::Cancel,
            "select" | "select-main" | "c" => Command::SelectMain,
            "select-speaker" | "s" => Command::SelectSpeaker,
            "clear-speaker" => Command::ClearSpeaker,
            "polygon" => Command::TogglePolygonSelection,
            "append" | "a" => Command::ConcatAppend,
            "clear" | "d" => Command::ConcatClear,
            "edit-main" | "f10" => Command::ToggleEditMain,
            "edit-speaker" | "f11" => Command::ToggleEditSpeaker,
            "capture-mode" | "f5" => Command::ToggleCaptureMode,
            "hide-on-capture" | "f6" => Command::ToggleHideOnCapture,
            "main-frame" | "f8" => Command::ToggleMainFrame,
            "speaker-frame" | "f9" => Command::ToggleSpeakerFrame,
            "font-" | "f1" => Command::FontSmaller,
            "font+" | "f2" => Command::FontLarger,
            "area-" | "f3" => Command::AreaSmaller,
            "area+" | "f4" => Command::AreaLarger,
            "quit" | "exit" => Command::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Which of the overlay's regions an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionSlot {
    /// The area whose text is translated
    Main,
    /// Optional speaker-name/portrait hint area
    Speaker,
}

impl RegionSlot {
    /// Hover and press priority
    pub const ORDER: [RegionSlot; 2] = [RegionSlot::Main, RegionSlot::Speaker];
}

/// Monotonic translation job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
