//! What is on screen, independent of how it is drawn.

use egui::CursorIcon;

/// Visibility flags per screen region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    /// Placeholder shown in the result area before any composite exists.
    pub empty_state: bool,
    pub tryon_loading: bool,
    pub tryon_result: bool,
    pub video_loading: bool,
    pub video_result: bool,
    pub tryon_button_enabled: bool,
    pub video_button_enabled: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            empty_state: true,
            tryon_loading: false,
            tryon_result: false,
            video_loading: false,
            video_result: false,
            tryon_button_enabled: false,
            video_button_enabled: false,
        }
    }
}

/// How an action control looks given whether it can be used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionAffordance {
    pub enabled: bool,
    pub opacity: f32,
    pub cursor: CursorIcon,
}

impl ActionAffordance {
    pub fn new(enabled: bool) -> ActionAffordance {
        if enabled {
            ActionAffordance {
                enabled,
                opacity: 1.0,
                cursor: CursorIcon::PointingHand,
            }
        } else {
            ActionAffordance {
                enabled,
                opacity: 0.5,
                cursor: CursorIcon::NotAllowed,
            }
        }
    }
}

/// Stand-in for a media element: a source and a reload counter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoPlayer {
    source: Option<String>,
    loads: u32,
}

impl VideoPlayer {
    pub fn set_source(&mut self, url: impl Into<String>) {
        self.source = Some(url.into());
    }

    /// Pick up the current source.
    pub fn load(&mut self) {
        self.loads += 1;
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn load_count(&self) -> u32 {
        self.loads
    }
}
