//! Error and success banners.
//!
//! The two banners are mutually exclusive and hide themselves after a dwell
//! time. Time is passed in explicitly (seconds, as egui reports it) so the
//! notifier stays a plain value.

use crate::config::BANNER_DWELL_SECS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

#[derive(Clone, Debug, Default)]
struct BannerSlot {
    text: String,
    visible: bool,
    hide_at: f64,
}

impl BannerSlot {
    fn show(&mut self, text: String, hide_at: f64) {
        self.text = text;
        self.visible = true;
        self.hide_at = hide_at;
    }
}

#[derive(Clone, Debug)]
pub struct BannerNotifier {
    dwell: f64,
    error: BannerSlot,
    success: BannerSlot,
}

impl Default for BannerNotifier {
    fn default() -> Self {
        BannerNotifier::new(BANNER_DWELL_SECS)
    }
}

impl BannerNotifier {
    pub fn new(dwell: f64) -> BannerNotifier {
        BannerNotifier {
            dwell,
            error: BannerSlot::default(),
            success: BannerSlot::default(),
        }
    }

    pub fn show_error(&mut self, text: impl Into<String>, now: f64) {
        let text = text.into();
        log::warn!("{text}");
        self.error.show(text, now + self.dwell);
        self.success.visible = false;
    }

    pub fn show_success(&mut self, text: impl Into<String>, now: f64) {
        let text = text.into();
        log::info!("{text}");
        self.success.show(text, now + self.dwell);
        self.error.visible = false;
    }

    pub fn hide_all(&mut self) {
        self.error.visible = false;
        self.success.visible = false;
    }

    /// Expire banners whose deadline has passed. Each show replaces the
    /// deadline, so an earlier banner's timer cannot hide a later one.
    pub fn tick(&mut self, now: f64) {
        for slot in [&mut self.error, &mut self.success] {
            if slot.visible && now >= slot.hide_at {
                slot.visible = false;
            }
        }
    }

    /// The banner currently on screen, if any.
    pub fn visible(&self) -> Option<(BannerKind, &str)> {
        if self.error.visible {
            Some((BannerKind::Error, &self.error.text))
        } else if self.success.visible {
            Some((BannerKind::Success, &self.success.text))
        } else {
            None
        }
    }

    pub fn is_visible(&self, kind: BannerKind) -> bool {
        match kind {
            BannerKind::Error => self.error.visible,
            BannerKind::Success => self.success.visible,
        }
    }

    /// Seconds until the next banner hides, for scheduling a repaint.
    pub fn time_to_next_hide(&self, now: f64) -> Option<f64> {
        [&self.error, &self.success]
            .into_iter()
            .filter(|slot| slot.visible)
            .map(|slot| (slot.hide_at - now).max(0.0))
            .reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_are_mutually_exclusive() {
        let mut banners = BannerNotifier::default();
        banners.show_error("bad", 0.0);
        banners.show_success("good", 0.1);
        assert_eq!(banners.visible(), Some((BannerKind::Success, "good")));
        assert!(!banners.is_visible(BannerKind::Error));
    }

    #[test]
    fn banner_hides_after_dwell() {
        let mut banners = BannerNotifier::default();
        banners.show_success("done", 10.0);
        banners.tick(14.4);
        assert!(banners.is_visible(BannerKind::Success));
        banners.tick(14.5);
        assert_eq!(banners.visible(), None);
    }

    #[test]
    fn later_banner_restarts_the_timer() {
        let mut banners = BannerNotifier::default();
        banners.show_error("first", 0.0);
        banners.show_error("second", 3.0);
        banners.tick(4.5);
        assert_eq!(banners.visible(), Some((BannerKind::Error, "second")));
        banners.tick(7.5);
        assert_eq!(banners.visible(), None);
    }

    #[test]
    fn next_hide_tracks_visible_banner() {
        let mut banners = BannerNotifier::new(2.0);
        assert_eq!(banners.time_to_next_hide(0.0), None);
        banners.show_success("ok", 1.0);
        assert_eq!(banners.time_to_next_hide(1.5), Some(1.5));
    }
}
