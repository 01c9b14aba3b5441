//! Comparison view modes and the slider/scale rules that go with them.

use serde::{Deserialize, Serialize};

/// Photo scale steps in percent.
pub const PHOTO_SCALE_STEPS: [u32; 3] = [75, 100, 125];

/// Scale at which the comparison switches to the wide layout.
pub const WIDE_VIEW_SCALE: u32 = 125;

pub const DEFAULT_SLIDER: u8 = 50;
pub const DEFAULT_PHOTO_SCALE: u32 = 100;

/// How the before/after pair is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// After image wiped over the before image.
    #[default]
    Slider,
    SideBySide,
    /// One image at a time.
    Single,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Slider => "Slider",
            ViewMode::SideBySide => "Side by side",
            ViewMode::Single => "Single",
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slider" => Ok(ViewMode::Slider),
            "sidebyside" | "side-by-side" | "side" => Ok(ViewMode::SideBySide),
            "single" => Ok(ViewMode::Single),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

/// Which image the single view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SingleSource {
    #[default]
    Before,
    After,
}

impl std::str::FromStr for SingleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(SingleSource::Before),
            "after" => Ok(SingleSource::After),
            other => Err(format!("unknown image source: {}", other)),
        }
    }
}

/// The two annotation surfaces. Slider and single share the main one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Main,
    Side,
}

/// Which images are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleImages {
    pub before: bool,
    pub after: bool,
}

/// Opacity of the "before"/"after" corner badges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeOpacity {
    pub before: f32,
    pub after: f32,
}

/// Presentation state of the comparison area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    mode: ViewMode,
    single_source: SingleSource,
    slider: u8,
    photo_scale: u32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Slider,
            single_source: SingleSource::Before,
            slider: DEFAULT_SLIDER,
            photo_scale: DEFAULT_PHOTO_SCALE,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch mode. Returns false if the mode was already active.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if self.mode == mode {
            return false;
        }
        log::debug!("View mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        true
    }

    /// Surface that receives drawing input in the current mode.
    pub fn active_surface(&self) -> SurfaceKind {
        match self.mode {
            ViewMode::SideBySide => SurfaceKind::Side,
            ViewMode::Slider | ViewMode::Single => SurfaceKind::Main,
        }
    }

    pub fn single_source(&self) -> SingleSource {
        self.single_source
    }

    pub fn set_single_source(&mut self, source: SingleSource) {
        self.single_source = source;
    }

    pub fn slider(&self) -> u8 {
        self.slider
    }

    /// Set the slider position, clamped to 0..=100.
    pub fn set_slider(&mut self, value: i32) {
        self.slider = value.clamp(0, 100) as u8;
    }

    /// Right inset (percent) that clips the after image in slider mode.
    pub fn after_clip_inset(&self) -> Option<u8> {
        match self.mode {
            ViewMode::Slider => Some(100 - self.slider),
            _ => None,
        }
    }

    /// Badges dim when the slider nearly covers their image.
    pub fn badge_opacity(&self) -> BadgeOpacity {
        BadgeOpacity {
            before: if self.slider > 10 { 1.0 } else { 0.3 },
            after: if self.slider < 90 { 1.0 } else { 0.3 },
        }
    }

    pub fn photo_scale(&self) -> u32 {
        self.photo_scale
    }

    /// Set the photo scale, snapping to the nearest step.
    pub fn set_photo_scale(&mut self, value: u32) {
        self.photo_scale = snap_photo_scale(value);
    }

    pub fn is_wide_view(&self) -> bool {
        self.photo_scale >= WIDE_VIEW_SCALE
    }

    pub fn visible_images(&self) -> VisibleImages {
        match self.mode {
            ViewMode::Slider | ViewMode::SideBySide => VisibleImages {
                before: true,
                after: true,
            },
            ViewMode::Single => VisibleImages {
                before: self.single_source == SingleSource::Before,
                after: self.single_source == SingleSource::After,
            },
        }
    }
}

/// Nearest photo scale step; ties go to the smaller step.
pub fn snap_photo_scale(value: u32) -> u32 {
    let mut best = PHOTO_SCALE_STEPS[0];
    for step in PHOTO_SCALE_STEPS {
        if value.abs_diff(step) < value.abs_diff(best) {
            best = step;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_surface() {
        let mut view = ViewState::new();
        assert_eq!(view.active_surface(), SurfaceKind::Main);
        view.set_mode(ViewMode::SideBySide);
        assert_eq!(view.active_surface(), SurfaceKind::Side);
        view.set_mode(ViewMode::Single);
        assert_eq!(view.active_surface(), SurfaceKind::Main);
    }

    #[test]
    fn test_set_mode_reports_change() {
        let mut view = ViewState::new();
        assert!(!view.set_mode(ViewMode::Slider));
        assert!(view.set_mode(ViewMode::Single));
    }

    #[test]
    fn test_slider_clamps() {
        let mut view = ViewState::new();
        view.set_slider(140);
        assert_eq!(view.slider(), 100);
        view.set_slider(-3);
        assert_eq!(view.slider(), 0);
    }

    #[test]
    fn test_clip_inset_only_in_slider_mode() {
        let mut view = ViewState::new();
        view.set_slider(30);
        assert_eq!(view.after_clip_inset(), Some(70));
        view.set_mode(ViewMode::SideBySide);
        assert_eq!(view.after_clip_inset(), None);
    }

    #[test]
    fn test_badge_opacity() {
        let mut view = ViewState::new();
        assert_eq!(view.badge_opacity(), BadgeOpacity { before: 1.0, after: 1.0 });
        view.set_slider(10);
        assert_eq!(view.badge_opacity().before, 0.3);
        view.set_slider(90);
        assert_eq!(view.badge_opacity(), BadgeOpacity { before: 1.0, after: 0.3 });
    }

    #[test]
    fn test_snap_photo_scale() {
        assert_eq!(snap_photo_scale(0), 75);
        assert_eq!(snap_photo_scale(87), 75);
        assert_eq!(snap_photo_scale(88), 100);
        assert_eq!(snap_photo_scale(112), 100);
        assert_eq!(snap_photo_scale(113), 125);
        assert_eq!(snap_photo_scale(400), 125);
    }

    #[test]
    fn test_wide_view() {
        let mut view = ViewState::new();
        assert!(!view.is_wide_view());
        view.set_photo_scale(130);
        assert!(view.is_wide_view());
    }

    #[test]
    fn test_visible_images_in_single_mode() {
        let mut view = ViewState::new();
        view.set_mode(ViewMode::Single);
        view.set_single_source(SingleSource::After);
        assert_eq!(view.visible_images(), VisibleImages { before: false, after: true });
    }

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!("sideBySide".parse::<ViewMode>(), Ok(ViewMode::SideBySide));
        assert_eq!("single".parse::<ViewMode>(), Ok(ViewMode::Single));
        assert!("grid".parse::<ViewMode>().is_err());
        assert_eq!("After".parse::<SingleSource>(), Ok(SingleSource::After));
    }

    #[test]
    fn test_view_mode_serde_names() {
        assert_eq!(serde_json::to_string(&ViewMode::SideBySide).unwrap(), "\"sideBySide\"");
    }
}
