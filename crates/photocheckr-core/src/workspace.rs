//! The live editing session: view state, both annotation surfaces and the
//! tab list, kept in step with each other.

use crate::data_url::image_data_url;
use crate::surface::AnnotationSurface;
use crate::tabs::{Tab, TabError, TabManager, TabResult};
use crate::view::{SingleSource, SurfaceKind, ViewMode, ViewState};

/// Maximum note length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 400;

/// Which photo of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Before,
    After,
}

/// Editing session over a set of comparison tabs.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub title: String,
    description: String,
    view: ViewState,
    main: AnnotationSurface,
    side: AnnotationSurface,
    tabs: TabManager,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a session with one empty tab.
    pub fn new() -> Self {
        let view = ViewState::new();
        let mut tabs = TabManager::new();
        let tab = tabs.create_tab(view.mode(), view.photo_scale());
        tabs.add(tab);
        Self::from_parts(String::new(), view, tabs)
    }

    /// Assemble a session from restored parts. `tabs` must not be empty.
    pub(crate) fn from_parts(title: String, view: ViewState, tabs: TabManager) -> Self {
        Self {
            title,
            description: String::new(),
            view,
            main: AnnotationSurface::default(),
            side: AnnotationSurface::default(),
            tabs,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.active()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the note for the active tab, truncated to the maximum length.
    pub fn set_description(&mut self, text: &str) {
        self.description = text.chars().take(DESCRIPTION_MAX_CHARS).collect();
    }

    /// Label shown above the note field.
    pub fn notes_header(&self) -> String {
        match self.tabs.active() {
            Some(tab) => format!("Notes for {} (max {})", tab.name, DESCRIPTION_MAX_CHARS),
            None => format!("Notes (max {})", DESCRIPTION_MAX_CHARS),
        }
    }

    pub fn set_slider(&mut self, value: i32) {
        self.view.set_slider(value);
    }

    pub fn set_photo_scale(&mut self, value: u32) {
        self.view.set_photo_scale(value);
    }

    pub fn set_single_source(&mut self, source: SingleSource) {
        self.view.set_single_source(source);
    }

    /// Switch view mode. Annotations on both surfaces and all history are
    /// discarded, even when the mode does not change.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view.set_mode(mode);
        self.main.reset();
        self.side.reset();
    }

    /// Resize both surfaces to match the displayed photos.
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.main.set_size(width, height);
        self.side.set_size(width, height);
    }

    // Surfaces

    pub fn surface(&self, kind: SurfaceKind) -> &AnnotationSurface {
        match kind {
            SurfaceKind::Main => &self.main,
            SurfaceKind::Side => &self.side,
        }
    }

    pub fn surface_mut(&mut self, kind: SurfaceKind) -> &mut AnnotationSurface {
        match kind {
            SurfaceKind::Main => &mut self.main,
            SurfaceKind::Side => &mut self.side,
        }
    }

    /// The surface receiving input in the current view mode.
    pub fn active_surface(&self) -> &AnnotationSurface {
        self.surface(self.view.active_surface())
    }

    pub fn active_surface_mut(&mut self) -> &mut AnnotationSurface {
        let kind = self.view.active_surface();
        self.surface_mut(kind)
    }

    pub fn undo(&mut self) -> bool {
        self.active_surface_mut().undo()
    }

    pub fn redo(&mut self) -> bool {
        self.active_surface_mut().redo()
    }

    /// Clear the active surface and its history.
    pub fn clear_annotations(&mut self) {
        self.active_surface_mut().clear();
    }

    // Images

    /// Store an uploaded photo on the active tab as a data URL.
    pub fn load_image(&mut self, slot: ImageSlot, bytes: &[u8], file_name: Option<&str>) {
        let url = image_data_url(bytes, file_name);
        let Some(tab) = self.tabs.active_mut() else {
            log::warn!("No active tab to receive image");
            return;
        };
        log::info!("Loaded {:?} image into {} ({} bytes)", slot, tab.name, bytes.len());
        match slot {
            ImageSlot::Before => tab.before = Some(url),
            ImageSlot::After => tab.after = Some(url),
        }
    }

    /// Whether the active tab has both photos.
    pub fn has_images(&self) -> bool {
        self.tabs.active().is_some_and(Tab::has_images)
    }

    // Tabs

    /// Copy the live session state into the active tab record.
    pub fn serialize_active_tab(&mut self) {
        let main_json = self.surface_json(SurfaceKind::Main);
        let side_json = self.surface_json(SurfaceKind::Side);
        let Some(tab) = self.tabs.active_mut() else {
            return;
        };
        tab.desc = self.description.clone();
        tab.slider = self.view.slider();
        tab.view_mode = self.view.mode();
        tab.photo_scale = self.view.photo_scale();
        if main_json.is_some() {
            tab.canvas_json = main_json;
        }
        if side_json.is_some() {
            tab.canvas_side_json = side_json;
        }
    }

    fn surface_json(&self, kind: SurfaceKind) -> Option<String> {
        match self.surface(kind).to_json() {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Failed to serialize {:?} surface: {}", kind, e);
                None
            }
        }
    }

    /// Load a tab's state into the live session.
    pub fn apply_tab(&mut self, id: &str) -> TabResult<()> {
        let tab = self
            .tabs
            .get(id)
            .cloned()
            .ok_or_else(|| TabError::NotFound(id.to_string()))?;

        self.view.set_photo_scale(tab.photo_scale);
        self.set_view_mode(tab.view_mode);
        self.view.set_slider(tab.slider as i32);
        self.set_description(&tab.desc);

        Self::restore_surface(&mut self.main, tab.canvas_json.as_deref());
        Self::restore_surface(&mut self.side, tab.canvas_side_json.as_deref());
        log::debug!("Applied tab {} ({})", tab.name, tab.id);
        Ok(())
    }

    /// Load saved annotations; the loaded state becomes the first undo entry.
    fn restore_surface(surface: &mut AnnotationSurface, json: Option<&str>) {
        surface.reset();
        if let Some(json) = json {
            if let Err(e) = surface.load_json(json) {
                log::warn!("Discarding unreadable annotations: {}", e);
                surface.reset();
            }
        }
        surface.push_undo();
    }

    /// Switch to another tab, saving the current one first.
    pub fn select_tab(&mut self, id: &str) -> TabResult<bool> {
        if self.tabs.active_id() == Some(id) {
            return Ok(false);
        }
        if self.tabs.get(id).is_none() {
            return Err(TabError::NotFound(id.to_string()));
        }
        self.serialize_active_tab();
        self.tabs.select(id)?;
        self.apply_tab(id)?;
        Ok(true)
    }

    /// Save the current tab, then add and activate a fresh one.
    pub fn add_tab(&mut self) -> String {
        self.serialize_active_tab();
        let tab = self
            .tabs
            .create_tab(self.view.mode(), self.view.photo_scale());
        let id = self.tabs.add(tab);
        if let Err(e) = self.apply_tab(&id) {
            log::error!("New tab could not be applied: {}", e);
        }
        id
    }

    pub fn rename_tab(&mut self, id: &str, name: &str) -> TabResult<bool> {
        self.tabs.rename(id, name)
    }

    /// Remove a tab; if it was active, the neighbour it falls back to is
    /// applied.
    pub fn remove_tab(&mut self, id: &str) -> TabResult<()> {
        if let Some(next) = self.tabs.remove(id)? {
            self.apply_tab(&next)?;
        }
        Ok(())
    }
}
