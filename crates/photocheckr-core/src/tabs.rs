//! Comparison pages ("tabs") and the manager that keeps them ordered.

use crate::view::{DEFAULT_PHOTO_SCALE, DEFAULT_SLIDER, ViewMode};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Tab errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(String),
    #[error("At least one tab must remain")]
    LastTab,
}

pub type TabResult<T> = Result<T, TabError>;

/// One before/after comparison with its note and annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub name: String,
    /// Before image as a data URL.
    #[serde(default)]
    pub before: Option<String>,
    /// After image as a data URL.
    #[serde(default)]
    pub after: Option<String>,
    /// Note text.
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_slider", deserialize_with = "slider_value")]
    pub slider: u8,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default = "default_photo_scale")]
    pub photo_scale: u32,
    /// Serialized main surface (slider and single view).
    #[serde(default, alias = "canvasJSON", deserialize_with = "surface_json")]
    pub canvas_json: Option<String>,
    /// Serialized side-by-side surface.
    #[serde(default, alias = "canvasSideJSON", deserialize_with = "surface_json")]
    pub canvas_side_json: Option<String>,
}

pub(crate) fn default_slider() -> u8 {
    DEFAULT_SLIDER
}

pub(crate) fn default_photo_scale() -> u32 {
    DEFAULT_PHOTO_SCALE
}

/// Accept the slider as a number or a numeric string (older saves stored the
/// raw input value).
pub(crate) fn slider_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse::<f64>().unwrap_or(DEFAULT_SLIDER as f64),
    };
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

/// Accept a surface as a JSON string or as an inline JSON object (browser
/// saves embed the canvas object). Objects are kept as their JSON text.
pub(crate) fn surface_json<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(json)) => Some(json),
        Some(value) => {
            log::debug!("Surface stored inline as {}", json_kind(&value));
            Some(value.to_string())
        }
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Object(_) => "object",
        serde_json::Value::Array(_) => "array",
        _ => "scalar",
    }
}

impl Tab {
    /// Fresh tab inheriting the current view mode and photo scale.
    pub fn new(name: impl Into<String>, view_mode: ViewMode, photo_scale: u32) -> Self {
        Self {
            id: format!("t{}", Uuid::new_v4().simple()),
            name: name.into(),
            before: None,
            after: None,
            desc: String::new(),
            slider: DEFAULT_SLIDER,
            view_mode,
            photo_scale,
            canvas_json: None,
            canvas_side_json: None,
        }
    }

    pub fn has_images(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }

    /// Whether the tab has anything worth exporting.
    pub fn has_any_image(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }
}

/// Ordered tabs with exactly one active selection once populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabManager {
    tabs: Vec<Tab>,
    active_id: Option<String>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted tabs. Falls back to the first tab when the
    /// saved active id no longer exists.
    pub fn from_tabs(tabs: Vec<Tab>, active_id: Option<String>) -> Self {
        let active_id = active_id
            .filter(|id| tabs.iter().any(|t| &t.id == id))
            .or_else(|| tabs.first().map(|t| t.id.clone()));
        Self { tabs, active_id }
    }

    /// Default name for the next tab.
    pub fn new_tab_name(&self) -> String {
        format!("Comparison {}", self.tabs.len() + 1)
    }

    /// Create (but don't insert) a tab with the next default name.
    pub fn create_tab(&self, view_mode: ViewMode, photo_scale: u32) -> Tab {
        Tab::new(self.new_tab_name(), view_mode, photo_scale)
    }

    /// Append a tab and make it active.
    pub fn add(&mut self, tab: Tab) -> String {
        let id = tab.id.clone();
        log::info!("Added tab {} ({})", tab.name, id);
        self.tabs.push(tab);
        self.active_id = Some(id.clone());
        id
    }

    /// Rename a tab. Blank names are ignored.
    pub fn rename(&mut self, id: &str, name: &str) -> TabResult<bool> {
        let tab = self.get_mut(id).ok_or_else(|| TabError::NotFound(id.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        tab.name = name.to_string();
        Ok(true)
    }

    /// Remove a tab. When the active tab goes, the one before it (or the
    /// first) becomes active and its id is returned.
    pub fn remove(&mut self, id: &str) -> TabResult<Option<String>> {
        let index = self
            .tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TabError::NotFound(id.to_string()))?;
        if self.tabs.len() <= 1 {
            return Err(TabError::LastTab);
        }

        let removed = self.tabs.remove(index);
        log::info!("Removed tab {} ({})", removed.name, removed.id);

        if self.active_id.as_deref() == Some(id) {
            let next = self.tabs[index.saturating_sub(1)].id.clone();
            self.active_id = Some(next.clone());
            return Ok(Some(next));
        }
        Ok(None)
    }

    /// Activate a tab. Returns false when it was already active.
    pub fn select(&mut self, id: &str) -> TabResult<bool> {
        if !self.tabs.iter().any(|t| t.id == id) {
            return Err(TabError::NotFound(id.to_string()));
        }
        if self.active_id.as_deref() == Some(id) {
            return Ok(false);
        }
        self.active_id = Some(id.to_string());
        Ok(true)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Tab> {
        let id = self.active_id.as_deref()?;
        self.get(id)
    }

    pub fn active_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active_id.clone()?;
        self.get_mut(&id)
    }

    pub fn get(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(n: usize) -> TabManager {
        let mut manager = TabManager::new();
        for _ in 0..n {
            let tab = manager.create_tab(ViewMode::Slider, 100);
            manager.add(tab);
        }
        manager
    }

    #[test]
    fn test_default_names() {
        let manager = manager_with(2);
        let names: Vec<_> = manager.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Comparison 1", "Comparison 2"]);
        assert_eq!(manager.new_tab_name(), "Comparison 3");
    }

    #[test]
    fn test_new_tab_defaults() {
        let manager = TabManager::new();
        let tab = manager.create_tab(ViewMode::SideBySide, 125);
        assert!(tab.id.starts_with('t'));
        assert_eq!(tab.slider, 50);
        assert_eq!(tab.view_mode, ViewMode::SideBySide);
        assert_eq!(tab.photo_scale, 125);
        assert!(tab.canvas_json.is_none());
        assert!(tab.canvas_side_json.is_none());
    }

    #[test]
    fn test_add_activates() {
        let manager = manager_with(3);
        assert_eq!(manager.active_id(), Some(manager.tabs()[2].id.as_str()));
    }

    #[test]
    fn test_rename_trims_and_ignores_blank() {
        let mut manager = manager_with(1);
        let id = manager.tabs()[0].id.clone();
        assert_eq!(manager.rename(&id, "  Kitchen  "), Ok(true));
        assert_eq!(manager.get(&id).unwrap().name, "Kitchen");
        assert_eq!(manager.rename(&id, "   "), Ok(false));
        assert_eq!(manager.get(&id).unwrap().name, "Kitchen");
        assert!(matches!(manager.rename("nope", "x"), Err(TabError::NotFound(_))));
    }

    #[test]
    fn test_cannot_remove_last_tab() {
        let mut manager = manager_with(1);
        let id = manager.tabs()[0].id.clone();
        assert_eq!(manager.remove(&id), Err(TabError::LastTab));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_remove_active_selects_previous() {
        let mut manager = manager_with(3);
        let ids: Vec<_> = manager.iter().map(|t| t.id.clone()).collect();

        // Active is the last tab; removing it selects the middle one.
        assert_eq!(manager.remove(&ids[2]), Ok(Some(ids[1].clone())));

        // Removing the first (active) tab selects the new first one.
        manager.select(&ids[0]).unwrap();
        assert_eq!(manager.remove(&ids[0]), Ok(Some(ids[1].clone())));
        assert_eq!(manager.active_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn test_remove_inactive_keeps_selection() {
        let mut manager = manager_with(3);
        let ids: Vec<_> = manager.iter().map(|t| t.id.clone()).collect();
        assert_eq!(manager.remove(&ids[0]), Ok(None));
        assert_eq!(manager.active_id(), Some(ids[2].as_str()));
    }

    #[test]
    fn test_select() {
        let mut manager = manager_with(2);
        let ids: Vec<_> = manager.iter().map(|t| t.id.clone()).collect();
        assert_eq!(manager.select(&ids[1]), Ok(false));
        assert_eq!(manager.select(&ids[0]), Ok(true));
        assert!(manager.select("missing").is_err());
    }

    #[test]
    fn test_from_tabs_repairs_active_id() {
        let manager = manager_with(2);
        let tabs = manager.tabs().to_vec();
        let first = tabs[0].id.clone();
        let restored = TabManager::from_tabs(tabs, Some("gone".to_string()));
        assert_eq!(restored.active_id(), Some(first.as_str()));
    }

    #[test]
    fn test_slider_accepts_string() {
        let json = r#"{"id":"t1","name":"A","slider":"35","viewMode":"single"}"#;
        let tab: Tab = serde_json::from_str(json).unwrap();
        assert_eq!(tab.slider, 35);
        assert_eq!(tab.view_mode, ViewMode::Single);
        assert_eq!(tab.photo_scale, 100);
    }

    #[test]
    fn test_browser_tab_with_inline_canvas() {
        let json = r#"{
            "id": "t1700000000000abcde",
            "name": "Page 1",
            "desc": "",
            "slider": "50",
            "viewMode": "sideBySide",
            "photoScale": 100,
            "canvasJSON": {"version": "5.3.0", "objects": []},
            "canvasSideJSON": null
        }"#;
        let tab: Tab = serde_json::from_str(json).unwrap();
        let canvas: serde_json::Value =
            serde_json::from_str(tab.canvas_json.as_deref().unwrap()).unwrap();
        assert_eq!(canvas["version"], "5.3.0");
        assert!(tab.canvas_side_json.is_none());
        assert_eq!(tab.view_mode, ViewMode::SideBySide);
    }

    #[test]
    fn test_surface_string_kept_verbatim() {
        let json = r#"{"id":"t1","name":"A","canvasJson":"{\"width\":1}"}"#;
        let tab: Tab = serde_json::from_str(json).unwrap();
        assert_eq!(tab.canvas_json.as_deref(), Some(r#"{"width":1}"#));
    }
}
