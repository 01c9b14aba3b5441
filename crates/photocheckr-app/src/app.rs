//! Command execution against a saved project.

use crate::commands::{AddArgs, Command, CommandRegistry};
use crate::config::AppConfig;
use photocheckr_core::gltf::{self, FileSet, GltfError, NamedFile};
use photocheckr_core::model_view::{DualViewer, ModelError, Side};
use photocheckr_core::storage::{FileStorage, Storage, StorageError, load_workspace, save_workspace};
use photocheckr_core::tabs::{Tab, TabError};
use photocheckr_core::workspace::{ImageSlot, Workspace};
use photocheckr_render::{ExportError, ExportOptions, SkiaRenderer, export_pdf, export_png};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Args(#[from] pico_args::Error),
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Gltf(#[from] GltfError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Tab(#[from] TabError),
}

fn read_file(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    fs::write(path, bytes).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn read_named(path: &Path) -> Result<NamedFile, AppError> {
    Ok(NamedFile::new(file_name(path), read_file(path)?))
}

/// Export file stem for `title`, safe to join onto the output directory.
/// Path separators and dots become `_`; spaces are kept.
fn export_stem(title: &str) -> String {
    let file_name = photocheckr_core::export_file_name(title);
    file_name
        .trim_end_matches(".pdf")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn photo_status(tab: &Tab) -> &'static str {
    match (tab.before.is_some(), tab.after.is_some()) {
        (true, true) => "before+after",
        (true, false) => "before only",
        (false, true) => "after only",
        (false, false) => "no photos",
    }
}

/// The command-line application.
pub struct App {
    config: AppConfig,
    storage: Box<dyn Storage>,
}

impl App {
    /// Open the project store named by the configuration.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let storage = match &config.storage_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        log::debug!("Project store at {}", storage.base_path().display());
        Ok(Self::with_storage(config, Box::new(storage)))
    }

    pub fn with_storage(config: AppConfig, storage: Box<dyn Storage>) -> Self {
        Self { config, storage }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load the saved session, or start a fresh one.
    pub fn load(&self) -> Result<Workspace, AppError> {
        let key = &self.config.project_key;
        let mut workspace =
            pollster::block_on(load_workspace(self.storage.as_ref(), key))?.unwrap_or_default();
        if let Some(title) = &self.config.title {
            workspace.title = title.trim().to_string();
        }
        Ok(workspace)
    }

    fn save(&self, workspace: &mut Workspace) -> Result<(), AppError> {
        pollster::block_on(save_workspace(
            self.storage.as_ref(),
            &self.config.project_key,
            workspace,
        ))?;
        Ok(())
    }

    /// Run one command and return what should be printed.
    pub fn run(&self, command: Command) -> Result<String, AppError> {
        match command {
            Command::Add(add) => self.add(add),
            Command::Tabs => Ok(self.list_tabs(&self.load()?)),
            Command::Select { id } => {
                let mut ws = self.load()?;
                ws.select_tab(&id)?;
                self.save(&mut ws)?;
                Ok(format!("Selected {}", id))
            }
            Command::Rename { id, name } => {
                let mut ws = self.load()?;
                if !ws.rename_tab(&id, &name)? {
                    return Ok("Name unchanged".to_string());
                }
                self.save(&mut ws)?;
                Ok(format!("Renamed {} to {}", id, name.trim()))
            }
            Command::Remove { id } => {
                let mut ws = self.load()?;
                ws.remove_tab(&id)?;
                self.save(&mut ws)?;
                Ok(format!("Removed {}", id))
            }
            Command::Export { png } => self.export(png),
            Command::InlineGltf {
                main,
                files,
                output,
            } => self.inline_gltf(&main, &files, output),
            Command::Models { left, right } => self.models(&left, &right),
            Command::Help => Ok(CommandRegistry::usage()),
        }
    }

    fn add(&self, add: AddArgs) -> Result<String, AppError> {
        let before = read_file(&add.before)?;
        let after = read_file(&add.after)?;

        let mut ws = self.load()?;
        if ws.active_tab().is_some_and(Tab::has_any_image) {
            ws.add_tab();
        }
        if let Some(mode) = add.mode {
            ws.set_view_mode(mode);
        }
        if let Some(slider) = add.slider {
            ws.set_slider(slider);
        }
        if let Some(source) = add.source {
            ws.set_single_source(source);
        }
        if let Some(scale) = add.scale {
            ws.set_photo_scale(scale);
        }
        if let Some(notes) = &add.notes {
            ws.set_description(notes);
        }
        ws.load_image(ImageSlot::Before, &before, Some(&file_name(&add.before)));
        ws.load_image(ImageSlot::After, &after, Some(&file_name(&add.after)));

        let id = ws
            .tabs()
            .active_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::Usage("No active comparison".to_string()))?;
        if let Some(name) = &add.name {
            ws.rename_tab(&id, name)?;
        }
        self.save(&mut ws)?;

        let name = ws.active_tab().map(|t| t.name.clone()).unwrap_or_default();
        Ok(format!("Added {} ({})", name, id))
    }

    fn list_tabs(&self, ws: &Workspace) -> String {
        let active = ws.tabs().active_id();
        let mut out = String::new();
        if !ws.title.is_empty() {
            out.push_str(&format!("{}\n", ws.title));
        }
        for tab in ws.tabs().iter() {
            let marker = if Some(tab.id.as_str()) == active { '*' } else { ' ' };
            out.push_str(&format!(
                "{} {}  {}  [{}, {}]\n",
                marker,
                tab.id,
                tab.name,
                tab.view_mode.label(),
                photo_status(tab)
            ));
        }
        out
    }

    fn output_dir(&self) -> Result<&Path, AppError> {
        let dir = self.config.output_dir.as_path();
        fs::create_dir_all(dir).map_err(|source| AppError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(dir)
    }

    fn export(&self, png: bool) -> Result<String, AppError> {
        let mut ws = self.load()?;
        let mut renderer = SkiaRenderer::new();
        let options = ExportOptions {
            quality: self.config.quality,
        };
        let dir = self.output_dir()?;

        if png {
            let pages = export_png(&mut renderer, &mut ws, options)?;
            let stem = export_stem(&ws.title);
            let mut written = Vec::with_capacity(pages.len());
            for (i, page) in pages.iter().enumerate() {
                let path = dir.join(format!("{}-{}.png", stem, i + 1));
                write_file(&path, &page.bytes)?;
                written.push(path.display().to_string());
            }
            return Ok(format!("Wrote {}", written.join(", ")));
        }

        let export = export_pdf(&mut renderer, &mut ws, options)?;
        let path = dir.join(format!("{}.pdf", export_stem(&ws.title)));
        write_file(&path, &export.bytes)?;
        Ok(format!(
            "Wrote {} ({} page(s))",
            path.display(),
            export.page_count
        ))
    }

    fn inline_gltf(
        &self,
        main: &Path,
        files: &[PathBuf],
        output: Option<PathBuf>,
    ) -> Result<String, AppError> {
        let main_file = read_named(main)?;
        let set = FileSet::new(
            files
                .iter()
                .map(|p| read_named(p))
                .collect::<Result<Vec<_>, _>>()?,
        );
        let json = gltf::inline_gltf_to_string(main_file.text()?, &set)?;
        let output = output.unwrap_or_else(|| main.with_extension("inlined.gltf"));
        write_file(&output, json.as_bytes())?;
        Ok(format!("Wrote {}", output.display()))
    }

    fn models(&self, left: &[PathBuf], right: &[PathBuf]) -> Result<String, AppError> {
        let mut viewer = DualViewer::new();
        for (side, paths) in [(Side::Left, left), (Side::Right, right)] {
            if paths.is_empty() {
                continue;
            }
            let files = paths
                .iter()
                .map(|p| read_named(p))
                .collect::<Result<Vec<_>, _>>()?;
            viewer.load_files(side, files)?;
        }

        let both = viewer.pane(Side::Left).source().is_some()
            && viewer.pane(Side::Right).source().is_some();
        if both {
            viewer.set_linked(true);
        }

        let mut out = String::new();
        for (label, side) in [("Left", Side::Left), ("Right", Side::Right)] {
            let pane = viewer.pane(side);
            let kind = pane
                .kind()
                .map(|k| format!("{:?}", k))
                .unwrap_or_else(|| "empty".to_string());
            out.push_str(&format!("{}: [{}] {}\n", label, kind, viewer.meta_line(side)));
        }
        if both {
            out.push_str("Cameras linked\n");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photocheckr_core::storage::MemoryStorage;

    fn app() -> App {
        App::with_storage(AppConfig::default(), Box::new(MemoryStorage::new()))
    }

    #[test]
    fn test_fresh_session_has_one_tab() {
        let out = app().run(Command::Tabs).unwrap();
        assert!(out.contains("Comparison 1"));
        assert!(out.starts_with('*'));
        assert!(out.contains("no photos"));
    }

    #[test]
    fn test_remove_last_tab_fails() {
        let app = app();
        let mut ws = app.load().unwrap();
        app.save(&mut ws).unwrap();
        let id = ws.tabs().active_id().unwrap().to_string();
        let result = app.run(Command::Remove { id });
        assert!(matches!(result, Err(AppError::Tab(TabError::LastTab))));
    }

    #[test]
    fn test_select_unknown_tab() {
        let result = app().run(Command::Select {
            id: "missing".to_string(),
        });
        assert!(matches!(result, Err(AppError::Tab(TabError::NotFound(_)))));
    }

    #[test]
    fn test_missing_photo_file() {
        let result = app().run(Command::Add(AddArgs {
            before: PathBuf::from("/nonexistent/before.jpg"),
            after: PathBuf::from("/nonexistent/after.jpg"),
            ..Default::default()
        }));
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert!(err.to_string().starts_with("/nonexistent/before.jpg"));
    }

    #[test]
    fn test_title_override() {
        let config = AppConfig {
            title: Some("  Kitchen ".to_string()),
            ..Default::default()
        };
        let app = App::with_storage(config, Box::new(MemoryStorage::new()));
        assert_eq!(app.load().unwrap().title, "Kitchen");
    }

    #[test]
    fn test_export_stem_stays_in_output_dir() {
        assert_eq!(export_stem("Front door"), "Front door");
        assert_eq!(export_stem("../evil/x"), "___evil_x");
        assert_eq!(export_stem("a\\b:c"), "a_b_c");
        assert_eq!(export_stem("   "), "PhotoCheckr_Export");
    }

    #[test]
    fn test_help() {
        assert!(app().run(Command::Help).unwrap().contains("Commands:"));
    }
}
