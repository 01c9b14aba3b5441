//! Pack a `.gltf` document and its external files into one self-contained
//! document by rewriting buffer and image URIs as data URIs.

use crate::data_url::{DataUrl, is_data_url};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// glTF inlining errors.
#[derive(Debug, Error)]
pub enum GltfError {
    #[error("glTF JSON is invalid: {0}")]
    InvalidJson(String),
    #[error("Missing buffer: {0} (select the .bin file as well)")]
    MissingBuffer(String),
    #[error("Missing texture: {0} (select the image files as well)")]
    MissingImage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type GltfResult<T> = Result<T, GltfError>;

/// MIME type for a model resource, by extension.
pub fn mime_for(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.ends_with(".png") {
        "image/png"
    } else if name.ends_with(".jpg") || name.ends_with(".jpeg") {
        "image/jpeg"
    } else if name.ends_with(".webp") {
        "image/webp"
    } else if name.ends_with(".gltf") {
        "model/gltf+json"
    } else if name.ends_with(".glb") {
        "model/gltf-binary"
    } else {
        // .bin and anything unknown
        "application/octet-stream"
    }
}

/// Last path segment of a URI.
pub fn base_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => path,
    }
}

pub fn is_gltf_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".gltf")
}

pub fn is_glb_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".glb")
}

/// Percent-decode, or `None` if the result is not valid UTF-8.
fn url_decode(s: &str) -> Option<String> {
    percent_encoding::percent_decode_str(s)
        .decode_utf8()
        .ok()
        .map(|d| d.into_owned())
}

/// A user-provided file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl NamedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text(&self) -> GltfResult<&str> {
        std::str::from_utf8(&self.data).map_err(|e| GltfError::InvalidJson(e.to_string()))
    }
}

/// Files dropped together with a model, indexed by the name variants a
/// glTF URI may use to refer to them.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<NamedFile>,
    index: HashMap<String, usize>,
}

impl FileSet {
    pub fn new(files: Vec<NamedFile>) -> Self {
        let mut set = Self::default();
        for file in files {
            set.insert(file);
        }
        set
    }

    /// Add a file. Later files win when name variants collide.
    pub fn insert(&mut self, file: NamedFile) {
        let idx = self.files.len();
        let name = file.name.clone();
        let lower = name.to_lowercase();

        self.index.insert(name.clone(), idx);
        if let Some(decoded) = url_decode(&name) {
            self.index.insert(decoded, idx);
        }
        self.index.insert(lower.clone(), idx);
        if let Some(decoded) = url_decode(&lower) {
            self.index.insert(decoded, idx);
        }
        self.files.push(file);
    }

    pub fn files(&self) -> &[NamedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<&NamedFile> {
        self.index.get(key).map(|&i| &self.files[i])
    }

    fn lookup_variants(&self, name: &str) -> Option<&NamedFile> {
        let lower = name.to_lowercase();
        self.lookup(name)
            .or_else(|| url_decode(name).and_then(|d| self.lookup(&d)))
            .or_else(|| self.lookup(&lower))
            .or_else(|| url_decode(&lower).and_then(|d| self.lookup(&d)))
    }

    /// Resolve a glTF URI: the full URI first (exact, decoded, lower-cased,
    /// lower-cased and decoded), then the same for its base name.
    pub fn find_for_uri(&self, uri: &str) -> Option<&NamedFile> {
        if uri.is_empty() {
            return None;
        }
        self.lookup_variants(uri)
            .or_else(|| self.lookup_variants(base_name(uri)))
    }
}

#[derive(Clone, Copy)]
enum Resource {
    Buffer,
    Image,
}

impl Resource {
    fn key(self) -> &'static str {
        match self {
            Resource::Buffer => "buffers",
            Resource::Image => "images",
        }
    }

    fn missing(self, uri: &str) -> GltfError {
        match self {
            Resource::Buffer => GltfError::MissingBuffer(uri.to_string()),
            Resource::Image => GltfError::MissingImage(uri.to_string()),
        }
    }
}

fn inline_resources(doc: &mut Value, files: &FileSet, kind: Resource) -> GltfResult<usize> {
    let Some(entries) = doc.get_mut(kind.key()).and_then(Value::as_array_mut) else {
        return Ok(0);
    };

    let mut inlined = 0;
    for entry in entries {
        let Some(uri) = entry.get("uri").and_then(Value::as_str) else {
            continue;
        };
        if uri.is_empty() || is_data_url(uri) {
            continue;
        }
        let file = files.find_for_uri(uri).ok_or_else(|| kind.missing(uri))?;
        log::debug!("Inlining {} as {} ({} bytes)", uri, file.name, file.data.len());
        entry["uri"] = Value::String(DataUrl::encode(mime_for(&file.name), &file.data));
        inlined += 1;
    }
    Ok(inlined)
}

/// Rewrite external buffer and image URIs in `doc` as data URIs. All other
/// fields are left untouched. Returns the number of rewritten URIs.
pub fn inline_document(doc: &mut Value, files: &FileSet) -> GltfResult<usize> {
    let buffers = inline_resources(doc, files, Resource::Buffer)?;
    let images = inline_resources(doc, files, Resource::Image)?;
    log::info!("Inlined {} buffer(s) and {} image(s)", buffers, images);
    Ok(buffers + images)
}

/// Parse glTF JSON text and inline its external resources.
pub fn inline_gltf(text: &str, files: &FileSet) -> GltfResult<Value> {
    let mut doc: Value =
        serde_json::from_str(text).map_err(|e| GltfError::InvalidJson(e.to_string()))?;
    inline_document(&mut doc, files)?;
    Ok(doc)
}

/// Inline and serialize back to a compact JSON string.
pub fn inline_gltf_to_string(text: &str, files: &FileSet) -> GltfResult<String> {
    let doc = inline_gltf(text, files)?;
    serde_json::to_string(&doc).map_err(|e| GltfError::Serialization(e.to_string()))
}

/// Inline and wrap the whole document as a `model/gltf+json` data URL that a
/// viewer can load directly.
pub fn inline_gltf_to_data_url(text: &str, files: &FileSet) -> GltfResult<String> {
    let json = inline_gltf_to_string(text, files)?;
    Ok(DataUrl::encode("model/gltf+json", json.as_bytes()))
}
