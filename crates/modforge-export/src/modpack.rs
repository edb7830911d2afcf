//! In-memory modpack: info, rendered data files and media requests.

use modforge_data::ConversionSettings;
use serde::Serialize;
use std::collections::BTreeMap;

/// Contents of `modpack.toml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModpackDefinition {
    pub info: ModpackInfo,
    pub assets: AssetInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModpackInfo {
    pub name: String,
    pub version: String,
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetInfo {
    /// Data files in load order, relative to the modpack root.
    pub data: Vec<String>,
    pub media: usize,
}

impl ModpackDefinition {
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// One output file holding one or more top-level objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFile {
    pub directory: String,
    pub filename: String,
    /// Rendered top-level objects in insertion order.
    pub objects: Vec<String>,
}

impl DataFile {
    pub fn new(directory: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            objects: Vec::new(),
        }
    }

    /// Path relative to the modpack root.
    pub fn relative_path(&self) -> String {
        format!("{}{}", self.directory, self.filename)
    }

    pub fn contents(&self) -> String {
        self.objects.join("\n\n") + "\n"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaKind {
    Sprite,
    Sound,
}

/// A media file the converted objects point at. `source_id` is the head
/// graphic or sound id in the source data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub kind: MediaKind,
    pub source_id: i64,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Modpack {
    pub name: String,
    pub version: String,
    pub authors: Vec<String>,
    /// Keyed by relative path so files come out sorted.
    pub data_files: BTreeMap<String, DataFile>,
    pub media: Vec<MediaRequest>,
}

impl Modpack {
    pub fn new(settings: &ConversionSettings) -> Self {
        Self {
            name: settings.modpack_name.clone(),
            version: settings.version.clone(),
            authors: settings.authors.clone(),
            ..Self::default()
        }
    }

    /// The data file at `directory` + `filename`, created on first use.
    pub fn data_file(&mut self, directory: &str, filename: &str) -> &mut DataFile {
        self.data_files
            .entry(format!("{directory}{filename}"))
            .or_insert_with(|| DataFile::new(directory, filename))
    }

    pub fn object_count(&self) -> usize {
        self.data_files.values().map(|f| f.objects.len()).sum()
    }

    pub fn definition(&self) -> ModpackDefinition {
        ModpackDefinition {
            info: ModpackInfo {
                name: self.name.clone(),
                version: self.version.clone(),
                authors: self.authors.clone(),
            },
            assets: AssetInfo {
                data: self.data_files.keys().cloned().collect(),
                media: self.media.len(),
            },
        }
    }
}
