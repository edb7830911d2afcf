//! Locating and parsing input files. Every input is found by its stem and
//! may be written as RON, JSON or TOML.

use modforge_core::nyan::NyanError;
use modforge_core::record::RecordError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading game data, API templates, names or
/// settings.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required input '{stem}' not found in {dir}")]
    MissingRequired { stem: String, dir: PathBuf },

    #[error("unsupported input format: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same input exists in more than one format.
    #[error("input given twice: {a} and {b}")]
    AmbiguousInput { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// Two entries of a keyed table share an id.
    #[error("duplicate id {id} in table '{table}'")]
    DuplicateId { table: &'static str, id: i64 },

    /// An entry of a source table could not be turned into a record.
    #[error("entry {index} of table '{table}': {source}")]
    InvalidRecord {
        table: &'static str,
        index: usize,
        source: RecordError,
    },

    /// A template default does not fit the member.
    #[error("invalid default for member '{member}' of template '{template}'")]
    InvalidDefault { template: String, member: String },

    /// Templates whose parents never get registered.
    #[error("templates with unknown parents: {}", .templates.join(", "))]
    UnresolvedTemplates { templates: Vec<String> },

    #[error(transparent)]
    Api(#[from] NyanError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialization format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Json,
    Toml,
}

impl Format {
    const ALL: [Format; 3] = [Format::Ron, Format::Json, Format::Toml];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    pub fn of(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|format| Some(format.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, content: &str, path: &Path) -> Result<T, DataLoadError> {
        let parse_error = |detail: String| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail,
        };
        match self {
            Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
            Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }
}

/// Directory holding the inputs of one conversion run.
#[derive(Debug, Clone, Copy)]
pub struct SourceDir<'a> {
    dir: &'a Path,
}

impl<'a> SourceDir<'a> {
    pub fn new(dir: &'a Path) -> Self {
        Self { dir }
    }

    /// Path of the input called `stem`, if there is one.
    pub fn find(&self, stem: &str) -> Result<Option<PathBuf>, DataLoadError> {
        let mut present = Format::ALL
            .into_iter()
            .map(|format| self.dir.join(format!("{stem}.{}", format.extension())))
            .filter(|path| path.is_file());
        let found = present.next();
        if let (Some(a), Some(b)) = (&found, present.next()) {
            return Err(DataLoadError::AmbiguousInput { a: a.clone(), b });
        }
        Ok(found)
    }

    pub fn require(&self, stem: &str) -> Result<PathBuf, DataLoadError> {
        self.find(stem)?.ok_or_else(|| DataLoadError::MissingRequired {
            stem: stem.to_string(),
            dir: self.dir.to_path_buf(),
        })
    }
}

/// Read and parse one input file.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::of(path)?;
    format.parse(&std::fs::read_to_string(path)?, path)
}

/// Read a list of entries. TOML has no top-level arrays, so there the list
/// is kept under `toml_key`.
pub fn read_list<T: DeserializeOwned>(path: &Path, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
    let format = Format::of(path)?;
    let content = std::fs::read_to_string(path)?;
    if format != Format::Toml {
        return format.parse(&content, path);
    }
    let parse_error = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    let mut table: toml::Table = format.parse(&content, path)?;
    table
        .remove(toml_key)
        .ok_or_else(|| parse_error(format!("missing key '{toml_key}'")))?
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(e.to_string()))
}
