//! Modforge Export -- writes finished objects as a modpack and runs the
//! whole conversion.
//!
//! [`convert`] chains every stage: load the game data directory, link,
//! translate, finalize, build the [`Modpack`] and write it. The exporter
//! only sees ready objects; anything left abstract or pointing at a
//! missing object aborts the run before a single file is written.

pub mod exporter;
pub mod modpack;
pub mod render;

pub use exporter::{build_modpack, write_modpack};
pub use modpack::{DataFile, MediaKind, MediaRequest, Modpack};

use modforge_core::linker::{self, LinkError};
use modforge_core::pipeline::{ConvertError, finalize};
use modforge_core::staging::StagingError;
use modforge_data::{DataLoadError, GameData, load_game_data};
use modforge_translate::{TranslateError, translate_all};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("object '{object}' has no output file")]
    MissingFilename { object: String },

    #[error("cannot serialize modpack info: {0}")]
    Info(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What a conversion run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub root: PathBuf,
    pub files: usize,
    pub objects: usize,
    pub media: Vec<MediaRequest>,
}

/// Link, translate and finalize loaded game data into a modpack without
/// touching the file system.
pub fn build(game: GameData) -> Result<Modpack, ExportError> {
    let GameData {
        mut data,
        registry,
        names,
        settings,
    } = game;

    linker::link(&mut data)?;
    translate_all(&mut data, &names)?;
    let symbols = finalize(&mut data, &registry)?;
    build_modpack(&data, &symbols, &registry, &settings)
}

/// Convert the game data in `source_dir` into a modpack below `export_dir`.
pub fn convert(source_dir: &Path, export_dir: &Path) -> Result<ExportSummary, ExportError> {
    let game = load_game_data(source_dir)?;
    let modpack = build(game)?;
    let root = write_modpack(&modpack, export_dir)?;

    let summary = ExportSummary {
        root,
        files: modpack.data_files.len(),
        objects: modpack.object_count(),
        media: modpack.media,
    };
    info!(
        root = %summary.root.display(),
        files = summary.files,
        media = summary.media.len(),
        "conversion complete"
    );
    Ok(summary)
}
