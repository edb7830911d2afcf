//! Reading of conversion inputs: game data tables, API templates, entity
//! names and settings. Every file may be RON, JSON or TOML.

pub mod api;
pub mod extract;
pub mod loader;
pub mod names;
pub mod schema;
pub mod settings;

pub use loader::DataLoadError;
pub use names::{EntityName, NameTable};
pub use settings::ConversionSettings;

use loader::SourceDir;
use modforge_core::dataset::DataSet;
use modforge_core::nyan::ApiRegistry;
use schema::GameSpecData;
use std::path::Path;
use tracing::info;

/// Everything a conversion needs, read from one directory.
#[derive(Debug)]
pub struct GameData {
    pub data: DataSet,
    pub registry: ApiRegistry,
    pub names: NameTable,
    pub settings: ConversionSettings,
}

/// Load `gamedata.*` and `api.*` (required) plus `names.*` and
/// `settings.*` (optional) from `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let source = SourceDir::new(dir);
    let raw: GameSpecData = loader::read_file(&source.require("gamedata")?)?;
    let data = extract::extract(&raw)?;

    let registry = api::load_api(&source.require("api")?)?;

    let names = match source.find("names")? {
        Some(path) => names::load_names(&path)?,
        None => NameTable::new(),
    };
    let settings = match source.find("settings")? {
        Some(path) => settings::load_settings(&path)?,
        None => ConversionSettings::default(),
    };

    info!(
        dir = %dir.display(),
        templates = registry.template_count(),
        names = names.len(),
        "loaded conversion inputs"
    );
    Ok(GameData {
        data,
        registry,
        names,
        settings,
    })
}
