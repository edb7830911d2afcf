//! Civilizations.

use crate::catalog::{Catalog, CivEntry};
use crate::{TranslateError, add_object};
use modforge_core::dataset::DataSet;
use modforge_core::reference::DeferredRef;
use modforge_core::staging::StagingObject;
use tracing::warn;

pub const CIVILIZATION: &str = "engine.aux.civilization.Civilization";

/// Translate a civilization. Bonuses point at the civ's techs, unique
/// units at the game entities of its unique lines.
pub fn translate_civ(
    data: &mut DataSet,
    catalog: &Catalog,
    civ: &CivEntry,
) -> Result<DeferredRef, TranslateError> {
    let mut bonuses = Vec::with_capacity(civ.civ_bonuses.len());
    for &tech_id in &civ.civ_bonuses {
        match catalog.tech(tech_id) {
            Some(tech) => bonuses.push(tech.reference()),
            None => warn!(civ = civ.civ_id, tech = tech_id, "civ bonus without tech group"),
        }
    }
    let unique_units: Vec<DeferredRef> = civ
        .unique_lines
        .iter()
        .filter_map(|key| catalog.entity(*key))
        .map(|entity| entity.reference())
        .collect();

    let mut object = StagingObject::new(
        civ.name.name.as_str(),
        civ.name.name.as_str(),
        civ.directory().as_str(),
    );
    object.set_filename(&civ.name.filename);
    object.add_raw_parent(CIVILIZATION);
    object.add_raw_member("civ_bonuses", bonuses, CIVILIZATION);
    object.add_raw_member("unique_units", unique_units, CIVILIZATION);
    add_object(data, civ.key, object)
}
