//! Techs and researchables.

use crate::catalog::TechEntry;
use crate::{TranslateError, add_object};
use modforge_core::dataset::DataSet;
use modforge_core::reference::DeferredRef;
use modforge_core::staging::{RawValue, StagingObject};

pub const TECH: &str = "engine.aux.tech.Tech";
pub const RESEARCHABLE_TECH: &str = "engine.aux.research.ResearchableTech";

/// Translate a tech. Effects are not translated into updates, so the tech
/// carries an empty update set.
pub fn translate_tech(data: &mut DataSet, entry: &TechEntry) -> Result<DeferredRef, TranslateError> {
    let mut tech = StagingObject::new(
        entry.name.name.as_str(),
        entry.name.name.as_str(),
        entry.directory().as_str(),
    );
    tech.set_filename(&entry.name.filename);
    tech.add_raw_parent(TECH);
    tech.add_raw_member("updates", Vec::<RawValue>::new(), TECH);
    let reference = add_object(data, entry.key, tech)?;

    if entry.tech.is_researchable() {
        let mut researchable = StagingObject::new(
            entry.nested_id("ResearchableTech"),
            "ResearchableTech",
            reference.clone(),
        );
        researchable.add_raw_parent(RESEARCHABLE_TECH);
        researchable.add_raw_member("tech", reference.clone(), RESEARCHABLE_TECH);
        researchable.add_raw_member(
            "research_time",
            entry.tech.research_time as f64,
            RESEARCHABLE_TECH,
        );
        add_object(data, entry.key, researchable)?;
    }
    Ok(reference)
}
