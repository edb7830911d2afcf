//! Modforge Translate -- turns linked record groups into staging objects.
//!
//! Translators read records through the groups built by the linker and
//! attach [`StagingObject`]s to those groups. Cross references between
//! objects are [`DeferredRef`]s, so translation order does not matter.
//!
//! # Translators
//!
//! - [`entity`] -- one game entity per unit, building and villager line,
//!   plus a creatable for every trained line.
//! - [`ability`] -- Create, Idle, Live, ProvideContingent, Research and
//!   ShootProjectile.
//! - [`tech`] -- one tech per tech id, plus a researchable for every tech
//!   with a research time.
//! - [`civ`] -- one civilization object per civ.

pub mod ability;
pub mod catalog;
pub mod civ;
pub mod entity;
pub mod tech;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::Catalog;

use modforge_core::dataset::DataSet;
use modforge_core::id::GroupKey;
use modforge_core::linker::LinkError;
use modforge_core::record::RecordError;
use modforge_core::reference::DeferredRef;
use modforge_core::staging::StagingObject;
use modforge_core::time::TimeError;
use modforge_data::NameTable;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("translator needs group {key}, which does not exist")]
    MissingGroup { key: GroupKey },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Add `object` to group `key` and return a reference to it. An object with
/// the same id is replaced.
pub(crate) fn add_object(
    data: &mut DataSet,
    key: GroupKey,
    object: StagingObject,
) -> Result<DeferredRef, TranslateError> {
    let reference = DeferredRef::new(key, object.id());
    let group = data
        .groups
        .get_mut(key)
        .ok_or(TranslateError::MissingGroup { key })?;
    if group.add_staging_object(object).is_some() {
        warn!(%reference, "replaced staging object");
    }
    Ok(reference)
}

/// Counts of what [`translate_all`] produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateSummary {
    pub entities: usize,
    pub techs: usize,
    pub civs: usize,
    pub objects: usize,
}

/// Run every translator over a linked data set.
pub fn translate_all(data: &mut DataSet, names: &NameTable) -> Result<TranslateSummary, TranslateError> {
    let catalog = Catalog::build(data, names)?;

    for entity in &catalog.entities {
        entity::translate_game_entity(data, &catalog, entity)?;
    }
    for tech in &catalog.techs {
        tech::translate_tech(data, tech)?;
    }
    for civ in &catalog.civs {
        civ::translate_civ(data, &catalog, civ)?;
    }

    let summary = TranslateSummary {
        entities: catalog.entities.len(),
        techs: catalog.techs.len(),
        civs: catalog.civs.len(),
        objects: data.groups.staging_object_count(),
    };
    info!(
        entities = summary.entities,
        techs = summary.techs,
        civs = summary.civs,
        objects = summary.objects,
        "translation complete"
    );
    Ok(summary)
}
