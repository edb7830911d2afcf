//! Tech classification.
//!
//! Every tech connection becomes either an age upgrade or a stat upgrade.
//! Unit and building connections that need research produce unlock and
//! line-upgrade groups keyed by the researched tech. Techs bound to a
//! civilization additionally produce a civilization bonus group.

use crate::connection::{Connection, ConnectionTag, LineMode};
use crate::dataset::DataSet;
use crate::group::{GroupKind, RecordGroup};
use crate::id::GroupKey;
use crate::linker::LinkError;
use tracing::{debug, info, warn};

/// Tech type flag of age transitions.
pub const AGE_TRANSITION: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechClass {
    StatUpgrade,
    AgeUpgrade { age_id: i64 },
    UnitLineUpgrade { line_id: i64, upgrade_target: i64 },
    BuildingLineUpgrade { line_id: i64, upgrade_target: i64 },
    UnitUnlock { line_id: i64 },
    BuildingUnlock { line_id: i64 },
    CivBonus { civ_id: i64 },
}

impl TechClass {
    pub fn name(&self) -> &'static str {
        match self {
            TechClass::StatUpgrade => "stat upgrade",
            TechClass::AgeUpgrade { .. } => "age upgrade",
            TechClass::UnitLineUpgrade { .. } => "unit line upgrade",
            TechClass::BuildingLineUpgrade { .. } => "building line upgrade",
            TechClass::UnitUnlock { .. } => "unit unlock",
            TechClass::BuildingUnlock { .. } => "building unlock",
            TechClass::CivBonus { .. } => "civ bonus",
        }
    }

    /// Key of the group holding a tech of this class. Each class has its
    /// own namespace, so one tech can be e.g. both a stat upgrade and a
    /// civ bonus.
    pub fn group_key(&self, tech_id: i64) -> GroupKey {
        match self {
            TechClass::StatUpgrade | TechClass::AgeUpgrade { .. } => GroupKey::Tech(tech_id),
            TechClass::UnitLineUpgrade { .. } => GroupKey::UnitUpgrade(tech_id),
            TechClass::BuildingLineUpgrade { .. } => GroupKey::BuildingUpgrade(tech_id),
            TechClass::UnitUnlock { .. } => GroupKey::UnitUnlock(tech_id),
            TechClass::BuildingUnlock { .. } => GroupKey::BuildingUnlock(tech_id),
            TechClass::CivBonus { .. } => GroupKey::CivBonus(tech_id),
        }
    }
}

/// A tech and its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct TechGroup {
    pub tech_id: i64,
    pub class: TechClass,
    /// `None` when the tech has no bundle or the bundle does not exist.
    pub effect_bundle: Option<i64>,
    pub effect_count: usize,
    pub research_time: i64,
    pub civilization_id: i64,
    pub research_location_id: i64,
}

impl TechGroup {
    /// Classify `tech_id` as `class`. The tech's effect bundle must have
    /// been sanitized.
    pub fn new(tech_id: i64, class: TechClass, data: &DataSet) -> Result<Self, LinkError> {
        let tech = data.tech(tech_id)?;
        let bundle_id = tech.int_or("tech_effect_id", -1)?;

        let (effect_bundle, effect_count) = if bundle_id < 0 {
            (None, 0)
        } else {
            match data.effect_bundles.get(&bundle_id) {
                Some(bundle) if !bundle.is_sanitized() => {
                    return Err(LinkError::UnsanitizedBundle {
                        bundle: bundle_id,
                        tech: tech_id,
                    });
                }
                Some(bundle) => (Some(bundle_id), bundle.effects().len()),
                None => {
                    warn!(tech = tech_id, bundle = bundle_id, "tech points at missing effect bundle");
                    (None, 0)
                }
            }
        };

        Ok(Self {
            tech_id,
            class,
            effect_bundle,
            effect_count,
            research_time: tech.int_or("research_time", 0)?,
            civilization_id: tech.int_or("civilization_id", -1)?,
            research_location_id: tech.int_or("research_location_id", -1)?,
        })
    }

    pub fn key(&self) -> GroupKey {
        self.class.group_key(self.tech_id)
    }

    /// Techs with no research time are applied automatically.
    pub fn is_researchable(&self) -> bool {
        self.research_time > 0
    }

    /// Bound to a single civilization.
    pub fn is_unique(&self) -> bool {
        self.civilization_id > -1
    }

    pub fn civilization(&self) -> Option<i64> {
        self.is_unique().then_some(self.civilization_id)
    }

    /// Building the tech is researched in.
    pub fn research_location(&self) -> Option<i64> {
        self.is_researchable().then_some(self.research_location_id)
    }

    pub fn has_effect(&self) -> bool {
        self.effect_count > 0
    }
}

fn insert_tech(data: &mut DataSet, tech_id: i64, class: TechClass) -> Result<(), LinkError> {
    let tech = TechGroup::new(tech_id, class, data)?;
    data.groups
        .insert(RecordGroup::new(tech.key(), GroupKind::Tech(tech)));
    Ok(())
}

fn classify_tech_connection(connection: &Connection, data: &DataSet) -> Result<TechClass, LinkError> {
    let tech = data.tech(connection.id)?;
    let age_transition = tech.int_or("tech_type", 0)? == AGE_TRANSITION;
    let age_entry = connection.first_with_tag(ConnectionTag::Age);

    if age_transition || connection.line_mode == LineMode::AgeProgress || age_entry.is_some() {
        let entry = age_entry.ok_or(LinkError::MissingAgeTag {
            tech: connection.id,
        })?;
        return Ok(TechClass::AgeUpgrade {
            age_id: entry.other_id,
        });
    }
    Ok(TechClass::StatUpgrade)
}

/// Unlock or line upgrade granted by a unit or building connection.
fn research_class(connection: &Connection, building: bool) -> Option<(i64, TechClass)> {
    if connection.is_initially_available() {
        return None;
    }
    match connection.line_mode {
        LineMode::FirstInLine if connection.enabling_research > -1 => {
            let line_id = connection.line_id;
            let class = if building {
                TechClass::BuildingUnlock { line_id }
            } else {
                TechClass::UnitUnlock { line_id }
            };
            Some((connection.enabling_research, class))
        }
        LineMode::Continuation if connection.required_research > -1 => {
            let line_id = connection.line_id;
            let upgrade_target = connection.id;
            let class = if building {
                TechClass::BuildingLineUpgrade {
                    line_id,
                    upgrade_target,
                }
            } else {
                TechClass::UnitLineUpgrade {
                    line_id,
                    upgrade_target,
                }
            };
            Some((connection.required_research, class))
        }
        _ => None,
    }
}

/// Create all tech groups. Effect bundles must be sanitized first.
pub fn create_tech_groups(data: &mut DataSet) -> Result<(), LinkError> {
    let before = data.groups.len();

    for index in 0..data.tech_connections.len() {
        let connection = &data.tech_connections[index];
        let tech_id = connection.id;
        let class = classify_tech_connection(connection, data)?;
        debug!(tech = tech_id, class = class.name(), "classified tech");
        insert_tech(data, tech_id, class)?;
    }

    let mut research = Vec::new();
    research.extend(
        data.unit_connections
            .iter()
            .filter_map(|c| research_class(c, false)),
    );
    research.extend(
        data.building_connections
            .iter()
            .filter_map(|c| research_class(c, true)),
    );
    for (tech_id, class) in research {
        insert_tech(data, tech_id, class)?;
    }

    let mut bonuses = Vec::new();
    for (tech_id, tech) in data.techs.iter().enumerate() {
        let civ_id = tech.int_or("civilization_id", -1)?;
        if civ_id > -1 {
            bonuses.push((tech_id as i64, civ_id));
        }
    }
    for (tech_id, civ_id) in bonuses {
        insert_tech(data, tech_id, TechClass::CivBonus { civ_id })?;
    }

    info!(groups = data.groups.len() - before, "created tech groups");
    Ok(())
}

/// Sanitize every effect bundle of the data set.
pub fn sanitize_effect_bundles(data: &mut DataSet) -> Result<(), LinkError> {
    for bundle in data.effect_bundles.values_mut() {
        bundle.sanitize()?;
    }
    Ok(())
}
