//! The linking engine: rebuilds lines and groups from connection metadata.
//!
//! Linking runs once, after extraction and before any translator:
//!
//! 1. sanitize effect bundles
//! 2. unit lines
//! 3. building lines
//! 4. tech groups
//! 5. civilization groups
//! 6. villager task lines and the villager group
//!
//! Connection tables are walked in source order; a unit's predecessor must
//! appear before it for the line to come out in upgrade order.

use crate::civ::CivGroup;
use crate::connection::ConnectionTag;
use crate::dataset::DataSet;
use crate::group::{GroupKind, LineSequence, RecordGroup};
use crate::id::GroupKey;
use crate::record::{RecordError, RecordKind};
use crate::tech::{TechClass, create_tech_groups, sanitize_effect_bundles};
use tracing::{debug, info};

/// Line id of the monk line.
pub const MONK_LINE: i64 = 65;
/// Unit monks switch to while carrying a relic.
pub const MONK_WITH_RELIC: i64 = 286;
pub const MALE_VILLAGER_LINE: i64 = 83;
pub const FEMALE_VILLAGER_LINE: i64 = 293;
/// Key of the group aggregating all villager task lines.
pub const VILLAGER_GROUP: i64 = 118;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    #[error("unit {unit} is not first in line, but no previous unit can be found in its connections")]
    MissingPredecessor { unit: i64 },

    #[error("tech {tech} is an age transition, but no age id can be found in its connections")]
    MissingAgeTag { tech: i64 },

    #[error("{kind:?} record {id} does not exist")]
    MissingRecord { kind: RecordKind, id: i64 },

    #[error("tech {tech} uses effect bundle {bundle}, which has not been sanitized")]
    UnsanitizedBundle { bundle: i64, tech: i64 },

    #[error("unit {unit} has unknown task group {task_group}")]
    UnknownTaskGroup { unit: i64, task_group: i64 },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Run every linking pass on `data`.
pub fn link(data: &mut DataSet) -> Result<(), LinkError> {
    sanitize_effect_bundles(data)?;
    create_unit_lines(data)?;
    create_building_lines(data)?;
    create_tech_groups(data)?;
    create_civ_groups(data)?;
    create_villager_groups(data)?;
    info!(groups = data.groups.len(), "linking complete");
    Ok(())
}

/// Sort units into lines.
pub fn create_unit_lines(data: &mut DataSet) -> Result<(), LinkError> {
    let mut lines = 0;
    for index in 0..data.unit_connections.len() {
        let connection = &data.unit_connections[index];
        let unit_id = connection.id;
        let line_id = connection.line_id;
        let first_in_line = connection.is_first_in_line();
        let predecessor = connection
            .first_with_tag(ConnectionTag::Unit)
            .map(|entry| entry.other_id);

        let unit = data.unit(unit_id)?;
        let key = GroupKey::UnitLine(line_id);
        if !data.groups.contains_key(key) {
            let line = LineSequence::new(line_id);
            let transform_target = unit.int_or("transform_unit_id", -1)?;
            let kind = if transform_target > -1 {
                GroupKind::UnitTransform {
                    line,
                    head_unit: unit_id,
                    transform_target,
                }
            } else if line_id == MONK_LINE {
                GroupKind::Monk {
                    line,
                    head_unit: unit_id,
                    switch_unit: MONK_WITH_RELIC,
                }
            } else if unit.int_or("task_group", 0)? > 0 {
                // Villagers get their own pass.
                continue;
            } else {
                GroupKind::UnitLine(line)
            };
            data.groups.insert(RecordGroup::new(key, kind));
            lines += 1;
        }

        let Some(line) = data
            .groups
            .get_mut(key)
            .and_then(|group| group.kind_mut().line_mut())
        else {
            continue;
        };
        if first_in_line {
            line.add_front(unit_id);
        } else {
            let predecessor =
                predecessor.ok_or(LinkError::MissingPredecessor { unit: unit_id })?;
            line.insert_after(unit_id, predecessor);
        }
    }
    info!(lines, "created unit lines");
    Ok(())
}

/// Create one group per building. Buildings have no real lines; later
/// stages of a building are found through age upgrades.
pub fn create_building_lines(data: &mut DataSet) -> Result<(), LinkError> {
    let mut lines = 0;
    for index in 0..data.building_connections.len() {
        let building_id = data.building_connections[index].id;
        let building = data.unit(building_id)?;

        // Stacked parts are handled together with their head building.
        if building.int_or("head_unit_id", -1)? > -1 {
            continue;
        }

        let key = GroupKey::BuildingLine(building_id);
        if data.groups.contains_key(key) {
            continue;
        }

        let mut line = LineSequence::new(building_id);
        line.push(building_id);
        let stack_unit = building.int_or("stack_unit_id", -1)?;
        let kind = if stack_unit > -1 {
            GroupKind::StackBuilding { line, stack_unit }
        } else {
            GroupKind::BuildingLine(line)
        };
        data.groups.insert(RecordGroup::new(key, kind));
        lines += 1;
    }
    info!(lines, "created building lines");
    Ok(())
}

/// Create one group per civilization. Runs after tech classification so
/// civ bonuses and unique lines can be attached.
pub fn create_civ_groups(data: &mut DataSet) -> Result<(), LinkError> {
    let mut civs = Vec::with_capacity(data.civs.len());
    for (index, record) in data.civs.iter().enumerate() {
        let mut civ = CivGroup::new(index as i64);
        if record.has_member("name") {
            civ.name = record.get_str("name")?.to_string();
        }
        let tech_tree = record.int_or("tech_tree_id", -1)?;
        civ.tech_tree_bundle = (tech_tree > -1).then_some(tech_tree);
        let team_bonus = record.int_or("team_bonus_id", -1)?;
        civ.team_bonus = (team_bonus > -1).then_some(team_bonus);
        civs.push(civ);
    }

    for (_, group) in data.groups.iter() {
        let Some(tech) = group.kind().tech() else {
            continue;
        };
        match tech.class {
            TechClass::CivBonus { civ_id } => {
                if let Some(civ) = civs.iter_mut().find(|c| c.civ_id == civ_id) {
                    civ.civ_bonuses.push(tech.tech_id);
                }
            }
            TechClass::UnitUnlock { line_id } => {
                if let Some(civ_id) = tech.civilization()
                    && let Some(civ) = civs.iter_mut().find(|c| c.civ_id == civ_id)
                {
                    civ.unique_lines.push(GroupKey::UnitLine(line_id));
                }
            }
            _ => {}
        }
    }

    let count = civs.len();
    for civ in civs {
        debug!(civ = civ.civ_id, bonuses = civ.civ_bonuses.len(), "civilization group");
        data.groups.insert(RecordGroup::new(
            GroupKey::Civilization(civ.civ_id),
            GroupKind::Civilization(civ),
        ));
    }
    info!(civs = count, "created civilization groups");
    Ok(())
}

/// Collect units with a task group into task lines and aggregate those
/// under one villager group.
pub fn create_villager_groups(data: &mut DataSet) -> Result<(), LinkError> {
    let mut task_lines: Vec<(GroupKey, i64, LineSequence)> = Vec::new();
    for (&unit_id, unit) in &data.units {
        let task_group = unit.int_or("task_group", 0)?;
        if task_group <= 0 {
            continue;
        }
        let line_id = match task_group {
            1 => MALE_VILLAGER_LINE,
            2 => FEMALE_VILLAGER_LINE,
            _ => return Err(LinkError::UnknownTaskGroup { unit: unit_id, task_group }),
        };
        let key = GroupKey::TaskLine(line_id);
        match task_lines.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, line)) => {
                line.push(unit_id);
            }
            None => {
                let mut line = LineSequence::new(line_id);
                line.push(unit_id);
                task_lines.push((key, task_group, line));
            }
        }
    }

    if task_lines.is_empty() {
        return Ok(());
    }

    let keys: Vec<GroupKey> = task_lines.iter().map(|(key, _, _)| *key).collect();
    for (key, task_group, line) in task_lines {
        data.groups
            .insert(RecordGroup::new(key, GroupKind::TaskLine { line, task_group }));
    }
    info!(task_lines = keys.len(), "created villager groups");
    data.groups.insert(RecordGroup::new(
        GroupKey::Villager(VILLAGER_GROUP),
        GroupKind::Villager { task_lines: keys },
    ));
    Ok(())
}
