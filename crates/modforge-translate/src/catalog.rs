//! What gets translated, collected once from the linked data set.
//!
//! The catalog owns copies of everything translators need to know about
//! *other* groups (names, heads, train and research locations), so each
//! translator only borrows the data set to add its own objects.

use crate::TranslateError;
use modforge_core::dataset::DataSet;
use modforge_core::group::GroupKind;
use modforge_core::id::GroupKey;
use modforge_core::linker::VILLAGER_GROUP;
use modforge_core::reference::DeferredRef;
use modforge_core::tech::TechGroup;
use modforge_data::{EntityName, NameTable};
use std::collections::{BTreeMap, HashSet};

/// A unit, building or villager line that becomes a game entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub key: GroupKey,
    pub head_unit: i64,
    pub name: EntityName,
    pub building: bool,
    /// Unit or building that creates the head unit.
    pub train_location: Option<i64>,
}

impl Entity {
    /// Reference to the game entity object itself.
    pub fn reference(&self) -> DeferredRef {
        DeferredRef::new(self.key, self.name.name.as_str())
    }

    /// Id of an object nested in the game entity, e.g. `Archer.Live`.
    pub fn nested_id(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.name.name)
    }

    pub fn directory(&self) -> String {
        format!("data/game_entity/generic/{}/", self.name.filename)
    }

    /// Whether this entity's head is created by `creator`.
    pub fn is_created_by(&self, creator: &Entity) -> bool {
        self.train_location
            .is_some_and(|location| location == creator.head_unit || location == creator.key.id())
    }
}

/// The group a tech is translated in, with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct TechEntry {
    pub key: GroupKey,
    pub tech: TechGroup,
    pub name: EntityName,
}

impl TechEntry {
    pub fn reference(&self) -> DeferredRef {
        DeferredRef::new(self.key, self.name.name.as_str())
    }

    pub fn nested_id(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.name.name)
    }

    pub fn directory(&self) -> String {
        format!("data/tech/generic/{}/", self.name.filename)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CivEntry {
    pub key: GroupKey,
    pub civ_id: i64,
    pub name: EntityName,
    pub civ_bonuses: Vec<i64>,
    pub unique_lines: Vec<GroupKey>,
}

impl CivEntry {
    pub fn directory(&self) -> String {
        format!("data/civ/{}/", self.name.filename)
    }
}

/// A tech can sit in several groups (e.g. unit unlock and civ bonus); it is
/// translated once, in the group ranked first here.
fn tech_rank(key: GroupKey) -> Option<u8> {
    match key {
        GroupKey::Tech(_) => Some(0),
        GroupKey::UnitUnlock(_) => Some(1),
        GroupKey::UnitUpgrade(_) => Some(2),
        GroupKey::BuildingUnlock(_) => Some(3),
        GroupKey::BuildingUpgrade(_) => Some(4),
        GroupKey::CivBonus(_) => Some(5),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entities: Vec<Entity>,
    pub techs: Vec<TechEntry>,
    pub civs: Vec<CivEntry>,
    /// Lines unlocked for a single civilization.
    pub unique_lines: HashSet<GroupKey>,
}

impl Catalog {
    pub fn build(data: &DataSet, names: &NameTable) -> Result<Self, TranslateError> {
        let mut keys: Vec<GroupKey> = data.groups.keys().collect();
        keys.sort();

        let mut catalog = Catalog::default();
        let mut techs: BTreeMap<i64, (u8, GroupKey, TechGroup)> = BTreeMap::new();

        for key in keys {
            let Some(group) = data.groups.get(key) else {
                continue;
            };
            match group.kind() {
                GroupKind::Tech(tech) => {
                    let Some(rank) = tech_rank(key) else {
                        continue;
                    };
                    let better = techs
                        .get(&tech.tech_id)
                        .is_none_or(|(current, _, _)| rank < *current);
                    if better {
                        techs.insert(tech.tech_id, (rank, key, tech.clone()));
                    }
                }
                GroupKind::Civilization(civ) => {
                    catalog.unique_lines.extend(civ.unique_lines.iter().copied());
                    let name = names.civ(civ.civ_id, data.civ(civ.civ_id).ok());
                    catalog.civs.push(CivEntry {
                        key,
                        civ_id: civ.civ_id,
                        name,
                        civ_bonuses: civ.civ_bonuses.clone(),
                        unique_lines: civ.unique_lines.clone(),
                    });
                }
                GroupKind::Villager { task_lines } => {
                    let head = task_lines
                        .iter()
                        .filter_map(|k| data.groups.get(*k))
                        .find_map(|g| g.kind().line().and_then(|line| line.head()));
                    let Some(head_unit) = head else {
                        continue;
                    };
                    let name = if names.has_unit(VILLAGER_GROUP) {
                        names.unit(VILLAGER_GROUP, None)
                    } else {
                        EntityName {
                            name: "Villager".to_string(),
                            filename: "villager".to_string(),
                        }
                    };
                    catalog.entities.push(entity(data, key, head_unit, name, false)?);
                }
                // Task lines are translated as part of the villager.
                GroupKind::TaskLine { .. } => {}
                kind => {
                    let Some(head_unit) = kind.line().and_then(|line| line.head()) else {
                        continue;
                    };
                    let building =
                        matches!(kind, GroupKind::BuildingLine(_) | GroupKind::StackBuilding { .. });
                    let name = names.unit(head_unit, data.unit(head_unit).ok());
                    catalog.entities.push(entity(data, key, head_unit, name, building)?);
                }
            }
        }

        let taken: HashSet<String> = catalog
            .entities
            .iter()
            .map(|e| e.name.name.clone())
            .chain(catalog.civs.iter().map(|c| c.name.name.clone()))
            .collect();
        catalog.techs = techs
            .into_values()
            .map(|(_, key, tech)| {
                let mut name = names.tech(tech.tech_id, data.tech(tech.tech_id).ok());
                // Object ids are global; an unlock tech is often named after its unit.
                if taken.contains(&name.name) {
                    name.name.push_str("Tech");
                    name.filename.push_str("_tech");
                }
                TechEntry { key, tech, name }
            })
            .collect();
        Ok(catalog)
    }

    pub fn entity(&self, key: GroupKey) -> Option<&Entity> {
        self.entities.iter().find(|e| e.key == key)
    }

    pub fn tech(&self, tech_id: i64) -> Option<&TechEntry> {
        self.techs.iter().find(|t| t.tech.tech_id == tech_id)
    }

    pub fn is_unique(&self, key: GroupKey) -> bool {
        self.unique_lines.contains(&key)
    }
}

fn entity(
    data: &DataSet,
    key: GroupKey,
    head_unit: i64,
    name: EntityName,
    building: bool,
) -> Result<Entity, TranslateError> {
    let train_location = data.unit(head_unit)?.int_or("train_location_id", -1)?;
    Ok(Entity {
        key,
        head_unit,
        name,
        building,
        train_location: (train_location > -1).then_some(train_location),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::linker;
    use modforge_core::test_utils::{ARCHERY_RANGE, archer_data_set};

    fn catalog() -> Catalog {
        let mut data = archer_data_set();
        linker::link(&mut data).unwrap();
        Catalog::build(&data, &NameTable::new()).unwrap()
    }

    #[test]
    fn entities_per_line() {
        let catalog = catalog();
        let archer = catalog.entity(GroupKey::UnitLine(4)).unwrap();
        assert_eq!(archer.head_unit, 4);
        assert_eq!(archer.name.name, "Archer");
        assert_eq!(archer.train_location, Some(ARCHERY_RANGE));
        assert_eq!(archer.directory(), "data/game_entity/generic/archer/");

        let range = catalog.entity(GroupKey::BuildingLine(ARCHERY_RANGE)).unwrap();
        assert!(range.building);
        assert_eq!(range.name.filename, "archery_range");
        assert!(archer.is_created_by(range));

        let villager = catalog.entity(GroupKey::Villager(VILLAGER_GROUP)).unwrap();
        assert_eq!(villager.head_unit, 83);
        assert_eq!(villager.name.name, "Villager");
    }

    #[test]
    fn each_tech_translated_once() {
        let catalog = catalog();
        assert_eq!(catalog.techs.len(), 5);
        // Unlock wins over the civ bonus group of the same tech.
        assert_eq!(catalog.tech(4).unwrap().key, GroupKey::UnitUnlock(4));
        assert_eq!(catalog.tech(2).unwrap().key, GroupKey::Tech(2));
        assert_eq!(catalog.tech(2).unwrap().name.name, "FeudalAge");
        assert_eq!(catalog.tech(4).unwrap().name.name, "LongbowmanTech");
        assert_eq!(catalog.tech(4).unwrap().name.filename, "longbowman_tech");
    }

    #[test]
    fn unique_lines_collected_from_civs() {
        let catalog = catalog();
        assert!(catalog.is_unique(GroupKey::UnitLine(8)));
        assert!(!catalog.is_unique(GroupKey::UnitLine(4)));
        assert_eq!(catalog.civs.len(), 2);
        assert_eq!(catalog.civs[1].name.name, "Britons");
    }
}
