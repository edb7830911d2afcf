use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Arena handle of a record group inside a [`GroupArena`](crate::group::GroupArena).
    pub struct GroupId;
}

/// Identifies a record. Source entries are addressed by their table index,
/// entries nested in another entry (effects inside a bundle) by a composite
/// key, and records produced by diffing by a derived name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordId {
    Index(i64),
    Nested { parent: i64, index: i64 },
    Derived(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Index(id) => write!(f, "{id}"),
            RecordId::Nested { parent, index } => write!(f, "{parent}.{index}"),
            RecordId::Derived(name) => f.write_str(name),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Index(id)
    }
}

/// Stable logical key of a record group.
///
/// Keys exist independently of the groups they name, so a reference to a
/// group can be written down before the group has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    UnitLine(i64),
    BuildingLine(i64),
    TaskLine(i64),
    Villager(i64),
    Tech(i64),
    UnitUnlock(i64),
    BuildingUnlock(i64),
    UnitUpgrade(i64),
    BuildingUpgrade(i64),
    CivBonus(i64),
    Civilization(i64),
}

impl GroupKey {
    /// The numeric id inside the key's namespace.
    pub fn id(&self) -> i64 {
        match *self {
            GroupKey::UnitLine(id)
            | GroupKey::BuildingLine(id)
            | GroupKey::TaskLine(id)
            | GroupKey::Villager(id)
            | GroupKey::Tech(id)
            | GroupKey::UnitUnlock(id)
            | GroupKey::BuildingUnlock(id)
            | GroupKey::UnitUpgrade(id)
            | GroupKey::BuildingUpgrade(id)
            | GroupKey::CivBonus(id)
            | GroupKey::Civilization(id) => id,
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            GroupKey::UnitLine(_) => "UnitLine",
            GroupKey::BuildingLine(_) => "BuildingLine",
            GroupKey::TaskLine(_) => "TaskLine",
            GroupKey::Villager(_) => "Villager",
            GroupKey::Tech(_) => "Tech",
            GroupKey::UnitUnlock(_) => "UnitUnlock",
            GroupKey::BuildingUnlock(_) => "BuildingUnlock",
            GroupKey::UnitUpgrade(_) => "UnitUpgrade",
            GroupKey::BuildingUpgrade(_) => "BuildingUpgrade",
            GroupKey::CivBonus(_) => "CivBonus",
            GroupKey::Civilization(_) => "Civilization",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.namespace(), self.id())
    }
}

/// Identifies a template in the API registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub u32);
