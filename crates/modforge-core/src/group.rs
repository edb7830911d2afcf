//! Record groups and the arena that owns them.
//!
//! A group aggregates related records (by id, never by copy) together with
//! the staging objects translators attach to it. Groups live in a
//! [`GroupArena`] and are addressed by their logical [`GroupKey`], so a
//! reference can name a group before it is created.

use crate::civ::CivGroup;
use crate::id::{GroupId, GroupKey};
use crate::nyan::ApiRegistry;
use crate::reference::SymbolTable;
use crate::staging::{StagingError, StagingObject};
use crate::tech::TechGroup;
use slotmap::SlotMap;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Where [`LineSequence::insert_after`] put a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AfterPredecessor,
    /// Predecessor not in the line (yet); the record went to the end.
    Appended,
    /// Already in the line; nothing changed.
    Duplicate,
}

/// Ordered ids of the records forming one upgrade chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSequence {
    line_id: i64,
    units: Vec<i64>,
}

impl LineSequence {
    pub fn new(line_id: i64) -> Self {
        Self {
            line_id,
            units: Vec::new(),
        }
    }

    pub fn line_id(&self) -> i64 {
        self.line_id
    }

    pub fn units(&self) -> &[i64] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, unit: i64) -> bool {
        self.units.contains(&unit)
    }

    /// First record of the line.
    pub fn head(&self) -> Option<i64> {
        self.units.first().copied()
    }

    pub fn position(&self, unit: i64) -> Option<usize> {
        self.units.iter().position(|&u| u == unit)
    }

    /// Insert at the head. Returns false if the record is already present.
    pub fn add_front(&mut self, unit: i64) -> bool {
        if self.contains(unit) {
            return false;
        }
        self.units.insert(0, unit);
        true
    }

    /// Append at the end. Returns false if the record is already present.
    pub fn push(&mut self, unit: i64) -> bool {
        if self.contains(unit) {
            return false;
        }
        self.units.push(unit);
        true
    }

    /// Insert directly after `predecessor`.
    pub fn insert_after(&mut self, unit: i64, predecessor: i64) -> Placement {
        if self.contains(unit) {
            return Placement::Duplicate;
        }
        match self.position(predecessor) {
            Some(index) => {
                self.units.insert(index + 1, unit);
                Placement::AfterPredecessor
            }
            None => {
                warn!(
                    line = self.line_id,
                    unit, predecessor, "predecessor not in line, appending"
                );
                self.units.push(unit);
                Placement::Appended
            }
        }
    }
}

/// Closed set of group variants.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKind {
    UnitLine(LineSequence),
    /// A unit line whose head transforms into another unit (packing and
    /// unpacking siege).
    UnitTransform {
        line: LineSequence,
        head_unit: i64,
        transform_target: i64,
    },
    /// Monks switch to a different unit while carrying a relic.
    Monk {
        line: LineSequence,
        head_unit: i64,
        switch_unit: i64,
    },
    /// One gendered variant set of the villager.
    TaskLine {
        line: LineSequence,
        task_group: i64,
    },
    Villager {
        task_lines: Vec<GroupKey>,
    },
    BuildingLine(LineSequence),
    StackBuilding {
        line: LineSequence,
        stack_unit: i64,
    },
    Tech(TechGroup),
    Civilization(CivGroup),
}

impl GroupKind {
    /// The record sequence of line-shaped groups.
    pub fn line(&self) -> Option<&LineSequence> {
        match self {
            GroupKind::UnitLine(line)
            | GroupKind::BuildingLine(line)
            | GroupKind::UnitTransform { line, .. }
            | GroupKind::Monk { line, .. }
            | GroupKind::TaskLine { line, .. }
            | GroupKind::StackBuilding { line, .. } => Some(line),
            GroupKind::Villager { .. } | GroupKind::Tech(_) | GroupKind::Civilization(_) => None,
        }
    }

    pub fn line_mut(&mut self) -> Option<&mut LineSequence> {
        match self {
            GroupKind::UnitLine(line)
            | GroupKind::BuildingLine(line)
            | GroupKind::UnitTransform { line, .. }
            | GroupKind::Monk { line, .. }
            | GroupKind::TaskLine { line, .. }
            | GroupKind::StackBuilding { line, .. } => Some(line),
            GroupKind::Villager { .. } | GroupKind::Tech(_) | GroupKind::Civilization(_) => None,
        }
    }

    pub fn tech(&self) -> Option<&TechGroup> {
        match self {
            GroupKind::Tech(tech) => Some(tech),
            _ => None,
        }
    }

    pub fn civ(&self) -> Option<&CivGroup> {
        match self {
            GroupKind::Civilization(civ) => Some(civ),
            _ => None,
        }
    }

    pub fn civ_mut(&mut self) -> Option<&mut CivGroup> {
        match self {
            GroupKind::Civilization(civ) => Some(civ),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupKind::UnitLine(_) => "unit line",
            GroupKind::UnitTransform { .. } => "transform line",
            GroupKind::Monk { .. } => "monk line",
            GroupKind::TaskLine { .. } => "task line",
            GroupKind::Villager { .. } => "villager",
            GroupKind::BuildingLine(_) => "building line",
            GroupKind::StackBuilding { .. } => "stack building",
            GroupKind::Tech(tech) => tech.class.name(),
            GroupKind::Civilization(_) => "civilization",
        }
    }
}

/// Related records plus the staging objects pending emission for them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup {
    key: GroupKey,
    kind: GroupKind,
    staging: Vec<StagingObject>,
    index: HashMap<String, usize>,
}

impl RecordGroup {
    pub fn new(key: GroupKey, kind: GroupKind) -> Self {
        Self {
            key,
            kind,
            staging: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut GroupKind {
        &mut self.kind
    }

    /// Add a staging object, replacing one with the same id in place.
    pub fn add_staging_object(&mut self, object: StagingObject) -> Option<StagingObject> {
        match self.index.get(object.id()) {
            Some(&slot) => Some(std::mem::replace(&mut self.staging[slot], object)),
            None => {
                self.index.insert(object.id().to_string(), self.staging.len());
                self.staging.push(object);
                None
            }
        }
    }

    pub fn get_staging_object(&self, id: &str) -> Option<&StagingObject> {
        self.index.get(id).map(|&slot| &self.staging[slot])
    }

    pub fn get_staging_object_mut(&mut self, id: &str) -> Option<&mut StagingObject> {
        self.index.get(id).map(|&slot| &mut self.staging[slot])
    }

    pub fn has_staging_object(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn remove_staging_object(&mut self, id: &str) -> Option<StagingObject> {
        let slot = self.index.remove(id)?;
        let removed = self.staging.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(removed)
    }

    /// Staging objects in insertion order.
    pub fn staging_objects(&self) -> &[StagingObject] {
        &self.staging
    }

    pub fn staging_objects_mut(&mut self) -> impl Iterator<Item = &mut StagingObject> {
        self.staging.iter_mut()
    }

    pub fn materialize_all(&mut self, registry: &ApiRegistry) -> Result<(), StagingError> {
        for object in &mut self.staging {
            object.materialize(registry)?;
        }
        Ok(())
    }

    /// Fill every staging object and require each to end up ready.
    pub fn fill_all(
        &mut self,
        registry: &ApiRegistry,
        symbols: &SymbolTable,
    ) -> Result<(), StagingError> {
        for object in &mut self.staging {
            object.fill_members(registry, symbols)?;
            object.ensure_ready()?;
        }
        debug!(group = %self.key, objects = self.staging.len(), "group finalized");
        Ok(())
    }
}

/// Owner of every record group of a conversion run.
#[derive(Debug, Default)]
pub struct GroupArena {
    groups: SlotMap<GroupId, RecordGroup>,
    by_key: HashMap<GroupKey, GroupId>,
}

impl GroupArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group. A group already stored under the same key is
    /// replaced and keeps its arena slot.
    pub fn insert(&mut self, group: RecordGroup) -> GroupId {
        let key = group.key();
        if let Some(&id) = self.by_key.get(&key)
            && let Some(slot) = self.groups.get_mut(id)
        {
            warn!(
                group = %key,
                old = slot.kind.name(),
                new = group.kind.name(),
                "group replaced"
            );
            *slot = group;
            return id;
        }
        debug!(group = %key, kind = group.kind.name(), "group created");
        let id = self.groups.insert(group);
        self.by_key.insert(key, id);
        id
    }

    pub fn contains_key(&self, key: GroupKey) -> bool {
        self.by_key.contains_key(&key)
    }

    pub fn id_of(&self, key: GroupKey) -> Option<GroupId> {
        self.by_key.get(&key).copied()
    }

    pub fn get(&self, key: GroupKey) -> Option<&RecordGroup> {
        self.by_key.get(&key).and_then(|&id| self.groups.get(id))
    }

    pub fn get_mut(&mut self, key: GroupKey) -> Option<&mut RecordGroup> {
        let id = *self.by_key.get(&key)?;
        self.groups.get_mut(id)
    }

    pub fn get_by_id(&self, id: GroupId) -> Option<&RecordGroup> {
        self.groups.get(id)
    }

    pub fn remove(&mut self, key: GroupKey) -> Option<RecordGroup> {
        let id = self.by_key.remove(&key)?;
        self.groups.remove(id)
    }

    /// All groups, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &RecordGroup)> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GroupId, &mut RecordGroup)> {
        self.groups.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = GroupKey> + '_ {
        self.groups.values().map(RecordGroup::key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of staging objects across all groups.
    pub fn staging_object_count(&self) -> usize {
        self.groups.values().map(|g| g.staging_objects().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chained_predecessors_give_source_order(
            ids in proptest::collection::hash_set(0i64..10_000, 1..30)
        ) {
            let ids: Vec<i64> = ids.into_iter().collect();
            let mut line = LineSequence::new(1);
            line.add_front(ids[0]);
            for pair in ids.windows(2) {
                line.insert_after(pair[1], pair[0]);
            }
            prop_assert_eq!(line.units(), ids.as_slice());
        }

        #[test]
        fn no_record_appears_twice(ops in proptest::collection::vec((0i64..8, 0i64..8), 0..40)) {
            let mut line = LineSequence::new(1);
            for (unit, predecessor) in ops {
                line.insert_after(unit, predecessor);
            }
            let mut seen = std::collections::HashSet::new();
            prop_assert!(line.units().iter().all(|u| seen.insert(*u)));
        }
    }

    #[test]
    fn line_insertion_order() {
        let mut line = LineSequence::new(4);
        assert!(line.add_front(10));
        assert_eq!(line.insert_after(11, 10), Placement::AfterPredecessor);
        assert_eq!(line.insert_after(12, 11), Placement::AfterPredecessor);
        assert_eq!(line.units(), &[10, 11, 12]);
        assert_eq!(line.head(), Some(10));
    }

    #[test]
    fn insert_after_middle_shifts_tail() {
        let mut line = LineSequence::new(4);
        line.add_front(10);
        line.insert_after(12, 10);
        line.insert_after(11, 10);
        assert_eq!(line.units(), &[10, 11, 12]);
    }

    #[test]
    fn missing_predecessor_appends() {
        let mut line = LineSequence::new(4);
        line.add_front(10);
        assert_eq!(line.insert_after(13, 99), Placement::Appended);
        assert_eq!(line.units(), &[10, 13]);
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut line = LineSequence::new(4);
        line.add_front(10);
        assert!(!line.add_front(10));
        assert!(!line.push(10));
        assert_eq!(line.insert_after(10, 10), Placement::Duplicate);
        assert_eq!(line.len(), 1);
    }

    #[test]
    fn first_in_line_after_continuation_goes_to_head() {
        let mut line = LineSequence::new(4);
        line.push(11);
        line.add_front(10);
        assert_eq!(line.units(), &[10, 11]);
    }

    #[test]
    fn staging_objects_keep_insertion_order() {
        let mut group = RecordGroup::new(GroupKey::UnitLine(4), GroupKind::UnitLine(LineSequence::new(4)));
        group.add_staging_object(StagingObject::new("Archer", "Archer", "data/"));
        group.add_staging_object(StagingObject::new("Archer.Live", "Live", "data/"));
        group.add_staging_object(StagingObject::new("Archer.Idle", "Idle", "data/"));

        let ids: Vec<_> = group.staging_objects().iter().map(StagingObject::id).collect();
        assert_eq!(ids, ["Archer", "Archer.Live", "Archer.Idle"]);

        assert!(group.remove_staging_object("Archer.Live").is_some());
        assert!(!group.has_staging_object("Archer.Live"));
        assert_eq!(group.get_staging_object("Archer.Idle").unwrap().name(), "Idle");
    }

    #[test]
    fn replacing_staging_object_keeps_position() {
        let mut group = RecordGroup::new(GroupKey::UnitLine(4), GroupKind::UnitLine(LineSequence::new(4)));
        group.add_staging_object(StagingObject::new("Archer", "Archer", "data/"));
        group.add_staging_object(StagingObject::new("Archer.Live", "Live", "data/"));
        let old = group.add_staging_object(StagingObject::new("Archer", "Archer2", "data/"));
        assert_eq!(old.unwrap().name(), "Archer");
        assert_eq!(group.staging_objects()[0].name(), "Archer2");
        assert_eq!(group.staging_objects().len(), 2);
    }

    #[test]
    fn arena_lookup_by_key() {
        let mut arena = GroupArena::new();
        let id = arena.insert(RecordGroup::new(
            GroupKey::BuildingLine(12),
            GroupKind::BuildingLine(LineSequence::new(12)),
        ));
        assert!(arena.contains_key(GroupKey::BuildingLine(12)));
        assert!(!arena.contains_key(GroupKey::UnitLine(12)));
        assert_eq!(arena.id_of(GroupKey::BuildingLine(12)), Some(id));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn arena_replace_keeps_slot() {
        let mut arena = GroupArena::new();
        let first = arena.insert(RecordGroup::new(
            GroupKey::UnitLine(4),
            GroupKind::UnitLine(LineSequence::new(4)),
        ));
        let mut line = LineSequence::new(4);
        line.push(10);
        let second = arena.insert(RecordGroup::new(GroupKey::UnitLine(4), GroupKind::UnitLine(line)));
        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
        let stored = arena.get(GroupKey::UnitLine(4)).unwrap();
        assert_eq!(stored.kind().line().unwrap().units(), &[10]);
    }

    /// Counts warnings emitted while it is the default subscriber.
    struct WarnCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl tracing::Subscriber for WarnCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }
        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &tracing::span::Id) {}
        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn arena_replace_warns() {
        let warnings = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let subscriber = WarnCounter(warnings.clone());
        let count = || warnings.load(std::sync::atomic::Ordering::SeqCst);

        tracing::subscriber::with_default(subscriber, || {
            let mut arena = GroupArena::new();
            arena.insert(RecordGroup::new(
                GroupKey::UnitLine(4),
                GroupKind::UnitLine(LineSequence::new(4)),
            ));
            arena.insert(RecordGroup::new(
                GroupKey::UnitLine(24),
                GroupKind::UnitLine(LineSequence::new(24)),
            ));
            assert_eq!(count(), 0);

            arena.insert(RecordGroup::new(
                GroupKey::UnitLine(4),
                GroupKind::UnitLine(LineSequence::new(4)),
            ));
            assert_eq!(count(), 1);
            assert_eq!(arena.len(), 2);
        });
    }

    #[test]
    fn arena_remove() {
        let mut arena = GroupArena::new();
        arena.insert(RecordGroup::new(
            GroupKey::UnitLine(4),
            GroupKind::UnitLine(LineSequence::new(4)),
        ));
        assert!(arena.remove(GroupKey::UnitLine(4)).is_some());
        assert!(arena.is_empty());
        assert!(arena.get(GroupKey::UnitLine(4)).is_none());
    }
}
