//! The container passed through every stage of a conversion run.

use crate::connection::Connection;
use crate::effect::EffectBundle;
use crate::group::GroupArena;
use crate::linker::LinkError;
use crate::media::{CombinedSound, CombinedSprite};
use crate::record::{Record, RecordKind};
use std::collections::BTreeMap;

/// Extracted source tables plus everything derived from them.
///
/// Tables are filled once by extraction and not mutated afterwards, with
/// the exception of effect bundle sanitation. Connection tables keep their
/// source order.
#[derive(Debug, Default)]
pub struct DataSet {
    pub units: BTreeMap<i64, Record>,
    /// Indexed by tech id.
    pub techs: Vec<Record>,
    pub effect_bundles: BTreeMap<i64, EffectBundle>,
    /// Indexed by civ id.
    pub civs: Vec<Record>,
    pub unit_connections: Vec<Connection>,
    pub building_connections: Vec<Connection>,
    pub tech_connections: Vec<Connection>,
    pub age_connections: Vec<Connection>,
    pub graphics: BTreeMap<i64, Record>,
    pub sounds: BTreeMap<i64, Record>,
    pub terrains: Vec<Record>,

    pub groups: GroupArena,
    /// Keyed by head graphic id.
    pub combined_sprites: BTreeMap<i64, CombinedSprite>,
    /// Keyed by sound id.
    pub combined_sounds: BTreeMap<i64, CombinedSound>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self, id: i64) -> Result<&Record, LinkError> {
        self.units.get(&id).ok_or(LinkError::MissingRecord {
            kind: RecordKind::Unit,
            id,
        })
    }

    pub fn tech(&self, id: i64) -> Result<&Record, LinkError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.techs.get(index))
            .ok_or(LinkError::MissingRecord {
                kind: RecordKind::Tech,
                id,
            })
    }

    pub fn civ(&self, id: i64) -> Result<&Record, LinkError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.civs.get(index))
            .ok_or(LinkError::MissingRecord {
                kind: RecordKind::Civilization,
                id,
            })
    }

    pub fn effect_bundle(&self, id: i64) -> Result<&EffectBundle, LinkError> {
        self.effect_bundles
            .get(&id)
            .ok_or(LinkError::MissingRecord {
                kind: RecordKind::EffectBundle,
                id,
            })
    }

    pub fn graphic(&self, id: i64) -> Result<&Record, LinkError> {
        self.graphics.get(&id).ok_or(LinkError::MissingRecord {
            kind: RecordKind::Graphic,
            id,
        })
    }

    pub fn sound(&self, id: i64) -> Result<&Record, LinkError> {
        self.sounds.get(&id).ok_or(LinkError::MissingRecord {
            kind: RecordKind::Sound,
            id,
        })
    }

    /// The combined sprite with head graphic `graphic_id`, created on first
    /// use, with `staging_id` recorded as a reference.
    pub fn reference_sprite(
        &mut self,
        graphic_id: i64,
        filename: &str,
        staging_id: &str,
    ) -> CombinedSprite {
        let sprite = self
            .combined_sprites
            .entry(graphic_id)
            .or_insert_with(|| CombinedSprite::new(graphic_id, filename));
        sprite.add_reference(staging_id);
        sprite.clone()
    }

    pub fn reference_sound(&mut self, sound_id: i64, filename: &str, staging_id: &str) -> CombinedSound {
        let sound = self
            .combined_sounds
            .entry(sound_id)
            .or_insert_with(|| CombinedSound::new(sound_id, filename));
        sound.add_reference(staging_id);
        sound.clone()
    }
}
