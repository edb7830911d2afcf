//! Effect bundles and their sanitation.

use crate::id::RecordId;
use crate::record::{Record, RecordError};
use tracing::debug;

/// Effect type that disables a tech.
pub const DISABLE_TECH: i64 = 102;

/// A bundle of effects applied by a tech or civilization.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectBundle {
    pub id: i64,
    pub record: Record,
    effects: Vec<Record>,
    sanitized: bool,
}

impl EffectBundle {
    pub fn new(id: i64, record: Record, effects: Vec<Record>) -> Self {
        Self {
            id,
            record,
            effects,
            sanitized: false,
        }
    }

    pub fn effects(&self) -> &[Record] {
        &self.effects
    }

    pub fn is_sanitized(&self) -> bool {
        self.sanitized
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Drop effects without a type and tech-disable effects without a
    /// target tech, then number the survivors `0..n`.
    pub fn sanitize(&mut self) -> Result<(), RecordError> {
        let before = self.effects.len();
        let mut kept = Vec::with_capacity(before);
        for effect in std::mem::take(&mut self.effects) {
            let effect_type = effect.get_int("type_id")?;
            if effect_type < 0 {
                continue;
            }
            if effect_type == DISABLE_TECH && effect.get_int("attr_d")? < 0 {
                continue;
            }
            kept.push(effect);
        }

        for (index, effect) in kept.iter_mut().enumerate() {
            effect.set_id(RecordId::Nested {
                parent: self.id,
                index: index as i64,
            });
        }
        if kept.len() != before {
            debug!(bundle = self.id, dropped = before - kept.len(), "sanitized effect bundle");
        }
        self.effects = kept;
        self.sanitized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;
    use crate::value::ValueMember;

    fn effect(index: i64, type_id: i64, attr_d: i64) -> Record {
        Record::with_members(
            RecordId::Nested { parent: 7, index },
            RecordKind::Effect,
            [
                ValueMember::int("type_id", type_id),
                ValueMember::int("attr_d", attr_d),
            ],
        )
    }

    #[test]
    fn sanitation_drops_garbage_and_reindexes() {
        let mut bundle = EffectBundle::new(
            7,
            Record::new(7, RecordKind::EffectBundle),
            vec![effect(0, -1, 0), effect(1, 5, 0), effect(2, 102, -1), effect(3, 102, 3)],
        );
        assert!(!bundle.is_sanitized());
        bundle.sanitize().unwrap();
        assert!(bundle.is_sanitized());

        let types: Vec<_> = bundle
            .effects()
            .iter()
            .map(|e| e.get_int("type_id").unwrap())
            .collect();
        assert_eq!(types, [5, 102]);
        assert_eq!(bundle.effects()[1].get_int("attr_d").unwrap(), 3);

        let ids: Vec<_> = bundle.effects().iter().map(|e| e.id().clone()).collect();
        assert_eq!(
            ids,
            [
                RecordId::Nested { parent: 7, index: 0 },
                RecordId::Nested { parent: 7, index: 1 }
            ]
        );
    }

    #[test]
    fn sanitizing_empty_bundle() {
        let mut bundle = EffectBundle::new(1, Record::new(1, RecordKind::EffectBundle), vec![]);
        bundle.sanitize().unwrap();
        assert!(bundle.is_sanitized());
        assert!(bundle.is_empty());
    }

    #[test]
    fn effect_without_type_fails() {
        let mut bundle = EffectBundle::new(
            1,
            Record::new(1, RecordKind::EffectBundle),
            vec![Record::new(0, RecordKind::Effect)],
        );
        assert!(matches!(
            bundle.sanitize(),
            Err(RecordError::MissingMember { .. })
        ));
    }
}
