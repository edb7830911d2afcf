//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so downstream
//! crates can build the same fixtures through the `test-utils` feature.

use crate::connection::{Connection, ConnectionEntry, ConnectionKind, ConnectionTag, LineMode};
use crate::dataset::DataSet;
use crate::effect::EffectBundle;
use crate::id::RecordId;
use crate::record::{Record, RecordKind};
use crate::value::{MemberValue, ValueMember};

// ===========================================================================
// Records
// ===========================================================================

/// A unit record with `id` and the given integer members.
pub fn unit(id: i64, members: &[(&str, i64)]) -> Record {
    let mut record = Record::with_members(id, RecordKind::Unit, [ValueMember::id("id", id)]);
    record.add_members(
        members
            .iter()
            .map(|&(name, value)| ValueMember::int(name, value)),
    );
    record
}

/// A named unit with hit points and an idle graphic.
pub fn named_unit(id: i64, name: &str, hit_points: i64, idle_graphic: i64) -> Record {
    let mut record = unit(
        id,
        &[("hit_points", hit_points), ("idle_graphic0", idle_graphic)],
    );
    record.add_member(ValueMember::string("name", name));
    record.add_member(ValueMember::new(
        "resource_storage",
        MemberValue::Container(Vec::new()),
    ));
    record
}

/// One entry of a unit's `resource_storage`.
pub fn storage(resource_type: i64, amount: f64) -> Record {
    Record::with_members(
        0,
        RecordKind::Entry,
        [
            ValueMember::int("type", resource_type),
            ValueMember::float("amount", amount),
        ],
    )
}

pub fn tech(id: i64, tech_type: i64, civ_id: i64, effect_bundle: i64, research_time: i64) -> Record {
    Record::with_members(
        id,
        RecordKind::Tech,
        [
            ValueMember::id("id", id),
            ValueMember::int("tech_type", tech_type),
            ValueMember::int("civilization_id", civ_id),
            ValueMember::id("tech_effect_id", effect_bundle),
            ValueMember::int("research_time", research_time),
        ],
    )
}

pub fn effect(bundle: i64, index: i64, type_id: i64, attr_d: i64) -> Record {
    Record::with_members(
        RecordId::Nested {
            parent: bundle,
            index,
        },
        RecordKind::Effect,
        [
            ValueMember::int("type_id", type_id),
            ValueMember::int("attr_a", -1),
            ValueMember::int("attr_d", attr_d),
        ],
    )
}

/// An unsanitized bundle of `(type_id, attr_d)` effects.
pub fn bundle(id: i64, effects: &[(i64, i64)]) -> EffectBundle {
    let effects = effects
        .iter()
        .enumerate()
        .map(|(index, &(type_id, attr_d))| effect(id, index as i64, type_id, attr_d))
        .collect();
    EffectBundle::new(id, Record::new(id, RecordKind::EffectBundle), effects)
}

pub fn civ(id: i64, name: &str, tech_tree: i64, team_bonus: i64) -> Record {
    Record::with_members(
        id,
        RecordKind::Civilization,
        [
            ValueMember::string("name", name),
            ValueMember::id("tech_tree_id", tech_tree),
            ValueMember::id("team_bonus_id", team_bonus),
        ],
    )
}

pub fn graphic(id: i64, frame_count: i64, frame_rate: f64) -> Record {
    Record::with_members(
        id,
        RecordKind::Graphic,
        [
            ValueMember::id("graphic_id", id),
            ValueMember::int("frame_count", frame_count),
            ValueMember::float("frame_rate", frame_rate),
        ],
    )
}

// ===========================================================================
// Connections
// ===========================================================================

fn entries(pairs: &[(i64, i64)]) -> Vec<ConnectionEntry> {
    pairs
        .iter()
        .map(|&(tag, other_id)| ConnectionEntry {
            other_id,
            tag: ConnectionTag::from(tag),
        })
        .collect()
}

/// `pairs` are `(tag, other_id)`.
pub fn unit_connection(
    id: i64,
    line_id: i64,
    line_mode: i64,
    pairs: &[(i64, i64)],
    required_research: i64,
    enabling_research: i64,
) -> Connection {
    Connection {
        id,
        kind: ConnectionKind::Unit,
        line_id,
        line_mode: LineMode::from(line_mode),
        entries: entries(pairs),
        required_research,
        enabling_research,
    }
}

pub fn building_connection(
    id: i64,
    line_mode: i64,
    required_research: i64,
    enabling_research: i64,
) -> Connection {
    Connection {
        id,
        kind: ConnectionKind::Building,
        line_id: id,
        line_mode: LineMode::from(line_mode),
        entries: Vec::new(),
        required_research,
        enabling_research,
    }
}

pub fn tech_connection(id: i64, line_mode: i64, pairs: &[(i64, i64)]) -> Connection {
    Connection {
        id,
        kind: ConnectionKind::Tech,
        line_id: id,
        line_mode: LineMode::from(line_mode),
        entries: entries(pairs),
        required_research: -1,
        enabling_research: -1,
    }
}

// ===========================================================================
// Data sets
// ===========================================================================

pub const ARCHERY_RANGE: i64 = 87;
pub const HOUSE: i64 = 70;

fn located_tech(
    id: i64,
    name: &str,
    tech_type: i64,
    civ_id: i64,
    effect_bundle: i64,
    research_time: i64,
    location: i64,
) -> Record {
    let mut record = tech(id, tech_type, civ_id, effect_bundle, research_time);
    record.add_member(ValueMember::string("name", name));
    record.add_member(ValueMember::id("research_location_id", location));
    record
}

/// A small but complete data set: the archer line, a unique line, two
/// buildings, villagers, an age upgrade and two civilizations.
pub fn archer_data_set() -> DataSet {
    let mut data = DataSet::new();

    let mut trained = |id, name, hp, idle| {
        let mut record = named_unit(id, name, hp, idle);
        record.add_member(ValueMember::id("train_location_id", ARCHERY_RANGE));
        data.units.insert(id, record);
    };
    trained(4, "Archer", 30, 1203);
    trained(24, "Crossbowman", 35, 1204);
    trained(492, "Arbalest", 40, 1205);
    trained(8, "Longbowman", 35, 1206);

    data.units
        .insert(ARCHERY_RANGE, named_unit(ARCHERY_RANGE, "Archery Range", 1500, 1300));
    let mut house = named_unit(HOUSE, "House", 550, 2223);
    house.add_member(ValueMember::new(
        "resource_storage",
        MemberValue::Container(vec![storage(4, 5.0), storage(11, 1.0)]),
    ));
    data.units.insert(HOUSE, house);

    let mut villager = |id, name| {
        let mut record = named_unit(id, name, 25, 1388);
        record.add_member(ValueMember::int("task_group", if id == 83 { 1 } else { 2 }));
        data.units.insert(id, record);
    };
    villager(83, "Villager (Male)");
    villager(293, "Villager (Female)");

    data.unit_connections = vec![
        unit_connection(4, 4, 2, &[], -1, -1),
        unit_connection(24, 4, 3, &[(2, 4)], 0, -1),
        unit_connection(492, 4, 3, &[(3, 1), (2, 24)], 1, -1),
        unit_connection(8, 8, 2, &[], -1, 4),
        unit_connection(83, 83, 2, &[], -1, -1),
    ];
    data.building_connections = vec![
        building_connection(ARCHERY_RANGE, 2, -1, -1),
        building_connection(HOUSE, 2, -1, -1),
    ];

    data.techs = vec![
        located_tech(0, "Crossbowman", 0, -1, 2, 35, ARCHERY_RANGE),
        located_tech(1, "Arbalest", 0, -1, 3, 50, ARCHERY_RANGE),
        located_tech(2, "Feudal Age", 2, -1, 4, 130, 109),
        located_tech(3, "Fletching", 0, -1, 0, 30, ARCHERY_RANGE),
        located_tech(4, "Longbowman", 0, 1, -1, 0, -1),
    ];
    data.tech_connections = vec![
        tech_connection(2, 0, &[(0, 1)]),
        tech_connection(3, 1, &[(1, ARCHERY_RANGE)]),
    ];

    data.effect_bundles.insert(0, bundle(0, &[(4, 0), (-1, 0)]));
    data.effect_bundles
        .insert(1, bundle(1, &[(102, -1), (102, 3)]));
    data.effect_bundles.insert(2, bundle(2, &[(3, 0)]));
    data.effect_bundles.insert(3, bundle(3, &[(3, 0)]));
    data.effect_bundles.insert(4, bundle(4, &[]));

    data.civs = vec![civ(0, "Gaia", -1, -1), civ(1, "Britons", 1, -1)];

    for (id, frames) in [(1203, 10), (1204, 10), (1205, 10), (1206, 10), (1300, 1), (2223, 1), (1388, 15)] {
        data.graphics.insert(id, graphic(id, frames, 0.1));
    }
    data
}
