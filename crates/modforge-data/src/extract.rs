//! Extraction of raw documents into the records of a [`DataSet`].

use crate::loader::DataLoadError;
use crate::schema::{GameSpecData, RawField, RawRecord};
use modforge_core::connection::{Connection, ConnectionKind};
use modforge_core::dataset::DataSet;
use modforge_core::effect::EffectBundle;
use modforge_core::id::RecordId;
use modforge_core::record::{Record, RecordError, RecordKind};
use modforge_core::value::{MemberValue, ValueMember};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::info;

/// Convert one field into a member value. `null` is not a value.
pub fn to_member_value(
    record: &RecordId,
    name: &str,
    field: &RawField,
) -> Result<MemberValue, RecordError> {
    let value = match field {
        RawField::Null => {
            return Err(RecordError::NotAMember {
                record: record.clone(),
                member: name.to_string(),
            });
        }
        RawField::Bool(v) => MemberValue::Bool(*v),
        RawField::Int(v) => MemberValue::Int(*v),
        RawField::Float(v) => MemberValue::Float(*v),
        RawField::Text(v) => MemberValue::String(v.clone()),
        RawField::List(items)
            if !items.is_empty() && items.iter().all(|i| matches!(i, RawField::Record(_))) =>
        {
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if let RawField::Record(fields) = item {
                    records.push(to_record(
                        RecordId::Index(index as i64),
                        RecordKind::Entry,
                        fields,
                    )?);
                }
            }
            MemberValue::Container(records)
        }
        RawField::List(items) => MemberValue::Array(
            items
                .iter()
                .map(|item| to_member_value(record, name, item))
                .collect::<Result<_, _>>()?,
        ),
        RawField::Record(fields) => {
            MemberValue::Container(vec![to_record(RecordId::Index(0), RecordKind::Entry, fields)?])
        }
    };
    Ok(value)
}

/// Build a record from raw fields.
pub fn to_record(id: RecordId, kind: RecordKind, fields: &RawRecord) -> Result<Record, RecordError> {
    let mut record = Record::new(id, kind);
    for (name, field) in fields {
        let value = to_member_value(record.id(), name, field)?;
        record.add_member(ValueMember::new(name.clone(), value));
    }
    Ok(record)
}

fn invalid(table: &'static str, index: usize) -> impl Fn(RecordError) -> DataLoadError {
    move |source| DataLoadError::InvalidRecord {
        table,
        index,
        source,
    }
}

/// Records of a table addressed by position.
fn indexed_table(
    table: &'static str,
    kind: RecordKind,
    raw: &[RawRecord],
) -> Result<Vec<Record>, DataLoadError> {
    raw.iter()
        .enumerate()
        .map(|(index, fields)| {
            to_record(RecordId::Index(index as i64), kind, fields).map_err(invalid(table, index))
        })
        .collect()
}

/// Records of a table addressed by their `id_field`. Entries without one
/// fall back to their position. Ids must be unique within the table.
fn keyed_table(
    table: &'static str,
    kind: RecordKind,
    id_field: &str,
    raw: &[RawRecord],
) -> Result<BTreeMap<i64, Record>, DataLoadError> {
    let mut records = BTreeMap::new();
    for (index, fields) in raw.iter().enumerate() {
        let id = match fields.get(id_field) {
            Some(RawField::Int(id)) => *id,
            _ => index as i64,
        };
        let record = to_record(RecordId::Index(id), kind, fields).map_err(invalid(table, index))?;
        match records.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(_) => return Err(DataLoadError::DuplicateId { table, id }),
        }
    }
    Ok(records)
}

fn connection_table(
    table: &'static str,
    record_kind: RecordKind,
    kind: ConnectionKind,
    raw: &[RawRecord],
) -> Result<Vec<Connection>, DataLoadError> {
    indexed_table(table, record_kind, raw)?
        .iter()
        .enumerate()
        .map(|(index, record)| Connection::from_record(record, kind).map_err(invalid(table, index)))
        .collect()
}

fn effect_bundles(raw: &[RawRecord]) -> Result<BTreeMap<i64, EffectBundle>, DataLoadError> {
    let mut bundles = BTreeMap::new();
    for (index, fields) in raw.iter().enumerate() {
        let id = index as i64;
        let mut record = to_record(RecordId::Index(id), RecordKind::EffectBundle, fields)
            .map_err(invalid("effect_bundles", index))?;
        let effects = match record.remove_member("effects") {
            Ok(member) => match member.value() {
                MemberValue::Container(effects) => effects
                    .iter()
                    .enumerate()
                    .map(|(position, effect)| {
                        Record::with_members(
                            RecordId::Nested {
                                parent: id,
                                index: position as i64,
                            },
                            RecordKind::Effect,
                            effect.members().cloned(),
                        )
                    })
                    .collect(),
                MemberValue::Array(values) if values.is_empty() => Vec::new(),
                _ => {
                    return Err(DataLoadError::InvalidRecord {
                        table: "effect_bundles",
                        index,
                        source: RecordError::WrongType {
                            record: record.id().clone(),
                            member: "effects".to_string(),
                            expected: "container",
                        },
                    });
                }
            },
            Err(_) => Vec::new(),
        };
        bundles.insert(id, EffectBundle::new(id, record, effects));
    }
    Ok(bundles)
}

/// Turn a parsed game data document into a data set. Nothing is linked
/// yet.
pub fn extract(raw: &GameSpecData) -> Result<DataSet, DataLoadError> {
    let mut data = DataSet::new();

    data.units = keyed_table("units", RecordKind::Unit, "id", &raw.units)?;
    data.techs = indexed_table("researches", RecordKind::Tech, &raw.researches)?;
    data.effect_bundles = effect_bundles(&raw.effect_bundles)?;
    data.civs = indexed_table("civs", RecordKind::Civilization, &raw.civs)?;
    data.unit_connections = connection_table(
        "unit_connections",
        RecordKind::UnitConnection,
        ConnectionKind::Unit,
        &raw.unit_connections,
    )?;
    data.building_connections = connection_table(
        "building_connections",
        RecordKind::BuildingConnection,
        ConnectionKind::Building,
        &raw.building_connections,
    )?;
    data.tech_connections = connection_table(
        "tech_connections",
        RecordKind::TechConnection,
        ConnectionKind::Tech,
        &raw.tech_connections,
    )?;
    data.age_connections = connection_table(
        "age_connections",
        RecordKind::AgeConnection,
        ConnectionKind::Age,
        &raw.age_connections,
    )?;
    data.graphics = keyed_table("graphics", RecordKind::Graphic, "graphic_id", &raw.graphics)?;
    data.sounds = keyed_table("sounds", RecordKind::Sound, "sound_id", &raw.sounds)?;
    data.terrains = indexed_table("terrains", RecordKind::Terrain, &raw.terrains)?;

    info!(
        units = data.units.len(),
        techs = data.techs.len(),
        effect_bundles = data.effect_bundles.len(),
        civs = data.civs.len(),
        "extracted game data"
    );
    Ok(data)
}
