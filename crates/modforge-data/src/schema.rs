//! Serde structs for the on-disk documents.
//!
//! Game data is an open-ended schema: every table is a list of records whose
//! fields are an untagged value tree. API templates, names and settings have
//! fixed shapes.

use serde::Deserialize;
use std::collections::BTreeMap;

// ===========================================================================
// Game data
// ===========================================================================

/// A single field value of a source record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    /// Only produced by formats with a null literal; never a valid member.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<RawField>),
    Record(RawRecord),
}

pub type RawRecord = BTreeMap<String, RawField>;

/// The root document: one list of records per source table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameSpecData {
    #[serde(default)]
    pub units: Vec<RawRecord>,
    #[serde(default)]
    pub researches: Vec<RawRecord>,
    #[serde(default)]
    pub effect_bundles: Vec<RawRecord>,
    #[serde(default)]
    pub civs: Vec<RawRecord>,
    #[serde(default)]
    pub unit_connections: Vec<RawRecord>,
    #[serde(default)]
    pub building_connections: Vec<RawRecord>,
    #[serde(default)]
    pub tech_connections: Vec<RawRecord>,
    #[serde(default)]
    pub age_connections: Vec<RawRecord>,
    #[serde(default)]
    pub graphics: Vec<RawRecord>,
    #[serde(default)]
    pub sounds: Vec<RawRecord>,
    #[serde(default)]
    pub terrains: Vec<RawRecord>,
}

// ===========================================================================
// API templates
// ===========================================================================

/// A template definition in the API file.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTemplateData {
    /// Dotted name, e.g. `engine.ability.type.Live`.
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub members: Vec<ApiMemberData>,
}

/// A member declared by a template.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMemberData {
    pub name: String,
    #[serde(rename = "type")]
    pub member_type: MemberTypeData,
    #[serde(default)]
    pub default: Option<RawField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberTypeData {
    Int,
    Float,
    Bool,
    Text,
    File,
    Object,
    Set,
}

// ===========================================================================
// Names
// ===========================================================================

/// Names for records that cannot be derived from the data itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameData {
    #[serde(default)]
    pub units: Vec<NameEntry>,
    #[serde(default)]
    pub techs: Vec<NameEntry>,
    #[serde(default)]
    pub civs: Vec<NameEntry>,
}

/// `name` is the object name, `filename` the file stem it is written to.
#[derive(Debug, Clone, Deserialize)]
pub struct NameEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub filename: Option<String>,
}
