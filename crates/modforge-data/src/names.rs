//! Object names and file stems for units, techs and civilizations.
//!
//! Names come from an optional lookup file. Records missing from it fall
//! back to their own `name` field, and records without one to a name built
//! from their id.

use crate::loader::{DataLoadError, read_file};
use crate::schema::{NameData, NameEntry};
use modforge_core::record::Record;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Name of a converted entity: `name` prefixes its object ids, `filename`
/// is the stem of the file it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityName {
    pub name: String,
    pub filename: String,
}

impl EntityName {
    /// Derive both parts from free text, e.g. `Villager (Male)` becomes
    /// `VillagerMale` / `villager_male`.
    pub fn from_text(text: &str) -> Option<Self> {
        let name = object_name(text);
        if name.is_empty() {
            return None;
        }
        let filename = file_stem(&name);
        Some(Self { name, filename })
    }

    fn fallback(prefix: &str, id: i64) -> Self {
        Self {
            name: format!("{prefix}{id}"),
            filename: format!("{}_{id}", prefix.to_lowercase()),
        }
    }
}

/// Upper camel case identifier built from the alphanumeric words of `text`.
pub fn object_name(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Snake case file stem of an object name.
pub fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                stem.push('_');
            }
            stem.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            stem.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    stem
}

/// Lookup of entity names by record id.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    units: HashMap<i64, EntityName>,
    techs: HashMap<i64, EntityName>,
    civs: HashMap<i64, EntityName>,
}

fn entries_to_map(entries: &[NameEntry]) -> HashMap<i64, EntityName> {
    entries
        .iter()
        .map(|entry| {
            let name = object_name(&entry.name);
            let filename = entry.filename.clone().unwrap_or_else(|| file_stem(&name));
            (entry.id, EntityName { name, filename })
        })
        .collect()
}

fn lookup(map: &HashMap<i64, EntityName>, prefix: &str, id: i64, record: Option<&Record>) -> EntityName {
    if let Some(name) = map.get(&id) {
        return name.clone();
    }
    record
        .and_then(|r| r.get_str("name").ok())
        .and_then(EntityName::from_text)
        .unwrap_or_else(|| EntityName::fallback(prefix, id))
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a parsed name file. Object names must be unique
    /// within each section.
    pub fn from_data(data: &NameData, file: &Path) -> Result<Self, DataLoadError> {
        for section in [&data.units, &data.techs, &data.civs] {
            let mut seen = HashSet::new();
            for entry in section {
                let name = object_name(&entry.name);
                if !seen.insert(name.clone()) {
                    return Err(DataLoadError::DuplicateName {
                        file: file.to_path_buf(),
                        name,
                    });
                }
            }
        }
        Ok(Self {
            units: entries_to_map(&data.units),
            techs: entries_to_map(&data.techs),
            civs: entries_to_map(&data.civs),
        })
    }

    pub fn unit(&self, id: i64, record: Option<&Record>) -> EntityName {
        lookup(&self.units, "Unit", id, record)
    }

    pub fn tech(&self, id: i64, record: Option<&Record>) -> EntityName {
        lookup(&self.techs, "Tech", id, record)
    }

    pub fn civ(&self, id: i64, record: Option<&Record>) -> EntityName {
        lookup(&self.civs, "Civ", id, record)
    }

    /// Whether the name file lists unit `id`.
    pub fn has_unit(&self, id: i64) -> bool {
        self.units.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.units.len() + self.techs.len() + self.civs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read a name file.
pub fn load_names(path: &Path) -> Result<NameTable, DataLoadError> {
    let data: NameData = read_file(path)?;
    NameTable::from_data(&data, path)
}
