//! Deferred references between staging objects and the symbol table they
//! are resolved against.
//!
//! A [`DeferredRef`] names a staging object by `(group key, object id)`.
//! Nothing is checked when the reference is created: the target group may
//! not even exist yet. Once the whole graph is built, a [`SymbolTable`] is
//! collected from the group arena and every reference is resolved against
//! it. Missing targets are fatal at that point.

use crate::group::GroupArena;
use crate::id::GroupKey;
use crate::staging::Location;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference {reference} points into group {group}, which does not exist")]
    MissingGroup { reference: String, group: GroupKey },

    #[error("reference {reference}: group {group} has no object '{target}'")]
    MissingTarget {
        reference: String,
        group: GroupKey,
        target: String,
    },

    #[error("location chain starting at '{start}' is cyclic: {}", .chain.join(" -> "))]
    LocationCycle { start: String, chain: Vec<String> },
}

/// Forward pointer to a staging object inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeferredRef {
    group: GroupKey,
    target: String,
}

impl DeferredRef {
    pub fn new(group: GroupKey, target: impl Into<String>) -> Self {
        Self {
            group,
            target: target.into(),
        }
    }

    pub fn group(&self) -> GroupKey {
        self.group
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Look the target up in `symbols`.
    pub fn resolve<'a>(&self, symbols: &'a SymbolTable) -> Result<&'a Symbol, ReferenceError> {
        let objects = symbols
            .symbols
            .get(&self.group)
            .ok_or_else(|| ReferenceError::MissingGroup {
                reference: self.to_string(),
                group: self.group,
            })?;
        objects
            .get(&self.target)
            .ok_or_else(|| ReferenceError::MissingTarget {
                reference: self.to_string(),
                group: self.group,
                target: self.target.clone(),
            })
    }
}

impl fmt::Display for DeferredRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.target)
    }
}

/// What a staging object looks like from the outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Stable identifier written wherever the object is referenced.
    pub identifier: String,
    pub location: Location,
    pub filename: Option<String>,
}

/// Every staging object of a finished graph, addressable by
/// `(group key, object id)`.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<GroupKey, HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all staging objects of all groups.
    pub fn collect(groups: &GroupArena) -> Self {
        let mut table = Self::new();
        for (_, group) in groups.iter() {
            // Groups without objects still exist as reference targets.
            table.symbols.entry(group.key()).or_default();
            for object in group.staging_objects() {
                table.insert(
                    group.key(),
                    object.id(),
                    Symbol {
                        identifier: object.id().to_string(),
                        location: object.location().clone(),
                        filename: object.filename().map(str::to_string),
                    },
                );
            }
        }
        table
    }

    pub fn insert(&mut self, group: GroupKey, id: &str, symbol: Symbol) {
        self.symbols
            .entry(group)
            .or_default()
            .insert(id.to_string(), symbol);
    }

    pub fn lookup(&self, group: GroupKey, id: &str) -> Option<&Symbol> {
        self.symbols.get(&group).and_then(|objects| objects.get(id))
    }

    /// Number of symbols across all groups.
    pub fn len(&self) -> usize {
        self.symbols.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Follow nesting locations from `start` up to the first object with a
    /// concrete path. Returns that path and the root object's symbol.
    pub fn root_of(&self, start: &DeferredRef) -> Result<(&str, &Symbol), ReferenceError> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = start;
        loop {
            chain.push(current.to_string());
            if !visited.insert((current.group, current.target.as_str())) {
                return Err(ReferenceError::LocationCycle {
                    start: start.to_string(),
                    chain,
                });
            }
            let symbol = current.resolve(self)?;
            match &symbol.location {
                Location::Path(path) => return Ok((path.as_str(), symbol)),
                Location::Nested(parent) => current = parent,
            }
        }
    }

    /// Check once that every nesting chain in the table terminates in a
    /// concrete path.
    pub fn check_locations(&self) -> Result<(), ReferenceError> {
        for (group, objects) in &self.symbols {
            for id in objects.keys() {
                self.root_of(&DeferredRef::new(*group, id.as_str()))?;
            }
        }
        Ok(())
    }
}
