//! Modforge Core -- the conversion object model and linking engine.
//!
//! This crate turns flat, index-addressed game-data records into a graph of
//! typed API objects. It provides the record/diff model, the target-object
//! runtime, staging objects, deferred references and the linking engine
//! that rebuilds unit lines, building lines, tech groups and civilizations
//! from connection metadata.
//!
//! # Conversion Pipeline
//!
//! 1. **Extract** -- Source tables are read into a [`dataset::DataSet`]
//!    (see `modforge-data`).
//! 2. **Link** -- [`linker::link`] sanitizes effect bundles and creates all
//!    record groups.
//! 3. **Translate** -- Translators attach [`staging::StagingObject`]s to the
//!    groups (see `modforge-translate`). Objects may reference objects that
//!    do not exist yet through [`reference::DeferredRef`].
//! 4. **Finalize** -- [`pipeline::finalize`] materializes every staging
//!    object, checks all location chains and fills all members.
//! 5. **Export** -- Ready objects are written to files (see
//!    `modforge-export`).
//!
//! # Two-Phase Staging Objects
//!
//! Staging objects are built from raw parts and only become target objects
//! at the end:
//!
//! ```rust,ignore
//! let mut live = StagingObject::new("Archer.Live", "Live", DeferredRef::new(key, "Archer"));
//! live.add_raw_parent("engine.ability.type.Live");
//! live.add_raw_member("attributes", vec![DeferredRef::new(key, "Archer.Live.Health")], "engine.ability.type.Live");
//! ```
//!
//! # Key Types
//!
//! - [`record::Record`] -- Keyed container of named value members with
//!   structural diffing.
//! - [`nyan::ApiRegistry`] -- Immutable registry of API templates (frozen
//!   before conversion starts).
//! - [`staging::StagingObject`] -- Parents and raw members pending
//!   materialization.
//! - [`group::GroupArena`] -- Arena of record groups addressed by
//!   [`id::GroupKey`].
//! - [`reference::SymbolTable`] -- Snapshot of all staging objects that
//!   deferred references resolve against.
//! - [`tech::TechGroup`] -- Classified tech (age, stat, unlock, line upgrade,
//!   civ bonus).

pub mod civ;
pub mod connection;
pub mod dataset;
pub mod effect;
pub mod group;
pub mod id;
pub mod linker;
pub mod media;
pub mod nyan;
pub mod pipeline;
pub mod record;
pub mod reference;
pub mod staging;
pub mod tech;
pub mod time;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
