//! Staging objects: accumulators of parents and raw member values that
//! become target objects in two phases.
//!
//! 1. [`StagingObject::materialize`] builds the [`NyanObject`] from the
//!    declared parent templates.
//! 2. [`StagingObject::fill_members`] resolves every raw value (deferred
//!    references, media handles, lists, floats) and assigns it to the member
//!    declared by the raw member's origin template.
//!
//! Translators only ever touch the raw side. Both phases run right before
//! export, once every group of the graph exists.

use crate::media::{CombinedSound, CombinedSprite};
use crate::nyan::{ApiRegistry, MemberOperator, NyanError, NyanObject, NyanValue};
use crate::reference::{DeferredRef, ReferenceError, SymbolTable};
use tracing::trace;

/// Where a staging object is written: a directory relative to the modpack
/// root, or inside another staging object.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Path(String),
    Nested(DeferredRef),
}

impl From<DeferredRef> for Location {
    fn from(parent: DeferredRef) -> Self {
        Location::Nested(parent)
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Location::Path(path.to_string())
    }
}

/// An unresolved member value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    File(String),
    /// Identifier of an object that exists outside the staging graph.
    Object(String),
    Inf,
    Reference(DeferredRef),
    Sprite(CombinedSprite),
    Sound(CombinedSound),
    List(Vec<RawValue>),
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<DeferredRef> for RawValue {
    fn from(v: DeferredRef) -> Self {
        RawValue::Reference(v)
    }
}

impl From<CombinedSprite> for RawValue {
    fn from(v: CombinedSprite) -> Self {
        RawValue::Sprite(v)
    }
}

impl From<CombinedSound> for RawValue {
    fn from(v: CombinedSound) -> Self {
        RawValue::Sound(v)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(v: Vec<T>) -> Self {
        RawValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// A `(name, value, origin)` triple. `origin` is the dotted name of the
/// template that declares the member.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMember {
    pub name: String,
    pub value: RawValue,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StagingError {
    #[error("{object}: target object must be created before member values can be assigned")]
    NotMaterialized { object: String },

    #[error("{object}: target object has already been created")]
    AlreadyMaterialized { object: String },

    #[error("{object}: unknown parent template '{parent}'")]
    UnknownParent { object: String, parent: String },

    #[error("{object}: member '{member}' names unknown origin template '{origin}'")]
    UnknownOrigin {
        object: String,
        member: String,
        origin: String,
    },

    #[error("{object}: {source}")]
    Nyan { object: String, source: NyanError },

    #[error("{object}: {source}")]
    Reference {
        object: String,
        source: ReferenceError,
    },

    #[error("{object}: object is not ready for export, uninitialized members: {}", .missing.join(", "))]
    NotReady {
        object: String,
        missing: Vec<String>,
    },
}

/// Digits kept when floats are written out.
const FLOAT_PRECISION: i32 = 6;

/// Values too large to carry fractional digits are returned unchanged.
fn round_float(v: f64) -> f64 {
    let factor = 10f64.powi(FLOAT_PRECISION);
    let scaled = v * factor;
    if !scaled.is_finite() || scaled.abs() >= 2f64.powi(f64::MANTISSA_DIGITS as i32 - 1) {
        return v;
    }
    scaled.round() / factor
}

/// Everything needed to create one target object.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingObject {
    id: String,
    name: String,
    parents: Vec<String>,
    members: Vec<RawMember>,
    location: Location,
    filename: Option<String>,
    nyan_object: Option<NyanObject>,
}

impl StagingObject {
    /// `id` must be unique inside the owning group; `name` is the name of
    /// the target object.
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<Location>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parents: Vec::new(),
            members: Vec::new(),
            location: location.into(),
            filename: None,
            nyan_object: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_raw_parent(&mut self, parent: &str) {
        self.parents.push(parent.to_string());
    }

    pub fn raw_parents(&self) -> &[String] {
        &self.parents
    }

    pub fn add_raw_member(&mut self, name: &str, value: impl Into<RawValue>, origin: &str) {
        self.members.push(RawMember {
            name: name.to_string(),
            value: value.into(),
            origin: origin.to_string(),
        });
    }

    pub fn raw_members(&self) -> &[RawMember] {
        &self.members
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<Location>) {
        self.location = location.into();
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Set the output file name; `.nyan` is appended.
    pub fn set_filename(&mut self, stem: &str) {
        self.set_filename_with_suffix(stem, "nyan");
    }

    pub fn set_filename_with_suffix(&mut self, stem: &str, suffix: &str) {
        self.filename = Some(format!("{stem}.{suffix}"));
    }

    pub fn nyan_object(&self) -> Result<&NyanObject, StagingError> {
        self.nyan_object
            .as_ref()
            .ok_or_else(|| StagingError::NotMaterialized {
                object: self.id.clone(),
            })
    }

    pub fn is_materialized(&self) -> bool {
        self.nyan_object.is_some()
    }

    /// Create the target object from the declared parents.
    pub fn materialize(&mut self, registry: &ApiRegistry) -> Result<(), StagingError> {
        if self.nyan_object.is_some() {
            return Err(StagingError::AlreadyMaterialized {
                object: self.id.clone(),
            });
        }

        let parents = self
            .parents
            .iter()
            .map(|parent| {
                registry
                    .template_id(parent)
                    .ok_or_else(|| StagingError::UnknownParent {
                        object: self.id.clone(),
                        parent: parent.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.nyan_object = Some(NyanObject::new(&self.name, parents, registry));
        Ok(())
    }

    /// Resolve every raw member and assign it to the target object.
    pub fn fill_members(
        &mut self,
        registry: &ApiRegistry,
        symbols: &SymbolTable,
    ) -> Result<(), StagingError> {
        let Some(nyan_object) = self.nyan_object.as_mut() else {
            return Err(StagingError::NotMaterialized {
                object: self.id.clone(),
            });
        };

        for member in &self.members {
            let origin = registry.template_id(&member.origin).ok_or_else(|| {
                StagingError::UnknownOrigin {
                    object: self.id.clone(),
                    member: member.name.clone(),
                    origin: member.origin.clone(),
                }
            })?;

            let value =
                resolve_value(&member.value, symbols, false).map_err(|source| {
                    StagingError::Reference {
                        object: self.id.clone(),
                        source,
                    }
                })?;
            trace!(object = %self.id, member = %member.name, %value, "assign member");

            nyan_object
                .get_member_by_name(&member.name, origin, registry)
                .and_then(|slot| slot.set_value(value, MemberOperator::Assign))
                .map_err(|source| StagingError::Nyan {
                    object: self.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Materialized and no member left without a value.
    pub fn is_ready(&self) -> bool {
        self.nyan_object
            .as_ref()
            .is_some_and(|object| !object.is_abstract())
    }

    /// Fail with the list of missing members unless the object is ready.
    pub fn ensure_ready(&self) -> Result<(), StagingError> {
        let object = self.nyan_object()?;
        if object.is_abstract() {
            return Err(StagingError::NotReady {
                object: self.id.clone(),
                missing: object
                    .uninitialized_members()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            });
        }
        Ok(())
    }

    /// Directory and file name the object is written to.
    ///
    /// Nested objects live in the directory of their root ancestor. They
    /// keep their own file name if one was set and otherwise share the
    /// root's file.
    pub fn get_file_location(
        &self,
        symbols: &SymbolTable,
    ) -> Result<(String, Option<String>), StagingError> {
        match &self.location {
            Location::Path(path) => Ok((path.clone(), self.filename.clone())),
            Location::Nested(parent) => {
                let (directory, root) =
                    symbols
                        .root_of(parent)
                        .map_err(|source| StagingError::Reference {
                            object: self.id.clone(),
                            source,
                        })?;
                let filename = self.filename.clone().or_else(|| root.filename.clone());
                Ok((directory.to_string(), filename))
            }
        }
    }
}

/// Resolve a raw value. Floats are rounded at the top level only; list
/// elements only have their references and media handles resolved.
fn resolve_value(
    value: &RawValue,
    symbols: &SymbolTable,
    in_list: bool,
) -> Result<NyanValue, ReferenceError> {
    let resolved = match value {
        RawValue::Reference(reference) => {
            NyanValue::Object(reference.resolve(symbols)?.identifier.clone())
        }
        RawValue::Sprite(sprite) => NyanValue::File(sprite.relative_sprite_location()),
        RawValue::Sound(sound) => NyanValue::File(sound.relative_file_location()),
        RawValue::List(items) => NyanValue::Set(
            items
                .iter()
                .map(|item| resolve_value(item, symbols, true))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        RawValue::Float(v) if !in_list => NyanValue::Float(round_float(*v)),
        RawValue::Float(v) => NyanValue::Float(*v),
        RawValue::Int(v) => NyanValue::Int(*v),
        RawValue::Bool(v) => NyanValue::Bool(*v),
        RawValue::Text(v) => NyanValue::Text(v.clone()),
        RawValue::File(v) => NyanValue::File(v.clone()),
        RawValue::Object(v) => NyanValue::Object(v.clone()),
        RawValue::Inf => NyanValue::Inf,
    };
    Ok(resolved)
}
