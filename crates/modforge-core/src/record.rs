//! Records extracted from the source data and their structural diff.

use crate::id::RecordId;
use crate::value::{MemberValue, ValueMember};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which source table a record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Unit,
    Tech,
    Effect,
    EffectBundle,
    Civilization,
    AgeConnection,
    BuildingConnection,
    UnitConnection,
    TechConnection,
    Graphic,
    Sound,
    Terrain,
    /// A sub-record stored inside a container member.
    Entry,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record {left_id} ({left:?}) cannot be diffed with record {right_id} ({right:?})")]
    KindMismatch {
        left_id: RecordId,
        left: RecordKind,
        right_id: RecordId,
        right: RecordKind,
    },

    #[error("record {record} pairs {tags} connection tags with {ids} connected ids")]
    ParallelLengthMismatch {
        record: RecordId,
        tags: usize,
        ids: usize,
    },

    #[error("member '{member}' of type {left} cannot be diffed with type {right}")]
    MemberTypeMismatch {
        member: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("record {record} has no member '{member}'")]
    MissingMember { record: RecordId, member: String },

    #[error("member '{member}' of record {record} is not a {expected}")]
    WrongType {
        record: RecordId,
        member: String,
        expected: &'static str,
    },

    #[error("field '{member}' of record {record} is not a value member")]
    NotAMember { record: RecordId, member: String },
}

/// A keyed container of named value members.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    kind: RecordKind,
    members: HashMap<String, ValueMember>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, kind: RecordKind) -> Self {
        Self {
            id: id.into(),
            kind,
            members: HashMap::new(),
        }
    }

    pub fn with_members(
        id: impl Into<RecordId>,
        kind: RecordKind,
        members: impl IntoIterator<Item = ValueMember>,
    ) -> Self {
        let mut record = Self::new(id, kind);
        record.add_members(members);
        record
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Re-key the record. Only used while the extraction pass still owns
    /// the tables (effect re-indexing during sanitation).
    pub(crate) fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    /// Insert a member, replacing any member with the same name.
    /// Returns the replaced member.
    pub fn add_member(&mut self, member: ValueMember) -> Option<ValueMember> {
        self.members.insert(member.name().to_string(), member)
    }

    pub fn add_members(&mut self, members: impl IntoIterator<Item = ValueMember>) {
        for member in members {
            self.add_member(member);
        }
    }

    pub fn get_member(&self, name: &str) -> Result<&ValueMember, RecordError> {
        self.members
            .get(name)
            .ok_or_else(|| RecordError::MissingMember {
                record: self.id.clone(),
                member: name.to_string(),
            })
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn remove_member(&mut self, name: &str) -> Result<ValueMember, RecordError> {
        self.members
            .remove(name)
            .ok_or_else(|| RecordError::MissingMember {
                record: self.id.clone(),
                member: name.to_string(),
            })
    }

    pub fn members(&self) -> impl Iterator<Item = &ValueMember> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if every member is a no-diff marker.
    pub fn is_no_diff(&self) -> bool {
        self.members.values().all(ValueMember::is_no_diff)
    }

    pub fn get_int(&self, name: &str) -> Result<i64, RecordError> {
        self.get_member(name)?
            .value()
            .as_int()
            .ok_or_else(|| self.wrong_type(name, "integer"))
    }

    /// Integer member, or `default` if the record does not carry it.
    /// Unit records only carry the fields of their unit type.
    pub fn int_or(&self, name: &str, default: i64) -> Result<i64, RecordError> {
        if self.has_member(name) {
            self.get_int(name)
        } else {
            Ok(default)
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f64, RecordError> {
        self.get_member(name)?
            .value()
            .as_float()
            .ok_or_else(|| self.wrong_type(name, "number"))
    }

    pub fn get_str(&self, name: &str) -> Result<&str, RecordError> {
        self.get_member(name)?
            .value()
            .as_str()
            .ok_or_else(|| self.wrong_type(name, "string"))
    }

    pub fn get_container(&self, name: &str) -> Result<&[Record], RecordError> {
        self.get_member(name)?
            .value()
            .as_container()
            .ok_or_else(|| self.wrong_type(name, "container"))
    }

    pub fn get_array(&self, name: &str) -> Result<&[MemberValue], RecordError> {
        self.get_member(name)?
            .value()
            .as_array()
            .ok_or_else(|| self.wrong_type(name, "array"))
    }

    fn wrong_type(&self, name: &str, expected: &'static str) -> RecordError {
        RecordError::WrongType {
            record: self.id.clone(),
            member: name.to_string(),
            expected,
        }
    }

    /// Diff every member of `self` against the same-named member of `other`.
    pub fn diff(&self, other: &Record) -> Result<Record, RecordError> {
        self.diff_members(other, false, "diff")
    }

    /// Like [`Record::diff`], but members without a difference are dropped.
    pub fn short_diff(&self, other: &Record) -> Result<Record, RecordError> {
        self.diff_members(other, true, "sdiff")
    }

    fn diff_members(
        &self,
        other: &Record,
        skip_no_diff: bool,
        suffix: &str,
    ) -> Result<Record, RecordError> {
        if self.kind != other.kind {
            return Err(RecordError::KindMismatch {
                left_id: self.id.clone(),
                left: self.kind,
                right_id: other.id.clone(),
                right: other.kind,
            });
        }

        let mut result = Record::new(
            RecordId::Derived(format!("{}-{}-{suffix}", self.id, other.id)),
            self.kind,
        );
        for member in self.members.values() {
            let member_diff = member.diff(other.get_member(member.name())?)?;
            if skip_no_diff && member_diff.is_no_diff() {
                continue;
            }
            result.add_member(member_diff);
        }
        Ok(result)
    }
}
