//! Typed value members and their per-member diff rules.

use crate::record::{Record, RecordError};

/// Value held by a [`ValueMember`].
///
/// `NoDiff` only appears in diff results and marks a member whose two
/// sides were equal.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Reference to another table entry by index.
    Id(i64),
    String(String),
    Array(Vec<MemberValue>),
    /// Sub-records stored inline, e.g. resource storage slots of a unit.
    Container(Vec<Record>),
    NoDiff,
}

impl MemberValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            MemberValue::Int(_) => "int",
            MemberValue::Float(_) => "float",
            MemberValue::Bool(_) => "bool",
            MemberValue::Id(_) => "id",
            MemberValue::String(_) => "string",
            MemberValue::Array(_) => "array",
            MemberValue::Container(_) => "container",
            MemberValue::NoDiff => "nodiff",
        }
    }

    pub fn is_no_diff(&self) -> bool {
        matches!(self, MemberValue::NoDiff)
    }

    /// Integer view of the value. Ids count as integers.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            MemberValue::Int(v) | MemberValue::Id(v) => Some(v),
            _ => None,
        }
    }

    /// Float view of the value. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            MemberValue::Float(v) => Some(v),
            MemberValue::Int(v) | MemberValue::Id(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MemberValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            MemberValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[MemberValue]> {
        match self {
            MemberValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// An empty array also reads as an empty container; source documents
    /// cannot tell the two apart.
    pub fn as_container(&self) -> Option<&[Record]> {
        match self {
            MemberValue::Container(records) => Some(records),
            MemberValue::Array(values) if values.is_empty() => Some(&[]),
            _ => None,
        }
    }
}

/// A named member of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMember {
    name: String,
    value: MemberValue,
}

impl ValueMember {
    pub fn new(name: impl Into<String>, value: MemberValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, MemberValue::Int(value))
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, MemberValue::Float(value))
    }

    pub fn id(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, MemberValue::Id(value))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MemberValue::String(value.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &MemberValue {
        &self.value
    }

    pub fn is_no_diff(&self) -> bool {
        self.value.is_no_diff()
    }

    /// Diff this member against `other`.
    ///
    /// Numbers yield the delta `other - self`, scalars the other side's
    /// value, arrays and containers of equal length an element-wise diff.
    /// Equal sides yield [`MemberValue::NoDiff`].
    pub fn diff(&self, other: &ValueMember) -> Result<ValueMember, RecordError> {
        let value = diff_values(&self.name, &self.value, &other.value)?;
        Ok(ValueMember::new(self.name.clone(), value))
    }
}

fn diff_values(
    name: &str,
    left: &MemberValue,
    right: &MemberValue,
) -> Result<MemberValue, RecordError> {
    use MemberValue::*;

    let diff = match (left, right) {
        (Int(a), Int(b)) => {
            if a == b {
                NoDiff
            } else {
                Int(b.wrapping_sub(*a))
            }
        }
        (Float(a), Float(b)) => {
            if a == b {
                NoDiff
            } else {
                Float(b - a)
            }
        }
        (Bool(a), Bool(b)) => {
            if a == b {
                NoDiff
            } else {
                Bool(*b)
            }
        }
        (Id(a), Id(b)) => {
            if a == b {
                NoDiff
            } else {
                Id(*b)
            }
        }
        (String(a), String(b)) => {
            if a == b {
                NoDiff
            } else {
                String(b.clone())
            }
        }
        (Array(a), Array(b)) => {
            if a.len() != b.len() {
                Array(b.clone())
            } else {
                let diffs = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| diff_values(name, x, y))
                    .collect::<Result<Vec<_>, _>>()?;
                if diffs.iter().all(MemberValue::is_no_diff) {
                    NoDiff
                } else {
                    Array(diffs)
                }
            }
        }
        (Container(a), Container(b)) => {
            if a.len() != b.len() {
                Container(b.clone())
            } else {
                let diffs = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| x.diff(y))
                    .collect::<Result<Vec<_>, _>>()?;
                if diffs.iter().all(Record::is_no_diff) {
                    NoDiff
                } else {
                    Container(diffs)
                }
            }
        }
        (NoDiff, NoDiff) => NoDiff,
        _ => {
            return Err(RecordError::MemberTypeMismatch {
                member: name.to_string(),
                left: left.type_name(),
                right: right.type_name(),
            });
        }
    };

    Ok(diff)
}
