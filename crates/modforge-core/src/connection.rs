//! Typed view of the per-record connection metadata that drives linking.

use crate::record::{Record, RecordError};

/// Position of a record inside its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Shown in the age progress bar.
    AgeProgress,
    FirstInLine,
    Continuation,
    Other(i64),
}

impl From<i64> for LineMode {
    fn from(raw: i64) -> Self {
        match raw {
            0 => LineMode::AgeProgress,
            2 => LineMode::FirstInLine,
            3 => LineMode::Continuation,
            other => LineMode::Other(other),
        }
    }
}

/// What the other side of a connection entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTag {
    Age,
    Building,
    Unit,
    Research,
    Other(i64),
}

impl From<i64> for ConnectionTag {
    fn from(raw: i64) -> Self {
        match raw {
            0 => ConnectionTag::Age,
            1 => ConnectionTag::Building,
            2 => ConnectionTag::Unit,
            3 => ConnectionTag::Research,
            other => ConnectionTag::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub other_id: i64,
    pub tag: ConnectionTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Age,
    Building,
    Unit,
    Tech,
}

/// Connection metadata of one unit, building, tech or age.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: i64,
    pub kind: ConnectionKind,
    /// Line the record belongs to. Buildings and techs use their own id.
    pub line_id: i64,
    pub line_mode: LineMode,
    /// Related records, in source order.
    pub entries: Vec<ConnectionEntry>,
    /// -1 when absent.
    pub required_research: i64,
    /// -1 when absent.
    pub enabling_research: i64,
}

impl Connection {
    /// Read a connection from its source record.
    ///
    /// The related records are stored in two parallel fields,
    /// `other_connections` (nested records carrying the tag) and
    /// `other_connected_ids`. Both must have the same length.
    pub fn from_record(record: &Record, kind: ConnectionKind) -> Result<Self, RecordError> {
        let id = record.get_int("id")?;
        let line_id = record.int_or("vertical_line", id)?;
        let line_mode = LineMode::from(record.int_or("line_mode", 1)?);

        let mut entries = Vec::new();
        if record.has_member("other_connections") {
            let tags = record.get_container("other_connections")?;
            let ids = record.get_array("other_connected_ids")?;
            if tags.len() != ids.len() {
                return Err(RecordError::ParallelLengthMismatch {
                    record: record.id().clone(),
                    tags: tags.len(),
                    ids: ids.len(),
                });
            }
            for (tag_record, other) in tags.iter().zip(ids) {
                let tag = ConnectionTag::from(tag_record.get_int("other_connection")?);
                let other_id = other.as_int().ok_or_else(|| RecordError::WrongType {
                    record: record.id().clone(),
                    member: "other_connected_ids".to_string(),
                    expected: "integer",
                })?;
                entries.push(ConnectionEntry { other_id, tag });
            }
        }

        Ok(Self {
            id,
            kind,
            line_id,
            line_mode,
            entries,
            required_research: record.int_or("required_research", -1)?,
            enabling_research: record.int_or("enabling_research", -1)?,
        })
    }

    /// First related record with `tag`. Later matches are ignored.
    pub fn first_with_tag(&self, tag: ConnectionTag) -> Option<&ConnectionEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    pub fn is_first_in_line(&self) -> bool {
        self.line_mode == LineMode::FirstInLine
    }

    /// Available from the start: no research required or enabling it.
    pub fn is_initially_available(&self) -> bool {
        self.required_research == -1 && self.enabling_research == -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use crate::record::RecordKind;
    use crate::value::{MemberValue, ValueMember};

    fn tag(value: i64) -> Record {
        Record::with_members(
            0,
            RecordKind::Entry,
            [ValueMember::int("other_connection", value)],
        )
    }

    fn unit_connection() -> Record {
        Record::with_members(
            11,
            RecordKind::UnitConnection,
            [
                ValueMember::id("id", 11),
                ValueMember::int("vertical_line", 4),
                ValueMember::int("line_mode", 3),
                ValueMember::new(
                    "other_connections",
                    MemberValue::Container(vec![tag(3), tag(2), tag(2)]),
                ),
                ValueMember::new(
                    "other_connected_ids",
                    MemberValue::Array(vec![
                        MemberValue::Int(99),
                        MemberValue::Int(10),
                        MemberValue::Int(7),
                    ]),
                ),
                ValueMember::int("required_research", 22),
            ],
        )
    }

    #[test]
    fn reads_unit_connection() {
        let conn = Connection::from_record(&unit_connection(), ConnectionKind::Unit).unwrap();
        assert_eq!(conn.id, 11);
        assert_eq!(conn.line_id, 4);
        assert_eq!(conn.line_mode, LineMode::Continuation);
        assert_eq!(conn.entries.len(), 3);
        assert_eq!(conn.required_research, 22);
        assert_eq!(conn.enabling_research, -1);
        assert!(!conn.is_initially_available());
    }

    #[test]
    fn first_match_wins() {
        let conn = Connection::from_record(&unit_connection(), ConnectionKind::Unit).unwrap();
        assert_eq!(conn.first_with_tag(ConnectionTag::Unit).unwrap().other_id, 10);
        assert!(conn.first_with_tag(ConnectionTag::Age).is_none());
    }

    #[test]
    fn unpaired_connection_entries_are_rejected() {
        let record = Record::with_members(
            2,
            RecordKind::TechConnection,
            [
                ValueMember::id("id", 2),
                ValueMember::new(
                    "other_connections",
                    MemberValue::Container(vec![tag(2), tag(0)]),
                ),
                ValueMember::new(
                    "other_connected_ids",
                    MemberValue::Array(vec![MemberValue::Int(5)]),
                ),
            ],
        );
        assert_eq!(
            Connection::from_record(&record, ConnectionKind::Tech),
            Err(RecordError::ParallelLengthMismatch {
                record: RecordId::Index(2),
                tags: 2,
                ids: 1,
            })
        );
    }

    #[test]
    fn building_line_defaults_to_own_id() {
        let record = Record::with_members(
            12,
            RecordKind::BuildingConnection,
            [ValueMember::id("id", 12)],
        );
        let conn = Connection::from_record(&record, ConnectionKind::Building).unwrap();
        assert_eq!(conn.line_id, 12);
        assert!(conn.entries.is_empty());
        assert!(conn.is_initially_available());
    }

    #[test]
    fn raw_codes() {
        assert_eq!(LineMode::from(0), LineMode::AgeProgress);
        assert_eq!(LineMode::from(2), LineMode::FirstInLine);
        assert_eq!(LineMode::from(7), LineMode::Other(7));
        assert_eq!(ConnectionTag::from(1), ConnectionTag::Building);
        assert_eq!(ConnectionTag::from(-1), ConnectionTag::Other(-1));
    }
}
