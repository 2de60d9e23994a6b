//! Candidate records returned by retrievers.
//!
//! A record coming back from the vector database is a schema-free JSON object.
//! It becomes a [`Candidate`]: the identity and distance the fusion engine
//! needs are lifted into typed fields, everything else stays in `fields`.
//!
//! ```ascii
//! {"ID": 42, "title": "...", "@distance": 0.12}
//!                 │
//!                 ▼
//! Candidate { id: Int(42), distance: Some(0.12), fields: {"ID": 42, "title": "..."} }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Result, SearchError};

/// Key under which the service reports distances when `withDistance` is set.
pub const DISTANCE_KEY: &str = "@distance";

/// A schema-free record as returned by the retrieval collaborator.
pub type Record = Map<String, Value>;

/// Ordered candidates from one retriever for one query.
pub type CandidateList = Vec<Candidate>;

/// Identity of a candidate within a retrieval source.
///
/// Integer and string ids never compare equal, so `1` and `"1"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    /// Integer primary key.
    Int(i64),
    /// String primary key.
    Str(String),
}

impl CandidateId {
    /// Read an id from a JSON value. Only strings and integers qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Int),
            _ => None,
        }
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateId::Int(id) => write!(f, "{}", id),
            CandidateId::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for CandidateId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// A single retrieved record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Value of the retriever's primary-key field.
    pub id: CandidateId,
    /// Dissimilarity reported by the source (lower is more similar).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Remaining response fields, primary key included.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Candidate {
    /// Create a candidate with no extra fields.
    pub fn new(id: impl Into<CandidateId>, distance: Option<f64>) -> Self {
        Self {
            id: id.into(),
            distance,
            fields: Map::new(),
        }
    }

    /// Attach a response field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Build a candidate from a raw record.
    ///
    /// `table` is only used to give errors context.
    ///
    /// # Errors
    ///
    /// - [`SearchError::MissingPrimaryKey`] if `primary_key_field` is absent
    /// - [`SearchError::InvalidRecord`] if the key is not a string/integer or
    ///   the distance is not a number
    pub fn from_record(mut record: Record, primary_key_field: &str, table: &str) -> Result<Self> {
        let id = match record.get(primary_key_field) {
            Some(value) => CandidateId::from_value(value).ok_or_else(|| {
                SearchError::InvalidRecord {
                    table: table.to_string(),
                    message: format!(
                        "primary key field {} must be a string or integer, got {}",
                        primary_key_field, value
                    ),
                }
            })?,
            None => {
                return Err(SearchError::MissingPrimaryKey {
                    table: table.to_string(),
                    field: primary_key_field.to_string(),
                })
            }
        };

        let distance = match record.remove(DISTANCE_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(SearchError::InvalidRecord {
                    table: table.to_string(),
                    message: format!("{} must be numeric, got {}", DISTANCE_KEY, other),
                })
            }
        };

        Ok(Self {
            id,
            distance,
            fields: record,
        })
    }

    /// Look up a response field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_from_record_lifts_id_and_distance() {
        let rec = record(json!({"ID": 42, "title": "Rust", "@distance": 0.25}));
        let candidate = Candidate::from_record(rec, "ID", "Docs").unwrap();

        assert_eq!(candidate.id, CandidateId::Int(42));
        assert_eq!(candidate.distance, Some(0.25));
        assert_eq!(candidate.field("title"), Some(&json!("Rust")));
        assert_eq!(candidate.field("ID"), Some(&json!(42)));
        assert!(candidate.field(DISTANCE_KEY).is_none());
    }

    #[test]
    fn test_from_record_string_id_without_distance() {
        let rec = record(json!({"doc_id": "a-1"}));
        let candidate = Candidate::from_record(rec, "doc_id", "Docs").unwrap();

        assert_eq!(candidate.id, CandidateId::from("a-1"));
        assert!(candidate.distance.is_none());
    }

    #[test]
    fn test_from_record_missing_primary_key() {
        let rec = record(json!({"title": "orphan"}));
        let err = Candidate::from_record(rec, "ID", "Docs").unwrap_err();

        match err {
            SearchError::MissingPrimaryKey { table, field } => {
                assert_eq!(table, "Docs");
                assert_eq!(field, "ID");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_record_rejects_float_id() {
        let rec = record(json!({"ID": 1.5}));
        let err = Candidate::from_record(rec, "ID", "Docs").unwrap_err();
        assert!(matches!(err, SearchError::InvalidRecord { .. }));
    }

    #[test]
    fn test_from_record_rejects_text_distance() {
        let rec = record(json!({"ID": 1, "@distance": "near"}));
        let err = Candidate::from_record(rec, "ID", "Docs").unwrap_err();
        assert!(matches!(err, SearchError::InvalidRecord { .. }));
    }

    #[test]
    fn test_int_and_string_ids_are_distinct() {
        assert_ne!(CandidateId::Int(1), CandidateId::from("1"));
        assert_eq!(CandidateId::Int(1).to_string(), "1");
    }

    #[test]
    fn test_candidate_id_untagged_serde() {
        let ids: Vec<CandidateId> = serde_json::from_value(json!([3, "x"])).unwrap();
        assert_eq!(ids, vec![CandidateId::Int(3), CandidateId::from("x")]);
    }
}
