//! Reshaping of relational (`*_id`, `*_uid`) fields in read results.
//!
//! The server encodes a many2one value as `[id, display_name]`, or `false`
//! when unset. [`RelationShape`] selects what that becomes on the way back to
//! the caller.

use parse_display::{Display, FromStr};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::Result;

/// A record as returned by `read` and `search_read`.
pub type Record = Map<String, Value>;

/// `strftime` format of `date` field values.
pub const DEFAULT_SERVER_DATE_FORMAT: &str = "%Y-%m-%d";
/// `strftime` format of the time part of `datetime` field values.
pub const DEFAULT_SERVER_TIME_FORMAT: &str = "%H:%M:%S";
/// `strftime` format of `datetime` field values, always in UTC.
pub const DEFAULT_SERVER_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, FromStr)]
#[display(style = "kebab-case")]
pub enum RelationShape {
    /// Leave records untouched. No scan is made.
    #[default]
    PassThrough,
    /// `id`
    AsInt,
    /// `[id]`
    AsIntList,
    /// `{"id": id}`
    AsIdMapping,
    /// `[{"id": id}]`
    AsIdMappingList,
}

enum Relation {
    Empty,
    Id(i64),
    /// Not wire-shaped, e.g. already reshaped by an earlier pass.
    Other,
}

fn classify(value: &Value) -> Relation {
    match value {
        Value::Null | Value::Bool(false) => Relation::Empty,
        Value::Number(n) => match n.as_i64() {
            Some(0) => Relation::Empty,
            Some(id) if id > 0 => Relation::Id(id),
            _ => Relation::Other,
        },
        Value::Array(pair) if pair.len() == 2 => match pair[0].as_i64() {
            Some(0) => Relation::Empty,
            Some(id) if id > 0 => Relation::Id(id),
            _ => Relation::Other,
        },
        _ => Relation::Other,
    }
}

impl RelationShape {
    /// Rewrites one field value in place.
    pub fn apply(self, value: &mut Value) {
        if self == RelationShape::PassThrough {
            return;
        }
        let id = match classify(value) {
            Relation::Empty => {
                *value = Value::Null;
                return;
            }
            Relation::Id(id) => id,
            Relation::Other => return,
        };
        *value = match self {
            RelationShape::PassThrough => return,
            RelationShape::AsInt => json!(id),
            RelationShape::AsIntList => json!([id]),
            RelationShape::AsIdMapping => json!({ "id": id }),
            RelationShape::AsIdMappingList => json!([{ "id": id }]),
        };
    }
}

pub fn is_relational_field(name: &str) -> bool {
    name.ends_with("_id") || name.ends_with("_uid")
}

/// Reshapes the relational fields of `records`.
///
/// When `fields` is `None` (all fields were requested), the relational
/// fields are taken from the keys of the first record only and applied to
/// every record. A relational field missing from the first record is not
/// reshaped in later ones.
pub fn normalize(records: &mut [Record], fields: Option<&[String]>, shape: RelationShape) {
    if shape == RelationShape::PassThrough {
        return;
    }
    let Some(first) = records.first() else {
        return;
    };
    let id_fields: Vec<String> = match fields {
        Some(fields) => fields.iter().filter(|f| is_relational_field(f)).cloned().collect(),
        None => first.keys().filter(|f| is_relational_field(f)).cloned().collect(),
    };
    if id_fields.is_empty() {
        return;
    }
    tracing::trace!(%shape, ?id_fields, records = records.len(), "normalizing relational fields");
    for record in records.iter_mut() {
        for field in &id_fields {
            if let Some(value) = record.get_mut(field) {
                shape.apply(value);
            }
        }
    }
}

/// Decodes records into caller-defined types.
pub fn decode_records<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|r| Ok(serde_json::from_value(Value::Object(r))?))
        .collect()
}
