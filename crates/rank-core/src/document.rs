use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding a document's identifier.
pub const ID_FIELD_NAME: &str = "_id";

/// Field holding a document's order key.
pub const ORDER_FIELD_NAME: &str = "orderRank";

/// Anything with a stable identifier and a mutable order key.
pub trait Orderable {
    fn id(&self) -> &str;
    fn order_key(&self) -> &str;
    fn set_order_key(&mut self, key: String);
}

/// A JSON document as stored by the content backend.
///
/// Only `_id` and `orderRank` are interpreted; every other field is carried
/// through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    /// Missing in documents that were never ranked.
    #[serde(rename = "orderRank", default)]
    pub order_rank: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, order_rank: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order_rank: order_rank.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Orderable for Document {
    fn id(&self) -> &str {
        &self.id
    }

    fn order_key(&self) -> &str {
        &self.order_rank
    }

    fn set_order_key(&mut self, key: String) {
        self.order_rank = key;
    }
}
