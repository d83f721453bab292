use serde_json::Value;

use crate::store::Record;

/// A review document exactly as stored; `stars` is unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReview {
    pub id: String,
    pub stars: Option<Value>,
    pub message: Option<String>,
}

impl From<Record> for RawReview {
    fn from(r: Record) -> Self {
        let Record { id, mut data } = r;
        Self {
            id,
            stars: data.remove("stars").filter(|v| !v.is_null()),
            message: data
                .remove("message")
                .and_then(|v| v.as_str().map(str::to_string)),
        }
    }
}
