use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Record;

/// Account role. Unknown roles are kept verbatim so exact matching still
/// works for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Doctor,
    Patient,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Doctor => "Doctor",
            Role::Patient => "Patient",
            Role::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Doctor" => Role::Doctor,
            "Patient" => Role::Patient,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        match r {
            Role::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "userType")]
    pub role: Role,
}

impl User {
    /// Decode a `users/{uid}` document. `uid` must be present in the data;
    /// lookups filter on it.
    pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record.data))
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Link target of this doctor's review page.
    pub fn reviews_href(&self) -> String {
        format!("/view-reviews/{}", self.uid)
    }

    pub fn greeting(&self) -> String {
        format!("Hello {}.", self.first_name)
    }
}
