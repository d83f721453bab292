use serde::Serialize;

use crate::directory::repo_types::{Role, User};

/// One card in the doctor directory.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub uid: String,
    pub name: String,
    pub href: String,
}

impl From<User> for DirectoryEntry {
    fn from(u: User) -> Self {
        Self {
            name: u.display_name(),
            href: u.reviews_href(),
            uid: u.uid,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: Role,
    pub greeting: String,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            greeting: u.greeting(),
            uid: u.uid,
            first_name: u.first_name,
            last_name: u.last_name,
            user_type: u.role,
        }
    }
}
