// file: src/models/user.rs
// description: user profile and presence records
// reference: https://api.mattermost.com/#tag/users

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub position: String,
    pub roles: String,
    pub locale: String,
    pub is_bot: bool,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStatus {
    pub user_id: String,
    /// online, away, dnd or offline
    pub status: String,
    pub manual: bool,
    pub last_activity_at: i64,
}
