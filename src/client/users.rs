// file: src/client/users.rs
// description: user profiles, search and presence
// reference: https://api.mattermost.com/#tag/users

use super::http::MattermostClient;
use crate::error::Result;
use crate::models::{User, UserStatus};
use crate::utils::Validator;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct UserSearch {
    /// matched against username, names, nickname and email
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_in_channel_id: Option<String>,
    pub limit: u32,
}

impl UserSearch {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            team_id: None,
            in_channel_id: None,
            not_in_channel_id: None,
            limit: 50,
        }
    }
}

impl MattermostClient {
    pub async fn get_user_profile(&self, user_id: &str) -> Result<User> {
        Validator::validate_id("user_id", user_id)?;

        if let Some(user) = self.cache.users.get(user_id).await {
            return Ok(user);
        }

        let user: User = self.get_json(&format!("users/{}", user_id)).await?;
        self.cache.users.insert(user_id, user.clone()).await;
        Ok(user)
    }

    /// Profiles for `user_ids` in request order; only cache misses hit the server.
    pub async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
        Validator::validate_ids("user_id", user_ids)?;

        let mut found: HashMap<String, User> = HashMap::new();
        let mut missing: Vec<&String> = Vec::new();

        for user_id in user_ids {
            match self.cache.users.get(user_id).await {
                Some(user) => {
                    found.insert(user_id.clone(), user);
                }
                None if !missing.contains(&user_id) => missing.push(user_id),
                None => {}
            }
        }

        if !missing.is_empty() {
            debug!(
                "Fetching {} of {} users ({} cached)",
                missing.len(),
                user_ids.len(),
                found.len()
            );
            let fetched: Vec<User> = self.post_json("users/ids", &missing).await?;
            for user in fetched {
                self.cache.users.insert(user.id.clone(), user.clone()).await;
                found.insert(user.id.clone(), user);
            }
        }

        Ok(user_ids
            .iter()
            .filter_map(|id| found.get(id).cloned())
            .collect())
    }

    pub async fn search_users(&self, search: &UserSearch) -> Result<Vec<User>> {
        Validator::validate_not_empty("query", &search.term)?;
        for (kind, id) in [
            ("team_id", &search.team_id),
            ("in_channel_id", &search.in_channel_id),
            ("not_in_channel_id", &search.not_in_channel_id),
        ] {
            if let Some(id) = id {
                Validator::validate_id(kind, id)?;
            }
        }

        self.post_json("users/search", search).await
    }

    pub async fn get_user_status(&self, user_id: &str) -> Result<UserStatus> {
        Validator::validate_id("user_id", user_id)?;
        self.get_json(&format!("users/{}/status", user_id)).await
    }

    pub async fn get_users_status(&self, user_ids: &[String]) -> Result<Vec<UserStatus>> {
        Validator::validate_ids("user_id", user_ids)?;
        self.post_json("users/status/ids", user_ids).await
    }
}
