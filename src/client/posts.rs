// file: src/client/posts.rs
// description: reading, searching, sending, editing and pinning messages
// reference: https://api.mattermost.com/#tag/posts

use super::http::{MattermostClient, StatusResponse};
use crate::error::Result;
use crate::models::{Post, PostList};
use crate::utils::Validator;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

/// Pagination and time filters for channel history
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub page: u32,
    /// clamped to 200
    pub per_page: u32,
    /// only posts modified since this unix time in milliseconds
    pub since: Option<i64>,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 60,
            since: None,
            before: None,
            after: None,
        }
    }
}

impl PostQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", Validator::clamp_per_page(self.per_page).to_string()),
        ];
        if let Some(since) = self.since {
            params.push(("since", since.to_string()));
        }
        if let Some(before) = self.before.as_ref().filter(|b| !b.is_empty()) {
            params.push(("before", before.clone()));
        }
        if let Some(after) = self.after.as_ref().filter(|a| !a.is_empty()) {
            params.push(("after", after.clone()));
        }
        params
    }
}

/// Team-wide message search
#[derive(Debug, Clone)]
pub struct PostSearch {
    pub terms: String,
    pub team_id: Option<String>,
    pub is_or_search: bool,
    /// seconds east of UTC
    pub time_zone_offset: i32,
    pub include_deleted_channels: bool,
    pub page: u32,
    pub per_page: u32,
}

impl PostSearch {
    pub fn new(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            team_id: None,
            is_or_search: false,
            time_zone_offset: 0,
            include_deleted_channels: false,
            page: 0,
            per_page: 20,
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    terms: &'a str,
    is_or_search: bool,
    time_zone_offset: i32,
    include_deleted_channels: bool,
    page: u32,
    per_page: u32,
}

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    channel_id: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    root_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_ids: Option<&'a [String]>,
}

impl MattermostClient {
    pub async fn get_posts(&self, channel_id: &str, query: &PostQuery) -> Result<PostList> {
        Validator::validate_id("channel_id", channel_id)?;
        let posts: PostList = self
            .get_json_with_query(&format!("channels/{}/posts", channel_id), &query.to_params())
            .await?;
        if posts.is_empty() {
            debug!("No posts in channel {} for this query", channel_id);
        } else {
            debug!("Fetched {} posts from channel {}", posts.len(), channel_id);
        }
        Ok(posts)
    }

    pub async fn search_posts(&self, search: &PostSearch) -> Result<PostList> {
        let team_id = self.resolve_team(search.team_id.as_deref())?;
        Validator::validate_not_empty("query", &search.terms)?;

        let request = SearchRequest {
            terms: &search.terms,
            is_or_search: search.is_or_search,
            time_zone_offset: search.time_zone_offset,
            include_deleted_channels: search.include_deleted_channels,
            page: search.page,
            per_page: Validator::clamp_per_page(search.per_page),
        };

        self.post_json(&format!("teams/{}/posts/search", team_id), &request)
            .await
    }

    /// Posts a message, optionally as a thread reply or with uploaded files.
    pub async fn send_message(
        &self,
        channel_id: &str,
        message: &str,
        root_id: Option<&str>,
        file_ids: &[String],
    ) -> Result<Post> {
        Validator::validate_id("channel_id", channel_id)?;
        let root_id = root_id.filter(|r| !r.is_empty());
        if let Some(root_id) = root_id {
            Validator::validate_id("root_id", root_id)?;
        }
        if file_ids.is_empty() {
            Validator::validate_not_empty("message", message)?;
        } else {
            Validator::validate_ids("file_id", file_ids)?;
        }

        let request = CreatePostRequest {
            channel_id,
            message,
            root_id,
            file_ids: (!file_ids.is_empty()).then_some(file_ids),
        };

        let post: Post = self.post_json("posts", &request).await?;
        info!(
            "Posted {} to channel {}{}: {}",
            post.id,
            channel_id,
            if post.is_reply() { " (thread reply)" } else { "" },
            Validator::truncate_text(message, 60)
        );
        Ok(post)
    }

    pub async fn update_message(&self, post_id: &str, message: &str) -> Result<Post> {
        Validator::validate_id("post_id", post_id)?;
        Validator::validate_not_empty("message", message)?;
        self.put_json(
            &format!("posts/{}/patch", post_id),
            &json!({ "message": message }),
        )
        .await
    }

    pub async fn delete_message(&self, post_id: &str) -> Result<StatusResponse> {
        Validator::validate_id("post_id", post_id)?;
        self.delete_json(&format!("posts/{}", post_id)).await
    }

    pub async fn pin_message(&self, post_id: &str) -> Result<StatusResponse> {
        self.set_pinned(post_id, true).await
    }

    pub async fn unpin_message(&self, post_id: &str) -> Result<StatusResponse> {
        self.set_pinned(post_id, false).await
    }

    async fn set_pinned(&self, post_id: &str, pinned: bool) -> Result<StatusResponse> {
        Validator::validate_id("post_id", post_id)?;
        let action = if pinned { "pin" } else { "unpin" };
        self.post_json(&format!("posts/{}/{}", post_id, action), &json!({}))
            .await
    }
}
