// file: src/mcp/server.rs
// description: MCP server exposing Mattermost operations as agent tools
// reference: https://docs.rs/rmcp

use super::params::*;
use crate::client::{MattermostClient, NewChannel, PostQuery, PostSearch, UserSearch};
use crate::config::Config;
use crate::error::MattermostError;
use crate::utils::OperationTimer;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

const DEFAULT_MESSAGE_LIMIT: u32 = 20;
const DEFAULT_SEARCH_PAGE_SIZE: u32 = 20;
const DEFAULT_USER_SEARCH_LIMIT: u32 = 20;

#[derive(Clone)]
pub struct MattermostMcp {
    config: Arc<Config>,
    client: Arc<Mutex<Option<Arc<MattermostClient>>>>,
    tool_router: ToolRouter<Self>,
}

/// Text shown to the agent when a tool call fails.
pub fn error_text(err: &MattermostError) -> String {
    if err.is_api() {
        let mut text = format!("Mattermost API Error: {}", err);
        if let Some(status) = err.status() {
            text.push_str(&format!(" (Status: {})", status));
        }
        text
    } else {
        format!("Error: {}", err)
    }
}

/// Epoch milliseconds `hours` before now.
fn since_millis(hours: u32) -> Result<i64, MattermostError> {
    chrono::TimeDelta::try_hours(i64::from(hours))
        .and_then(|delta| chrono::Utc::now().checked_sub_signed(delta))
        .map(|since| since.timestamp_millis())
        .ok_or_else(|| {
            MattermostError::Validation(format!("since_hours {} is out of range", hours))
        })
}

#[tool_router]
impl MattermostMcp {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            client: Arc::new(Mutex::new(None)),
            tool_router: Self::tool_router(),
        }
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Builds the client on first use so the server starts without credentials.
    async fn client(&self) -> Result<Arc<MattermostClient>, MattermostError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(MattermostClient::new(&self.config)?);
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    async fn run<T, F, Fut>(&self, tool_name: &str, call: F) -> Result<CallToolResult, McpError>
    where
        T: Serialize,
        F: FnOnce(Arc<MattermostClient>) -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        info!("MCP: {}", tool_name);
        let timer = OperationTimer::new(tool_name);

        let outcome = match self.client().await {
            Ok(client) => call(client).await,
            Err(e) => Err(e),
        };
        timer.finish();

        match outcome {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value).map_err(|e| {
                    McpError::internal_error(format!("Failed to serialize result: {}", e), None)
                })?;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => {
                warn!("MCP: {} failed: {}", tool_name, e);
                Ok(CallToolResult::error(vec![Content::text(error_text(&e))]))
            }
        }
    }

    // Teams and channels

    #[tool(description = "List the teams the bot account belongs to")]
    async fn list_teams(&self) -> Result<CallToolResult, McpError> {
        self.run("list_teams", |c| async move { c.get_teams().await })
            .await
    }

    #[tool(description = "Get all accessible channels in a team")]
    async fn list_channels(
        &self,
        Parameters(params): Parameters<TeamParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("list_channels", move |c| async move {
            c.get_channels(params.team_id.as_deref()).await
        })
        .await
    }

    #[tool(description = "Create a new channel")]
    async fn create_channel(
        &self,
        Parameters(params): Parameters<CreateChannelParams>,
    ) -> Result<CallToolResult, McpError> {
        let new = NewChannel {
            name: params.name,
            display_name: params.display_name,
            purpose: params.purpose.unwrap_or_default(),
            header: params.header.unwrap_or_default(),
            channel_type: params.channel_type,
            team_id: params.team_id,
        };
        self.run("create_channel", move |c| async move {
            c.create_channel(&new).await
        })
        .await
    }

    #[tool(description = "Get detailed information about a channel")]
    async fn get_channel_info(
        &self,
        Parameters(params): Parameters<ChannelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_channel_info", move |c| async move {
            c.get_channel_info(&params.channel_id).await
        })
        .await
    }

    #[tool(description = "Add a user to a channel")]
    async fn add_user_to_channel(
        &self,
        Parameters(params): Parameters<ChannelUserParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("add_user_to_channel", move |c| async move {
            c.add_user_to_channel(&params.channel_id, &params.user_id)
                .await
        })
        .await
    }

    #[tool(description = "Remove a user from a channel")]
    async fn remove_user_from_channel(
        &self,
        Parameters(params): Parameters<ChannelUserParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("remove_user_from_channel", move |c| async move {
            c.remove_user_from_channel(&params.channel_id, &params.user_id)
                .await
        })
        .await
    }

    #[tool(description = "Replace a channel's header text")]
    async fn update_channel_header(
        &self,
        Parameters(params): Parameters<ChannelHeaderParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("update_channel_header", move |c| async move {
            c.update_channel_header(&params.channel_id, &params.header)
                .await
        })
        .await
    }

    #[tool(description = "Replace a channel's purpose text")]
    async fn update_channel_purpose(
        &self,
        Parameters(params): Parameters<ChannelPurposeParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("update_channel_purpose", move |c| async move {
            c.update_channel_purpose(&params.channel_id, &params.purpose)
                .await
        })
        .await
    }

    #[tool(description = "List the members of a channel")]
    async fn get_channel_members(
        &self,
        Parameters(params): Parameters<ChannelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_channel_members", move |c| async move {
            c.get_channel_members(&params.channel_id).await
        })
        .await
    }

    // Messages

    #[tool(description = "Search for messages across channels")]
    async fn search_messages(
        &self,
        Parameters(params): Parameters<SearchMessagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let search = PostSearch {
            team_id: params.team_id,
            is_or_search: params.is_or_search,
            page: params.page.unwrap_or(0),
            per_page: params.per_page.unwrap_or(DEFAULT_SEARCH_PAGE_SIZE),
            ..PostSearch::new(params.query)
        };
        self.run("search_messages", move |c| async move {
            c.search_posts(&search).await
        })
        .await
    }

    #[tool(description = "Get recent messages from a channel")]
    async fn get_channel_messages(
        &self,
        Parameters(params): Parameters<ChannelMessagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let since = params.since_hours.map(since_millis).transpose();
        let per_page = params.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
        self.run("get_channel_messages", move |c| async move {
            let query = PostQuery {
                per_page,
                since: since?,
                ..PostQuery::default()
            };
            c.get_posts(&params.channel_id, &query).await
        })
        .await
    }

    #[tool(description = "Send a message to a channel")]
    async fn send_message(
        &self,
        Parameters(params): Parameters<SendMessageParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("send_message", move |c| async move {
            c.send_message(
                &params.channel_id,
                &params.message,
                params.reply_to.as_deref(),
                &params.file_ids,
            )
            .await
        })
        .await
    }

    #[tool(description = "Edit the text of an existing message")]
    async fn update_message(
        &self,
        Parameters(params): Parameters<UpdateMessageParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("update_message", move |c| async move {
            c.update_message(&params.post_id, &params.message).await
        })
        .await
    }

    #[tool(description = "Delete a message")]
    async fn delete_message(
        &self,
        Parameters(params): Parameters<PostParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("delete_message", move |c| async move {
            c.delete_message(&params.post_id).await
        })
        .await
    }

    #[tool(description = "Pin a message to the channel")]
    async fn pin_message(
        &self,
        Parameters(params): Parameters<PostParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("pin_message", move |c| async move {
            c.pin_message(&params.post_id).await
        })
        .await
    }

    #[tool(description = "Unpin a message from the channel")]
    async fn unpin_message(
        &self,
        Parameters(params): Parameters<PostParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("unpin_message", move |c| async move {
            c.unpin_message(&params.post_id).await
        })
        .await
    }

    // Users

    #[tool(description = "Search for users in the team")]
    async fn search_users(
        &self,
        Parameters(params): Parameters<SearchUsersParams>,
    ) -> Result<CallToolResult, McpError> {
        let search = UserSearch {
            team_id: params.team_id,
            limit: params.limit.unwrap_or(DEFAULT_USER_SEARCH_LIMIT),
            ..UserSearch::new(params.query)
        };
        self.run("search_users", move |c| async move {
            c.search_users(&search).await
        })
        .await
    }

    #[tool(description = "Get detailed user profile information")]
    async fn get_user_profile(
        &self,
        Parameters(params): Parameters<UserParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_user_profile", move |c| async move {
            c.get_user_profile(&params.user_id).await
        })
        .await
    }

    #[tool(description = "Get all members of a team")]
    async fn get_team_members(
        &self,
        Parameters(params): Parameters<TeamParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_team_members", move |c| async move {
            c.get_team_members(params.team_id.as_deref()).await
        })
        .await
    }

    #[tool(description = "Get user online/offline status")]
    async fn get_user_presence(
        &self,
        Parameters(params): Parameters<UserParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_user_presence", move |c| async move {
            c.get_user_status(&params.user_id).await
        })
        .await
    }

    // Files

    #[tool(description = "Upload a file to a channel")]
    async fn upload_file(
        &self,
        Parameters(params): Parameters<UploadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("upload_file", move |c| async move {
            c.upload_file(
                &params.channel_id,
                Path::new(&params.file_path),
                params.filename.as_deref(),
            )
            .await
        })
        .await
    }

    #[tool(description = "Download a file from Mattermost")]
    async fn download_file(
        &self,
        Parameters(params): Parameters<DownloadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("download_file", move |c| async move {
            c.download_file(&params.file_id, Path::new(&params.save_path))
                .await
        })
        .await
    }

    #[tool(description = "Get file metadata and information")]
    async fn get_file_info(
        &self,
        Parameters(params): Parameters<FileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_file_info", move |c| async move {
            c.get_file_info(&params.file_id).await
        })
        .await
    }

    #[tool(description = "Get a public link for a file")]
    async fn get_file_link(
        &self,
        Parameters(params): Parameters<FileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_file_link", move |c| async move {
            let link = c.get_file_link(&params.file_id).await?;
            Ok(json!({ "file_id": params.file_id, "link": link }))
        })
        .await
    }

    // Administrative

    #[tool(description = "Get channel statistics and activity metrics")]
    async fn get_channel_stats(
        &self,
        Parameters(params): Parameters<ChannelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_channel_stats", move |c| async move {
            c.get_channel_stats(&params.channel_id).await
        })
        .await
    }

    #[tool(description = "Get team member statistics, optionally with statistics for one channel")]
    async fn get_analytics(
        &self,
        Parameters(params): Parameters<AnalyticsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_analytics", move |c| async move {
            c.get_analytics(params.team_id.as_deref(), params.channel_id.as_deref())
                .await
        })
        .await
    }

    #[tool(description = "Test Mattermost connection and authentication")]
    async fn test_connection(&self) -> Result<CallToolResult, McpError> {
        self.run("test_connection", |c| async move {
            Ok(c.connection_status().await)
        })
        .await
    }

    #[tool(description = "Drop cached teams, channels and user profiles")]
    async fn clear_cache(&self) -> Result<CallToolResult, McpError> {
        self.run("clear_cache", |c| async move {
            let dropped = c.clear_cache().await;
            Ok(json!({ "cleared": true, "entries_dropped": dropped }))
        })
        .await
    }
}

#[tool_handler]
impl ServerHandler for MattermostMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mattermost-mcp".into(),
                title: Some("Mattermost MCP Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Tools for reading and writing Mattermost channels, messages, users and files. \
                 Team-scoped tools fall back to the configured default team when team_id is omitted."
                    .into(),
            ),
        }
    }
}
