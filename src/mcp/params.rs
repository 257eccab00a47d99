// file: src/mcp/params.rs
// description: argument schemas for the MCP tools
// reference: https://docs.rs/schemars

use crate::models::ChannelType;
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TeamParams {
    /// Team ID (optional, uses the configured default team when omitted)
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChannelParams {
    /// Channel ID
    pub channel_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateChannelParams {
    /// Channel URL name (lowercase, no spaces)
    pub name: String,
    /// Channel display name
    pub display_name: String,
    /// Channel purpose/description
    #[serde(default)]
    pub purpose: Option<String>,
    /// Channel header text
    #[serde(default)]
    pub header: Option<String>,
    /// O for open, P for private (default O)
    #[serde(default)]
    pub channel_type: ChannelType,
    /// Team ID (optional)
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChannelUserParams {
    /// Channel ID
    pub channel_id: String,
    /// User ID
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChannelHeaderParams {
    /// Channel ID
    pub channel_id: String,
    /// New header text (markdown)
    pub header: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChannelPurposeParams {
    /// Channel ID
    pub channel_id: String,
    /// New purpose text
    pub purpose: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchMessagesParams {
    /// Search query
    pub query: String,
    /// Team ID (optional)
    #[serde(default)]
    pub team_id: Option<String>,
    /// True for OR search, false for AND
    #[serde(default)]
    pub is_or_search: bool,
    /// Page number (default 0)
    #[serde(default)]
    pub page: Option<u32>,
    /// Results per page (default 20)
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChannelMessagesParams {
    /// Channel ID
    pub channel_id: String,
    /// Number of messages to retrieve (default 20, max 200)
    #[serde(default)]
    pub limit: Option<u32>,
    /// Only messages from the last N hours
    #[serde(default)]
    pub since_hours: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendMessageParams {
    /// Channel ID
    pub channel_id: String,
    /// Message text (markdown)
    pub message: String,
    /// Post ID to reply to (optional)
    #[serde(default)]
    pub reply_to: Option<String>,
    /// IDs of previously uploaded files to attach (optional)
    #[serde(default)]
    pub file_ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PostParams {
    /// Post ID
    pub post_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateMessageParams {
    /// Post ID
    pub post_id: String,
    /// Replacement message text
    pub message: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchUsersParams {
    /// Search term (username, name, email)
    pub query: String,
    /// Team ID (optional)
    #[serde(default)]
    pub team_id: Option<String>,
    /// Maximum results (default 20)
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserParams {
    /// User ID
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadFileParams {
    /// Channel ID
    pub channel_id: String,
    /// Local file path
    pub file_path: String,
    /// Custom filename (optional)
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadFileParams {
    /// File ID
    pub file_id: String,
    /// Local save path
    pub save_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FileParams {
    /// File ID
    pub file_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AnalyticsParams {
    /// Team ID (optional)
    #[serde(default)]
    pub team_id: Option<String>,
    /// Channel ID to include channel statistics (optional)
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_channel_defaults() {
        let params: CreateChannelParams =
            serde_json::from_str(r#"{"name":"ops","display_name":"Ops"}"#).unwrap();
        assert_eq!(params.channel_type, ChannelType::Open);
        assert!(params.team_id.is_none());
    }

    #[test]
    fn test_channel_type_rejects_unknown_code() {
        let result: Result<CreateChannelParams, _> =
            serde_json::from_str(r#"{"name":"ops","display_name":"Ops","channel_type":"X"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_marks_required_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(SendMessageParams)).unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"channel_id"));
        assert!(required.contains(&"message"));
        assert!(!required.contains(&"reply_to"));
    }
}
