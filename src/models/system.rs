// file: src/models/system.rs
// description: connection status and analytics summaries built from several calls

use super::{ChannelStats, TeamStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub server_version: String,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub team_id: String,
    pub team: TeamStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelStats>,
}
