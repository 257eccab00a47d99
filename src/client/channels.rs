// file: src/client/channels.rs
// description: channel listing, creation, membership and metadata updates
// reference: https://api.mattermost.com/#tag/channels

use super::http::{MattermostClient, StatusResponse};
use crate::error::{MattermostError, Result};
use crate::models::{Channel, ChannelMember, ChannelStats, ChannelType};
use crate::utils::Validator;
use serde::Serialize;
use tracing::{debug, info};

/// Arguments for creating an open or private channel
#[derive(Debug, Clone, Default)]
pub struct NewChannel {
    /// URL name: lowercase, no spaces
    pub name: String,
    pub display_name: String,
    pub purpose: String,
    pub header: String,
    pub channel_type: ChannelType,
    pub team_id: Option<String>,
}

#[derive(Serialize)]
struct CreateChannelRequest<'a> {
    team_id: &'a str,
    name: &'a str,
    display_name: &'a str,
    purpose: &'a str,
    header: &'a str,
    #[serde(rename = "type")]
    channel_type: ChannelType,
}

#[derive(Debug, Default, Serialize)]
pub struct ChannelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Serialize)]
struct AddMemberRequest<'a> {
    user_id: &'a str,
}

impl MattermostClient {
    /// Channels of a team the authenticated account can see.
    pub async fn get_channels(&self, team_id: Option<&str>) -> Result<Vec<Channel>> {
        let team_id = self.resolve_team(team_id)?;

        if let Some(channels) = self.cache.channel_lists.get(&team_id).await {
            debug!("Serving {} channels of {} from cache", channels.len(), team_id);
            return Ok(channels);
        }

        let channels: Vec<Channel> = self
            .get_json(&format!("users/me/teams/{}/channels", team_id))
            .await?;
        self.cache
            .channel_lists
            .insert(team_id, channels.clone())
            .await;
        Ok(channels)
    }

    pub async fn get_channel_info(&self, channel_id: &str) -> Result<Channel> {
        Validator::validate_id("channel_id", channel_id)?;

        if let Some(channel) = self.cache.channels.get(channel_id).await {
            return Ok(channel);
        }

        let channel: Channel = self.get_json(&format!("channels/{}", channel_id)).await?;
        self.cache.channels.insert(channel_id, channel.clone()).await;
        Ok(channel)
    }

    pub async fn create_channel(&self, new: &NewChannel) -> Result<Channel> {
        let team_id = self.resolve_team(new.team_id.as_deref())?;
        Validator::validate_channel_name(&new.name)?;
        Validator::validate_not_empty("display_name", &new.display_name)?;
        if !new.channel_type.is_creatable() {
            return Err(MattermostError::Validation(
                "channel_type must be O (open) or P (private)".to_string(),
            ));
        }

        let request = CreateChannelRequest {
            team_id: &team_id,
            name: &new.name,
            display_name: &new.display_name,
            purpose: &new.purpose,
            header: &new.header,
            channel_type: new.channel_type,
        };

        let channel: Channel = self.post_json("channels", &request).await?;
        info!("Created channel {} ({})", channel.name, channel.id);

        self.cache.channel_lists.remove(&team_id).await;
        Ok(channel)
    }

    pub async fn add_user_to_channel(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<ChannelMember> {
        Validator::validate_id("channel_id", channel_id)?;
        Validator::validate_id("user_id", user_id)?;

        self.post_json(
            &format!("channels/{}/members", channel_id),
            &AddMemberRequest { user_id },
        )
        .await
    }

    pub async fn remove_user_from_channel(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<StatusResponse> {
        Validator::validate_id("channel_id", channel_id)?;
        Validator::validate_id("user_id", user_id)?;

        self.delete_json(&format!("channels/{}/members/{}", channel_id, user_id))
            .await
    }

    pub async fn patch_channel(&self, channel_id: &str, patch: &ChannelPatch) -> Result<Channel> {
        Validator::validate_id("channel_id", channel_id)?;

        let channel: Channel = self
            .put_json(&format!("channels/{}/patch", channel_id), patch)
            .await?;

        self.cache.channels.remove(channel_id).await;
        self.cache.channel_lists.remove(&channel.team_id).await;
        Ok(channel)
    }

    pub async fn update_channel_header(&self, channel_id: &str, header: &str) -> Result<Channel> {
        let patch = ChannelPatch {
            header: Some(header.to_string()),
            ..ChannelPatch::default()
        };
        self.patch_channel(channel_id, &patch).await
    }

    pub async fn update_channel_purpose(
        &self,
        channel_id: &str,
        purpose: &str,
    ) -> Result<Channel> {
        let patch = ChannelPatch {
            purpose: Some(purpose.to_string()),
            ..ChannelPatch::default()
        };
        self.patch_channel(channel_id, &patch).await
    }

    pub async fn get_channel_members(&self, channel_id: &str) -> Result<Vec<ChannelMember>> {
        Validator::validate_id("channel_id", channel_id)?;
        self.get_json(&format!("channels/{}/members", channel_id))
            .await
    }

    pub async fn get_channel_stats(&self, channel_id: &str) -> Result<ChannelStats> {
        Validator::validate_id("channel_id", channel_id)?;
        self.get_json(&format!("channels/{}/stats", channel_id))
            .await
    }
}
