// file: src/client/system.rs
// description: server version, connectivity probe, analytics and cache control
// reference: https://api.mattermost.com/#tag/system

use super::http::MattermostClient;
use crate::error::Result;
use crate::models::{Analytics, ConnectionStatus, User};
use tracing::{debug, info, warn};

impl MattermostClient {
    /// The authenticated account.
    pub async fn get_me(&self) -> Result<User> {
        self.get_json("users/me").await
    }

    pub async fn get_server_version(&self) -> Result<String> {
        let config: serde_json::Value = self
            .get_json_with_query("config/client", &[("format", "old".to_string())])
            .await?;
        Ok(config
            .get("Version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }

    /// True when the server accepts the token.
    pub async fn test_connection(&self) -> bool {
        match self.get_me().await {
            Ok(me) => {
                debug!("Authenticated as {}", me.username);
                true
            }
            Err(e) => {
                warn!("Connection test failed: {}", e);
                false
            }
        }
    }

    pub async fn connection_status(&self) -> ConnectionStatus {
        if !self.test_connection().await {
            return ConnectionStatus {
                connected: false,
                server_version: "unknown".to_string(),
                api_url: None,
            };
        }

        let server_version = self.get_server_version().await.unwrap_or_else(|e| {
            warn!("Could not read server version: {}", e);
            "unknown".to_string()
        });

        ConnectionStatus {
            connected: true,
            server_version,
            api_url: Some(self.api_url().to_string()),
        }
    }

    /// Team statistics, plus channel statistics when a channel is given.
    pub async fn get_analytics(
        &self,
        team_id: Option<&str>,
        channel_id: Option<&str>,
    ) -> Result<Analytics> {
        let team_id = self.resolve_team(team_id)?;
        let team = self.get_team_stats(Some(&team_id)).await?;
        let channel = match channel_id.filter(|c| !c.is_empty()) {
            Some(channel_id) => Some(self.get_channel_stats(channel_id).await?),
            None => None,
        };

        Ok(Analytics {
            team_id,
            team,
            channel,
        })
    }

    /// Empties every cache and returns how many entries were dropped.
    pub async fn clear_cache(&self) -> usize {
        let dropped = self.cache.len().await;
        self.cache.clear().await;
        info!("Cleared {} cached Mattermost responses", dropped);
        dropped
    }
}

#[cfg(test)]
mod tests {
    use crate::client::http::tests::{CHANNEL_ID, TEAM_ID, USER_ID, test_client};
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_connection_status_when_connected() {
        let mut server = mockito::Server::new_async().await;
        let _me = server
            .mock("GET", "/api/v4/users/me")
            .with_status(200)
            .with_body(json!({"id": USER_ID, "username": "bot"}).to_string())
            .create_async()
            .await;
        let _version = server
            .mock("GET", Matcher::Regex(r"^/api/v4/config/client".to_string()))
            .with_status(200)
            .with_body(r#"{"Version":"9.11.0","SiteName":"Mattermost"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let status = client.connection_status().await;

        assert!(status.connected);
        assert_eq!(status.server_version, "9.11.0");
        assert_eq!(
            status.api_url,
            Some(format!("{}/api/v4/", server.url()))
        );
    }

    #[tokio::test]
    async fn test_connection_status_when_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _me = server
            .mock("GET", "/api/v4/users/me")
            .with_status(401)
            .with_body(r#"{"message":"Invalid or expired session"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let status = client.connection_status().await;

        assert!(!status.connected);
        assert_eq!(status.server_version, "unknown");
        assert!(status.api_url.is_none());
    }

    #[tokio::test]
    async fn test_analytics_combines_team_and_channel_stats() {
        let mut server = mockito::Server::new_async().await;
        let team_path = format!("/api/v4/teams/{}/stats", TEAM_ID);
        let _team = server
            .mock("GET", team_path.as_str())
            .with_status(200)
            .with_body(
                json!({"team_id": TEAM_ID, "total_member_count": 42, "active_member_count": 40})
                    .to_string(),
            )
            .create_async()
            .await;
        let channel_path = format!("/api/v4/channels/{}/stats", CHANNEL_ID);
        let _channel = server
            .mock("GET", channel_path.as_str())
            .with_status(200)
            .with_body(json!({"channel_id": CHANNEL_ID, "member_count": 7}).to_string())
            .create_async()
            .await;

        let client = test_client(&server);

        let analytics = client.get_analytics(None, Some(CHANNEL_ID)).await.unwrap();
        assert_eq!(analytics.team_id, TEAM_ID);
        assert_eq!(analytics.team.total_member_count, 42);
        assert_eq!(analytics.channel.unwrap().member_count, 7);

        let team_only = client.get_analytics(None, None).await.unwrap();
        assert!(team_only.channel.is_none());
    }
}
