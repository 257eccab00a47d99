// file: src/client/teams.rs
// description: team listing, membership and statistics
// reference: https://api.mattermost.com/#tag/teams

use super::cache::ALL_TEAMS_KEY;
use super::http::MattermostClient;
use crate::error::Result;
use crate::models::{Team, TeamMember, TeamStats};
use tracing::debug;

impl MattermostClient {
    /// Teams the authenticated account belongs to.
    pub async fn get_teams(&self) -> Result<Vec<Team>> {
        if let Some(teams) = self.cache.teams.get(ALL_TEAMS_KEY).await {
            debug!("Serving {} teams from cache", teams.len());
            return Ok(teams);
        }

        let teams: Vec<Team> = self.get_json("users/me/teams").await?;
        self.cache.teams.insert(ALL_TEAMS_KEY, teams.clone()).await;
        Ok(teams)
    }

    pub async fn get_team_members(&self, team_id: Option<&str>) -> Result<Vec<TeamMember>> {
        let team_id = self.resolve_team(team_id)?;
        self.get_json(&format!("teams/{}/members", team_id)).await
    }

    pub async fn get_team_stats(&self, team_id: Option<&str>) -> Result<TeamStats> {
        let team_id = self.resolve_team(team_id)?;
        self.get_json(&format!("teams/{}/stats", team_id)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::http::tests::{TEAM_ID, USER_ID, test_client, test_config};
    use super::*;
    use crate::config::Config;
    use crate::error::MattermostError;

    #[tokio::test]
    async fn test_get_teams_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/users/me/teams")
            .with_status(200)
            .with_body(format!(
                r#"[{{"id":"{}","name":"team-1","display_name":"Team 1","type":"O"}}]"#,
                TEAM_ID
            ))
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server);
        let first = client.get_teams().await.unwrap();
        let second = client.get_teams().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].display_name, "Team 1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/users/me/teams")
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;

        let client = test_client(&server);
        client.get_teams().await.unwrap();
        assert_eq!(client.clear_cache().await, 1);
        client.get_teams().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_team_members_use_default_team() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/api/v4/teams/{}/members", TEAM_ID).as_str())
            .with_status(200)
            .with_body(format!(
                r#"[{{"team_id":"{}","user_id":"{}","roles":"team_user"}}]"#,
                TEAM_ID, USER_ID
            ))
            .create_async()
            .await;

        let client = test_client(&server);
        let members = client.get_team_members(None).await.unwrap();

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, USER_ID);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_team_sends_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let config = Config {
            team_id: None,
            ..test_config(server.url())
        };
        let client = MattermostClient::new(&config).unwrap();

        assert!(matches!(
            client.get_team_stats(None).await,
            Err(MattermostError::MissingTeam)
        ));
        mock.assert_async().await;
    }
}
