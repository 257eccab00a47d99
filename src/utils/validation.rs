// file: src/utils/validation.rs
// description: argument validation for ids, channel names, urls and local paths
// reference: input validation patterns

use crate::error::{MattermostError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use tokio::fs;

lazy_static! {
    // Mattermost ids: 26 lowercase base32 characters
    static ref ENTITY_ID: Regex = Regex::new(r"^[a-z0-9]{26}$").expect("ENTITY_ID regex is valid");

    static ref CHANNEL_NAME: Regex =
        Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").expect("CHANNEL_NAME regex is valid");
}

pub const MAX_PER_PAGE: u32 = 200;

pub struct Validator;

impl Validator {
    pub fn validate_id(kind: &str, id: &str) -> Result<()> {
        if !ENTITY_ID.is_match(id) {
            return Err(MattermostError::Validation(format!(
                "Invalid {}: {:?} (expected 26 lowercase alphanumeric characters)",
                kind, id
            )));
        }
        Ok(())
    }

    pub fn validate_ids(kind: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Err(MattermostError::Validation(format!(
                "At least one {} is required",
                kind
            )));
        }
        ids.iter().try_for_each(|id| Self::validate_id(kind, id))
    }

    pub fn validate_channel_name(name: &str) -> Result<()> {
        if !CHANNEL_NAME.is_match(name) {
            return Err(MattermostError::Validation(format!(
                "Invalid channel name {:?}: use 1-64 lowercase letters, digits, '-' or '_'",
                name
            )));
        }
        Ok(())
    }

    pub fn validate_not_empty(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(MattermostError::Validation(format!(
                "{} must not be empty",
                field
            )));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(MattermostError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    /// The path must name an existing regular file.
    pub async fn validate_file_path(path: &Path) -> Result<()> {
        let metadata = fs::metadata(path).await.map_err(|e| {
            MattermostError::Validation(format!("Cannot read path {}: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(MattermostError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn clamp_per_page(per_page: u32) -> u32 {
        per_page.min(MAX_PER_PAGE)
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            None => text.to_string(),
            Some((idx, _)) => format!("{}...", &text[..idx]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_id() {
        assert!(Validator::validate_id("channel_id", "4xp9fdt77pncbef59f4k1qe83o").is_ok());
        assert!(Validator::validate_id("channel_id", "short").is_err());
        assert!(Validator::validate_id("channel_id", "../../../users/me/teams123").is_err());
        assert!(Validator::validate_id("channel_id", "4XP9FDT77PNCBEF59F4K1QE83O").is_err());
    }

    #[test]
    fn test_validate_ids() {
        let ids = vec!["4xp9fdt77pncbef59f4k1qe83o".to_string()];
        assert!(Validator::validate_ids("user_id", &ids).is_ok());
        assert!(Validator::validate_ids("user_id", &[]).is_err());
    }

    #[test]
    fn test_validate_channel_name() {
        assert!(Validator::validate_channel_name("town-square").is_ok());
        assert!(Validator::validate_channel_name("ops_alerts2").is_ok());
        assert!(Validator::validate_channel_name("Town Square").is_err());
        assert!(Validator::validate_channel_name("").is_err());
        assert!(Validator::validate_channel_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://example.com").is_ok());
        assert!(Validator::validate_url("example.com").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }

    #[tokio::test]
    async fn test_validate_file_path() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("report.pdf");
        fs::write(&file_path, "data").unwrap();

        assert!(Validator::validate_file_path(&file_path).await.is_ok());
        assert!(Validator::validate_file_path(temp.path()).await.is_err());
        assert!(
            Validator::validate_file_path(Path::new("/nonexistent"))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_clamp_per_page() {
        assert_eq!(Validator::clamp_per_page(60), 60);
        assert_eq!(Validator::clamp_per_page(500), 200);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
        assert_eq!(Validator::truncate_text("héllo wörld", 5), "héllo...");
    }
}
