// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod utils;

pub use client::{MattermostClient, NewChannel, PostQuery, PostSearch, UserSearch};
pub use config::Config;
pub use error::{MattermostError, Result};
pub use mcp::MattermostMcp;
pub use models::{Channel, ChannelType, FileInfo, Post, PostList, Team, User};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default();
        assert!(!config.has_credentials());
        assert!(MattermostClient::new(&config).is_err());
        assert!(!MattermostMcp::new(config).tools().is_empty());
    }
}
