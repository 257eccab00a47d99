// file: src/client/mod.rs
// description: Mattermost REST API client module exports
// reference: internal module structure

pub mod cache;
pub mod channels;
pub mod files;
pub mod http;
pub mod posts;
pub mod rate_limit;
pub mod system;
pub mod teams;
pub mod users;

pub use cache::{ClientCache, TtlCache};
pub use channels::{ChannelPatch, NewChannel};
pub use http::{MattermostClient, StatusResponse};
pub use posts::{PostQuery, PostSearch};
pub use rate_limit::RateLimiter;
pub use users::UserSearch;
