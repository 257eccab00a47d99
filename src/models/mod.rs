// file: src/models/mod.rs
// description: Mattermost data models module exports
// reference: internal module structure

pub mod channel;
pub mod file;
pub mod post;
pub mod system;
pub mod team;
pub mod user;

pub use channel::{Channel, ChannelMember, ChannelStats, ChannelType};
pub use file::{DownloadedFile, FileInfo, FileUploadResponse};
pub use post::{Post, PostList};
pub use system::{Analytics, ConnectionStatus};
pub use team::{Team, TeamMember, TeamStats};
pub use user::{User, UserStatus};
