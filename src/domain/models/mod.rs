pub mod banner;
pub mod config;
pub mod route;
pub mod storage;
pub mod task;
pub mod user;

pub use banner::{BannerState, HiddenReason, SelectionState};
pub use config::{
    Config, ForumConfig, LoggingConfig, OnboardingConfig, ShowOn, SiteSettings, StorageBackend,
    StorageConfig,
};
pub use route::RouteChange;
pub use storage::{CacheEntry, DismissalRecord, DismissalStatus, StorageKind};
pub use task::{Priority, Task, TaskKind};
pub use user::{ChatChannel, ChatChannels, ExtendedProfile, ProfileUpdate, UserOption, UserSummary};
