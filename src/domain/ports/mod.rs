//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces external collaborators implement:
//! - ProfileClient: fetch and update the forum profile
//! - KeyValueStore: durable device-local storage
//! - NavigationService: route-change notifications
//! - Celebration: the completion visual effect
//! - Clock: current time
//!
//! The engine only consumes these; adapters live in `adapters` and
//! `infrastructure`.

pub mod celebration;
pub mod clock;
pub mod key_value_store;
pub mod navigation;
pub mod null_celebration;
pub mod profile_client;

pub use celebration::Celebration;
pub use clock::{Clock, ManualClock, SystemClock};
pub use key_value_store::KeyValueStore;
pub use navigation::NavigationService;
pub use null_celebration::NullCelebration;
pub use profile_client::ProfileClient;
