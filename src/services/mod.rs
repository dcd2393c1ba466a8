pub mod dismissal_store;
pub mod profile_cache;
pub mod profile_editor;
pub mod task_catalog;
pub mod visibility_controller;
pub mod weighted_selector;

pub use dismissal_store::DismissalStore;
pub use profile_cache::{ProfileCache, PROFILE_TTL_MS};
pub use profile_editor::ProfileEditor;
pub use task_catalog::{build_tasks, candidate_set, resolve_weight};
pub use visibility_controller::{ControllerDeps, VisibilityController};
pub use weighted_selector::WeightedSelector;
