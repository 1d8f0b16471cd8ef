//! Contest leaderboard display engine.
//!
//! Renders a continuously updating contest ranking as row models: a feed
//! synchronizer keeps the state store consistent under out-of-order remote
//! snapshots, a grouping engine computes tie-aware per-university sub-ranks,
//! and a FLIP-style row animator gives reordered rows smooth stacked motion
//! with a timed newly-solved highlight. The host page shell supplies the
//! transport (pointer documents, payload fetches, broadcast keys) and the
//! layout binding ([`services::row_anim::LayoutProbe`]); this crate owns
//! everything in between.

pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;

pub use models::{Contest, ProblemCell, RevealState, Settings, Status, Team};
pub use services::config_loader::{LiveboardConfig, load_liveboard_config};
pub use services::feed_sync::{FeedKind, FeedSynchronizer, PayloadFetcher};
pub use services::grouping::university_ranks;
pub use services::reveal::RevealSequence;
pub use services::row_anim::{LayoutProbe, ReorderOutcome, RowAnimator};
pub use services::settings_store::{FileStorage, SettingsPatch, SettingsStore, migrate};
pub use services::standings_view::{RowModel, StandingsView, build_view};
pub use store::{AppState, BroadcastPatch, Patch, apply_patch};
