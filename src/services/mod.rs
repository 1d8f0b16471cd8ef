pub mod config_loader;
pub mod feed_sync;
pub mod grouping;
pub mod reveal;
pub mod row_anim;
pub mod settings_store;
pub mod standings_view;
