pub mod aggregator;
pub mod scored_item;

// Re-export the feature pipeline for convenience
pub use aggregator::{
    aggregate_daily, build_feature_table, rolling_volume_z, write_feature_table,
    FeatureBuildSummary, VOLUME_Z_MIN_PERIODS, VOLUME_Z_WINDOW,
};
pub use scored_item::{load_scored_items, parse_seen_date, ScoredItem};
