//! Output
//!
//! Opinion statistics and run snapshots.

pub mod snapshot;
pub mod stats;

pub use snapshot::{generate_snapshot, generate_snapshot_with_id, write_snapshot};
pub use stats::{
    average_opinion, opinion_distribution, opinion_spread, opinion_stats, LEANING_THRESHOLD,
};
