pub mod confidence;
pub mod config;
pub mod engine;
pub mod fake_feed;
pub mod grouping;
pub mod normalize;
pub mod readiness;
pub mod record;
pub mod report;
pub mod select;
pub mod validate;

pub use config::{EngineConfig, SourceRank};
pub use engine::{ReconcileOutput, reconcile, reconcile_now};
pub use record::{RawRecord, StatusClass, parse_batch_json};
