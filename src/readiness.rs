use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::select::CanonicalRecord;

/// Narrow canonical records to the ones prediction logic may consume: kickoff
/// strictly in the future and within the forward horizon, not yet started,
/// and confident enough.
pub fn filter_for_prediction(
    records: &[CanonicalRecord],
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<CanonicalRecord> {
    let now = now.naive_utc();
    records
        .iter()
        .filter(|rec| {
            let Some(kickoff) = rec.record.kickoff() else {
                debug!(group = %rec.group_key, "no parseable kickoff, not prediction-ready");
                return false;
            };
            if kickoff <= now {
                return false;
            }
            if (kickoff - now).num_days() > cfg.prediction_horizon_days {
                return false;
            }
            if !rec.status_class.not_started() {
                return false;
            }
            rec.metadata.confidence_score >= cfg.min_confidence_for_prediction
        })
        .cloned()
        .collect()
}
