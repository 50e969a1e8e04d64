use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::grouping::group_records;
use crate::readiness::filter_for_prediction;
use crate::record::RawRecord;
use crate::report::{RejectedGroup, ValidationReport};
use crate::select::{CanonicalRecord, select_canonical};
use crate::validate::validate_group;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutput {
    /// One record per group that passed validation, in group-key order.
    pub canonical: Vec<CanonicalRecord>,
    /// Subset of `canonical` handed to prediction logic.
    pub prediction_ready: Vec<CanonicalRecord>,
    /// Every failing group with its full violation list.
    pub rejected: Vec<RejectedGroup>,
    pub report: ValidationReport,
}

/// Reconcile one scraped batch.
///
/// `now` stamps `validated_at` and anchors the readiness horizon; the same
/// batch, config and `now` always give the same output.
pub fn reconcile(
    records: Vec<RawRecord>,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> ReconcileOutput {
    let total_input_records = records.len();
    let groups = group_records(records, cfg);

    let mut canonical = Vec::new();
    let mut rejected = Vec::new();
    for group in &groups {
        let outcome = validate_group(group, cfg);
        match select_canonical(group, &outcome, cfg, now) {
            Some(rec) => canonical.push(rec),
            None => {
                debug!(
                    group = %group.key,
                    violations = outcome.violations.len(),
                    "group rejected"
                );
                rejected.push(RejectedGroup::new(group, &outcome));
            }
        }
    }

    let report = ValidationReport::build(
        total_input_records,
        canonical.len(),
        &rejected,
        cfg.report_sample_size,
        now,
    );
    let prediction_ready = filter_for_prediction(&canonical, cfg, now);

    info!(
        records = total_input_records,
        groups = report.groups_evaluated,
        valid = report.valid_groups,
        invalid = report.invalid_groups,
        ready = prediction_ready.len(),
        "reconciliation complete"
    );

    ReconcileOutput {
        canonical,
        prediction_ready,
        rejected,
        report,
    }
}

pub fn reconcile_now(records: Vec<RawRecord>, cfg: &EngineConfig) -> ReconcileOutput {
    reconcile(records, cfg, Utc::now())
}
