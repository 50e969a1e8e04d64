use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::confidence::confidence_score;
use crate::config::EngineConfig;
use crate::grouping::CandidateGroup;
use crate::record::{RawRecord, StatusClass};
use crate::validate::ValidationOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMetadata {
    pub sources_confirmed: BTreeSet<String>,
    /// Sources in `sources_confirmed` whose status set them aside.
    pub excluded_sources: BTreeSet<String>,
    pub confidence_score: f64,
    pub validated_at: DateTime<Utc>,
}

/// The authoritative record for one fixture after cross-source validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub group_key: String,
    #[serde(flatten)]
    pub record: RawRecord,
    pub status_class: StatusClass,
    pub metadata: ValidationMetadata,
}

/// Pick the canonical record for a group that passed validation.
///
/// Returns `None` for failing outcomes. The record comes from the highest
/// ranked valid-status source; `sources_confirmed` lists every source in the
/// group, excluded-status ones included, while the confidence score only
/// counts valid-status corroborators.
pub fn select_canonical(
    group: &CandidateGroup,
    outcome: &ValidationOutcome,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Option<CanonicalRecord> {
    if !outcome.is_valid {
        return None;
    }

    let best = outcome
        .valid_sources
        .iter()
        .min_by(|a, b| {
            cfg.priority_rank(a)
                .cmp(&cfg.priority_rank(b))
                .then_with(|| a.cmp(b))
        })?;
    let record = group.records.get(best)?.clone();
    let status_class = cfg.classify_status(best, record.status());

    Some(CanonicalRecord {
        group_key: group.key.to_string(),
        record,
        status_class,
        metadata: ValidationMetadata {
            sources_confirmed: group.records.keys().cloned().collect(),
            excluded_sources: outcome.excluded_sources.iter().cloned().collect(),
            confidence_score: confidence_score(&outcome.valid_sources, cfg),
            validated_at: now,
        },
    })
}
