use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::record::StatusClass;

/// Status terms shared by every source. Keys are lowercase with whitespace collapsed.
const DEFAULT_STATUS_VOCABULARY: &[(&str, StatusClass)] = {
    use StatusClass::*;
    &[
        ("scheduled", Scheduled),
        ("not_started", Scheduled),
        ("not started", Scheduled),
        ("ns", Scheduled),
        ("upcoming", Scheduled),
        ("fixture", Scheduled),
        ("programado", Scheduled),
        ("live", Live),
        ("in_play", Live),
        ("inplay", Live),
        ("in progress", Live),
        ("ht", Live),
        ("halftime", Live),
        ("en vivo", Live),
        ("postponed", Postponed),
        ("pst", Postponed),
        ("aplazado", Postponed),
        ("postergado", Postponed),
        ("cancelled", Cancelled),
        ("canceled", Cancelled),
        ("canc", Cancelled),
        ("suspendido", Cancelled),
        ("abandoned", Abandoned),
        ("abd", Abandoned),
        ("suspended", Abandoned),
        ("interrupted", Abandoned),
        ("finished", Finished),
        ("ft", Finished),
        ("full_time", Finished),
        ("ended", Finished),
        ("aet", Finished),
        ("finalizado", Finished),
    ]
};

/// betsapi reports `time_status` codes rather than words.
const BETSAPI_STATUS_CODES: &[(&str, StatusClass)] = {
    use StatusClass::*;
    &[
        ("0", Scheduled),
        ("1", Live),
        ("3", Finished),
        ("4", Cancelled),
        ("5", Postponed),
    ]
};

const DEFAULT_TRUST_WEIGHTS: &[(&str, f64)] = &[
    ("laliga_official", 1.0),
    ("official", 1.0),
    ("promiedos", 0.9),
    ("flashscore", 0.8),
    ("sofascore", 0.8),
    ("betsapi", 0.7),
    ("whoscored", 0.7),
    ("transfermarkt", 0.6),
    ("understat", 0.6),
];

const DEFAULT_SOURCE_PRIORITY: &[&str] = &[
    "laliga_official",
    "official",
    "promiedos",
    "flashscore",
    "sofascore",
    "betsapi",
];

/// Position of a source in the canonical-selection ranking. Unranked sources
/// order after every ranked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceRank {
    Ranked(usize),
    Unranked,
}

/// Immutable engine configuration. Passed by reference into every stage so
/// several configurations can be run against the same batch side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_sources_required: usize,
    pub max_date_difference_days: i64,
    pub status_vocabulary: BTreeMap<String, StatusClass>,
    /// Per-source terms, consulted before `status_vocabulary`.
    pub source_status_vocabulary: BTreeMap<String, BTreeMap<String, StatusClass>>,
    pub source_trust_weights: BTreeMap<String, f64>,
    pub unknown_source_weight: f64,
    pub source_priority: Vec<String>,
    pub prediction_horizon_days: i64,
    pub min_confidence_for_prediction: f64,
    pub report_sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut source_status_vocabulary = BTreeMap::new();
        source_status_vocabulary.insert("betsapi".to_string(), vocabulary(BETSAPI_STATUS_CODES));
        Self {
            min_sources_required: 2,
            max_date_difference_days: 1,
            status_vocabulary: vocabulary(DEFAULT_STATUS_VOCABULARY),
            source_status_vocabulary,
            source_trust_weights: DEFAULT_TRUST_WEIGHTS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
            unknown_source_weight: 0.5,
            source_priority: DEFAULT_SOURCE_PRIORITY.iter().map(|s| s.to_string()).collect(),
            prediction_horizon_days: 7,
            min_confidence_for_prediction: 0.7,
            report_sample_size: 10,
        }
    }
}

fn vocabulary(entries: &[(&str, StatusClass)]) -> BTreeMap<String, StatusClass> {
    entries
        .iter()
        .map(|(term, class)| (term.to_string(), *class))
        .collect()
}

fn status_term(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl EngineConfig {
    /// Map a source's free-text status onto a [`StatusClass`]. Terms missing
    /// from both the source table and the shared table are `Unrecognized`.
    pub fn classify_status(&self, source_tag: &str, raw: &str) -> StatusClass {
        let term = status_term(raw);
        if term.is_empty() {
            return StatusClass::Unrecognized;
        }
        self.source_status_vocabulary
            .get(source_tag)
            .and_then(|table| table.get(&term))
            .or_else(|| self.status_vocabulary.get(&term))
            .copied()
            .unwrap_or(StatusClass::Unrecognized)
    }

    pub fn trust_weight(&self, source_tag: &str) -> f64 {
        self.source_trust_weights
            .get(source_tag)
            .copied()
            .unwrap_or(self.unknown_source_weight)
    }

    pub fn priority_rank(&self, source_tag: &str) -> SourceRank {
        self.source_priority
            .iter()
            .position(|s| s == source_tag)
            .map(SourceRank::Ranked)
            .unwrap_or(SourceRank::Unranked)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_sources_required >= 1,
            "min_sources_required must be at least 1"
        );
        ensure!(
            self.max_date_difference_days >= 0,
            "max_date_difference_days must not be negative"
        );
        ensure!(
            self.prediction_horizon_days >= 0,
            "prediction_horizon_days must not be negative"
        );
        ensure!(
            (0.0..=1.0).contains(&self.min_confidence_for_prediction),
            "min_confidence_for_prediction must be within [0, 1], got {}",
            self.min_confidence_for_prediction
        );
        ensure!(
            self.unknown_source_weight > 0.0 && self.unknown_source_weight <= 1.0,
            "unknown_source_weight must be within (0, 1], got {}",
            self.unknown_source_weight
        );
        for (source, weight) in &self.source_trust_weights {
            ensure!(
                *weight > 0.0 && *weight <= 1.0,
                "trust weight for '{source}' must be within (0, 1], got {weight}"
            );
        }
        Ok(())
    }

    /// Load a JSON config file. Omitted fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut cfg: Self = serde_json::from_str(&raw).context("invalid config json")?;
        cfg.status_vocabulary = cfg
            .status_vocabulary
            .into_iter()
            .map(|(term, class)| (status_term(&term), class))
            .collect();
        for table in cfg.source_status_vocabulary.values_mut() {
            *table = std::mem::take(table)
                .into_iter()
                .map(|(term, class)| (status_term(&term), class))
                .collect();
        }
        Ok(cfg)
    }

    /// Override thresholds from `RECONCILE_*` environment variables. Values
    /// that do not parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<usize>("RECONCILE_MIN_SOURCES") {
            self.min_sources_required = v.max(1);
        }
        if let Some(v) = env_parse::<i64>("RECONCILE_MAX_DATE_DIFF_DAYS") {
            self.max_date_difference_days = v.max(0);
        }
        if let Some(v) = env_parse::<i64>("RECONCILE_HORIZON_DAYS") {
            self.prediction_horizon_days = v.clamp(0, 60);
        }
        if let Some(v) = env_parse::<f64>("RECONCILE_MIN_CONFIDENCE") {
            self.min_confidence_for_prediction = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_parse::<usize>("RECONCILE_REPORT_SAMPLE") {
            self.report_sample_size = v;
        }
    }

    /// Defaults, then the optional file, then the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        cfg.validate().expect("default config should validate");
        assert_eq!(cfg.min_sources_required, 2);
        assert_eq!(cfg.max_date_difference_days, 1);
        assert_eq!(cfg.prediction_horizon_days, 7);
        assert!((cfg.min_confidence_for_prediction - 0.7).abs() < 1e-12);
    }

    #[test]
    fn status_lookup_is_case_and_space_insensitive() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.classify_status("x", "Scheduled"), StatusClass::Scheduled);
        assert_eq!(cfg.classify_status("x", "  Not   Started "), StatusClass::Scheduled);
        assert_eq!(cfg.classify_status("x", "CANCELLED"), StatusClass::Cancelled);
        assert_eq!(cfg.classify_status("x", "tbd"), StatusClass::Unrecognized);
        assert_eq!(cfg.classify_status("x", ""), StatusClass::Unrecognized);
    }

    #[test]
    fn per_source_vocabulary_takes_precedence() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.classify_status("betsapi", "3"), StatusClass::Finished);
        assert_eq!(cfg.classify_status("betsapi", "0"), StatusClass::Scheduled);
        // Codes mean nothing for other sources.
        assert_eq!(cfg.classify_status("flashscore", "3"), StatusClass::Unrecognized);
        // Shared words still resolve for betsapi.
        assert_eq!(cfg.classify_status("betsapi", "live"), StatusClass::Live);
    }

    #[test]
    fn unranked_sources_sort_last() {
        let cfg = EngineConfig::default();
        assert!(cfg.priority_rank("laliga_official") < cfg.priority_rank("promiedos"));
        assert!(cfg.priority_rank("betsapi") < cfg.priority_rank("some_blog"));
        assert_eq!(cfg.priority_rank("some_blog"), SourceRank::Unranked);
    }

    #[test]
    fn validate_rejects_nonsense() {
        let mut cfg = EngineConfig::default();
        cfg.min_sources_required = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.source_trust_weights.insert("bad".to_string(), 1.5);
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.min_confidence_for_prediction = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"min_sources_required":3,"source_priority":["promiedos"]}"#)
                .unwrap();
        assert_eq!(cfg.min_sources_required, 3);
        assert_eq!(cfg.max_date_difference_days, 1);
        assert_eq!(cfg.priority_rank("promiedos"), SourceRank::Ranked(0));
        assert_eq!(cfg.classify_status("x", "scheduled"), StatusClass::Scheduled);
    }
}
