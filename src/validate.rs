use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::grouping::CandidateGroup;
use crate::normalize::normalize_subject;
use crate::record::{RawRecord, StatusClass};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub violations: Vec<String>,
    /// Reports set aside by status. Kept for audit; they never fail the group.
    pub notices: Vec<String>,
    pub sources_count: usize,
    /// Sources whose status corroborates the fixture.
    pub valid_sources: Vec<String>,
    /// Sources reporting a postponed/cancelled/abandoned/finished status.
    pub excluded_sources: Vec<String>,
}

/// Run every consistency check on one group. Checks never short-circuit, so a
/// failing group reports all of its problems at once.
///
/// Excluded and unrecognized statuses only shrink the valid-status subset;
/// the outcome is judged on that subset.
pub fn validate_group(group: &CandidateGroup, cfg: &EngineConfig) -> ValidationOutcome {
    let mut violations = Vec::new();

    let sources_count = group.sources_count();
    if sources_count < cfg.min_sources_required {
        violations.push(format!(
            "Insufficient sources: {} < {}",
            sources_count, cfg.min_sources_required
        ));
    }

    for (source, rec) in &group.records {
        check_required_fields(source, rec, &mut violations);
    }

    let mut valid: Vec<(&str, &RawRecord)> = Vec::new();
    let mut excluded_sources = Vec::new();
    let mut notices = Vec::new();
    for (source, rec) in &group.records {
        let class = cfg.classify_status(source, rec.status());
        if class.is_valid() {
            valid.push((source.as_str(), rec));
        } else if class.is_excluded() {
            excluded_sources.push(source.clone());
            notices.push(format!(
                "Match excluded due to status '{}' ({}) in source '{}'",
                rec.status().trim(),
                status_label(class),
                source
            ));
        } else if !rec.status().trim().is_empty() {
            notices.push(format!(
                "Unrecognized status '{}' in source '{}'",
                rec.status().trim(),
                source
            ));
        }
    }

    if valid.is_empty() {
        violations.push("No valid match status found across sources".to_string());
    } else if valid.len() < cfg.min_sources_required {
        violations.push(format!(
            "Insufficient corroboration: {} valid-status source(s) < {}",
            valid.len(),
            cfg.min_sources_required
        ));
    }

    if valid.len() > 1 {
        check_date_agreement(&valid, cfg, &mut violations);
        check_subject_agreement(&valid, &mut violations);
    }

    let is_valid = violations.is_empty() && !valid.is_empty();
    ValidationOutcome {
        is_valid,
        violations,
        notices,
        sources_count,
        valid_sources: valid.iter().map(|(s, _)| s.to_string()).collect(),
        excluded_sources,
    }
}

fn check_required_fields(source: &str, rec: &RawRecord, violations: &mut Vec<String>) {
    let fields = [
        ("subject_a", rec.subject_a.as_deref()),
        ("subject_b", rec.subject_b.as_deref()),
        ("event_date", rec.event_date.as_deref()),
        ("status", rec.status.as_deref()),
    ];
    for (name, value) in fields {
        if value.is_none_or(|v| v.trim().is_empty()) {
            violations.push(format!(
                "Missing required field '{name}' in source '{source}'"
            ));
        }
    }
    // A name made only of stripped tokens or symbols carries no identity.
    for (name, value) in [("subject_a", rec.subject_a()), ("subject_b", rec.subject_b())] {
        if !value.trim().is_empty() && normalize_subject(value).is_empty() {
            violations.push(format!(
                "Unidentifiable {name} '{}' in source '{source}'",
                value.trim()
            ));
        }
    }
    if let Some(date) = rec.event_date.as_deref()
        && !date.trim().is_empty()
        && rec.kickoff().is_none()
    {
        violations.push(format!(
            "Invalid date format '{}' in source '{}'",
            date.trim(),
            source
        ));
    }
}

/// Every pair must agree; a chain of close dates does not excuse its endpoints.
fn check_date_agreement(
    valid: &[(&str, &RawRecord)],
    cfg: &EngineConfig,
    violations: &mut Vec<String>,
) {
    let dated: Vec<(&str, NaiveDate)> = valid
        .iter()
        .filter_map(|(source, rec)| rec.day().map(|d| (*source, d)))
        .collect();
    for (i, (src_i, day_i)) in dated.iter().enumerate() {
        for (src_j, day_j) in &dated[i + 1..] {
            let diff = (*day_i - *day_j).num_days().abs();
            if diff > cfg.max_date_difference_days {
                violations.push(format!(
                    "Date mismatch between '{src_i}' and '{src_j}': {diff} days"
                ));
            }
        }
    }
}

fn check_subject_agreement(valid: &[(&str, &RawRecord)], violations: &mut Vec<String>) {
    let subjects_a: BTreeSet<String> = valid
        .iter()
        .map(|(_, rec)| normalize_subject(rec.subject_a()))
        .collect();
    let subjects_b: BTreeSet<String> = valid
        .iter()
        .map(|(_, rec)| normalize_subject(rec.subject_b()))
        .collect();
    if subjects_a.len() > 1 {
        violations.push(format!(
            "Home team name inconsistency: {}",
            join_set(&subjects_a)
        ));
    }
    if subjects_b.len() > 1 {
        violations.push(format!(
            "Away team name inconsistency: {}",
            join_set(&subjects_b)
        ));
    }
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_label(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Scheduled => "scheduled",
        StatusClass::Live => "live",
        StatusClass::Postponed => "postponed",
        StatusClass::Cancelled => "cancelled",
        StatusClass::Abandoned => "abandoned",
        StatusClass::Finished => "finished",
        StatusClass::Unrecognized => "unrecognized",
    }
}
