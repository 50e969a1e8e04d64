use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::grouping::CandidateGroup;
use crate::validate::ValidationOutcome;

/// Why one group produced no canonical record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedGroup {
    pub group_key: String,
    pub sources: Vec<String>,
    pub violations: Vec<String>,
    pub notices: Vec<String>,
}

impl RejectedGroup {
    pub fn new(group: &CandidateGroup, outcome: &ValidationOutcome) -> Self {
        Self {
            group_key: group.key.to_string(),
            sources: group.source_tags(),
            violations: outcome.violations.clone(),
            notices: outcome.notices.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub total_input_records: usize,
    pub groups_evaluated: usize,
    pub valid_groups: usize,
    pub invalid_groups: usize,
    pub validation_rate: f64,
    /// First rejected groups only, for human-readable summaries.
    pub rejected_sample: Vec<RejectedGroup>,
}

impl ValidationReport {
    pub fn build(
        total_input_records: usize,
        valid_groups: usize,
        rejected: &[RejectedGroup],
        sample_size: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let invalid_groups = rejected.len();
        let groups_evaluated = valid_groups + invalid_groups;
        let validation_rate = if groups_evaluated == 0 {
            0.0
        } else {
            valid_groups as f64 / groups_evaluated as f64
        };
        Self {
            generated_at,
            total_input_records,
            groups_evaluated,
            valid_groups,
            invalid_groups,
            validation_rate,
            rejected_sample: rejected.iter().take(sample_size).cloned().collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = Vec::new();
        out.push("=== MATCH DATA VALIDATION REPORT ===".to_string());
        out.push(format!(
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push(String::new());
        out.push(format!("Total records processed: {}", self.total_input_records));
        out.push(format!("Groups evaluated: {}", self.groups_evaluated));
        out.push(format!("Valid groups: {}", self.valid_groups));
        out.push(format!("Invalid groups: {}", self.invalid_groups));
        out.push(format!(
            "Validation rate: {:.2}%",
            self.validation_rate * 100.0
        ));
        out.push(String::new());

        if !self.rejected_sample.is_empty() {
            out.push("=== VALIDATION ERRORS ===".to_string());
            for item in &self.rejected_sample {
                out.push(format!("Match ID: {}", item.group_key));
                out.push(format!("Sources: {}", item.sources.join(", ")));
                out.push(format!("Errors: {}", item.violations.join(", ")));
                if !item.notices.is_empty() {
                    out.push(format!("Notes: {}", item.notices.join(", ")));
                }
                out.push(String::new());
            }
            if self.invalid_groups > self.rejected_sample.len() {
                out.push(format!(
                    "... and {} more rejected groups",
                    self.invalid_groups - self.rejected_sample.len()
                ));
            }
        }

        out.join("\n")
    }
}

/// Write any serializable output as pretty JSON, swapping it into place so a
/// reader never sees a half-written file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn rejected(n: usize) -> Vec<RejectedGroup> {
        (0..n)
            .map(|i| RejectedGroup {
                group_key: format!("team{i}_other_2025-08-10"),
                sources: vec!["promiedos".to_string()],
                violations: vec!["Insufficient sources: 1 < 2".to_string()],
                notices: Vec::new(),
            })
            .collect()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 8, 12, 0, 0).unwrap()
    }

    #[test]
    fn sample_is_capped() {
        let report = ValidationReport::build(40, 3, &rejected(25), 10, at());
        assert_eq!(report.groups_evaluated, 28);
        assert_eq!(report.invalid_groups, 25);
        assert_eq!(report.rejected_sample.len(), 10);
        assert!((report.validation_rate - 3.0 / 28.0).abs() < 1e-12);
        let text = report.render();
        assert!(text.contains("... and 15 more rejected groups"));
        assert_eq!(text.matches("Match ID:").count(), 10);
    }

    #[test]
    fn empty_batch_has_zero_rate() {
        let report = ValidationReport::build(0, 0, &[], 10, at());
        assert_eq!(report.validation_rate, 0.0);
        let text = report.render();
        assert!(text.starts_with("=== MATCH DATA VALIDATION REPORT ==="));
        assert!(text.contains("Generated: 2025-08-08 12:00:00"));
        assert!(!text.contains("VALIDATION ERRORS"));
    }
}
