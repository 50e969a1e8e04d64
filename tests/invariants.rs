use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use fixture_reconcile::confidence::confidence_score;
use fixture_reconcile::fake_feed::{FakeFeedOptions, synthetic_batch};
use fixture_reconcile::grouping::group_records;
use fixture_reconcile::normalize::normalize_subject;
use fixture_reconcile::validate::validate_group;
use fixture_reconcile::{EngineConfig, reconcile};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 8, 12, 0, 0).unwrap()
}

fn noisy_batch(seed: u64) -> Vec<fixture_reconcile::RawRecord> {
    let mut opts = FakeFeedOptions::new(60, seed, NaiveDate::from_ymd_opt(2025, 8, 9).unwrap());
    opts.noise = 0.25;
    synthetic_batch(opts)
}

#[test]
fn identical_batches_reconcile_identically() {
    let cfg = EngineConfig::default();
    let first = reconcile(noisy_batch(11), &cfg, now());
    let second = reconcile(noisy_batch(11), &cfg, now());
    assert_eq!(first, second);
}

#[test]
fn grouping_is_a_partition_of_the_batch() {
    let cfg = EngineConfig::default();
    for seed in [1, 2, 3, 4] {
        let batch = noisy_batch(seed);
        let total = batch.len();
        let groups = group_records(batch, &cfg);
        let grouped: usize = groups.iter().map(|g| g.record_count()).sum();
        assert_eq!(grouped, total, "seed {seed}");

        let mut keys = groups.iter().map(|g| g.key.clone()).collect::<Vec<_>>();
        keys.dedup();
        assert_eq!(keys.len(), groups.len(), "group keys must be unique");
    }
}

#[test]
fn adding_a_corroborator_never_lowers_confidence() {
    let cfg = EngineConfig::default();
    let pool = [
        "laliga_official",
        "promiedos",
        "flashscore",
        "sofascore",
        "betsapi",
        "whoscored",
        "transfermarkt",
        "understat",
        "blog_a",
        "blog_b",
    ];
    // Every ordered prefix of several rotations of the pool.
    for start in 0..pool.len() {
        let rotated: Vec<&str> = pool
            .iter()
            .cycle()
            .skip(start)
            .take(pool.len())
            .copied()
            .collect();
        let mut prev = 0.0;
        for k in 1..=rotated.len() {
            let score = confidence_score(&rotated[..k], &cfg);
            assert!(score >= prev, "rotation {start}, k {k}: {score} < {prev}");
            assert!((0.0..=1.0).contains(&score));
            prev = score;
        }
    }
}

#[test]
fn no_canonical_record_below_the_source_threshold() {
    for threshold in 1..=5 {
        let cfg = EngineConfig {
            min_sources_required: threshold,
            ..EngineConfig::default()
        };
        let batch = noisy_batch(threshold as u64);

        for group in group_records(batch.clone(), &cfg) {
            let outcome = validate_group(&group, &cfg);
            if outcome.is_valid {
                assert!(outcome.valid_sources.len() >= threshold);
            }
        }

        let out = reconcile(batch, &cfg, now());
        for rec in &out.canonical {
            assert!(rec.metadata.sources_confirmed.len() >= threshold);
        }
    }
}

#[test]
fn prediction_ready_is_a_subset_of_canonical() {
    let cfg = EngineConfig::default();
    let out = reconcile(noisy_batch(5), &cfg, now());
    assert!(!out.canonical.is_empty());
    for rec in &out.prediction_ready {
        assert!(out.canonical.contains(rec));
        assert!(rec.metadata.confidence_score >= cfg.min_confidence_for_prediction);
    }
}

#[test]
fn normalizing_twice_changes_nothing() {
    for rec in noisy_batch(9) {
        for name in [rec.subject_a(), rec.subject_b()] {
            let once = normalize_subject(name);
            assert_eq!(normalize_subject(&once), once);
        }
    }
}
