use crate::config::EngineConfig;

fn corroboration_bonus(sources: usize) -> f64 {
    if sources >= 3 {
        1.2
    } else if sources == 2 {
        1.1
    } else {
        1.0
    }
}

/// Trust-weighted confidence in `[0, 1]` for a set of corroborating sources.
///
/// The base score is the mean trust weight times a corroboration bonus, then
/// clamped. It is evaluated for the `k` most trusted sources for every `k`
/// and the best value is kept, so a weak extra source can add corroboration
/// but never drag the score down.
///
/// One consequence: the best single source sets a floor, so any group with a
/// weight-1.0 source scores 1.0, and a strong source paired with a weaker one
/// scores the strong weight rather than their boosted mean.
pub fn confidence_score<S: AsRef<str>>(sources: &[S], cfg: &EngineConfig) -> f64 {
    let mut weights: Vec<f64> = sources
        .iter()
        .map(|s| cfg.trust_weight(s.as_ref()))
        .collect();
    weights.sort_by(|a, b| b.total_cmp(a));

    let mut best = 0.0_f64;
    let mut sum = 0.0_f64;
    for (idx, w) in weights.iter().enumerate() {
        let k = idx + 1;
        sum += w;
        let score = (sum / k as f64 * corroboration_bonus(k)).clamp(0.0, 1.0);
        best = best.max(score);
    }
    best
}
