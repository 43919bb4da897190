//! Brier score and expected calibration error.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bidwise_core::config::CalibrationConfig;
use bidwise_core::models::{CalibrationMetrics, OutcomeObservation, RecommendationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub mean_confidence: f64,
    /// Observed win rate in the bin.
    pub accuracy: f64,
}

/// Calibration over a whole outcome population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub population_size: usize,
    pub mean_brier: f64,
    pub ece: f64,
    pub win_rate: f64,
    pub overconfidence_ratio: f64,
    pub underconfidence_ratio: f64,
    pub bins: Vec<CalibrationBin>,
    pub model_version: String,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CalibrationCalculator {
    bins: usize,
    model_version: String,
}

impl CalibrationCalculator {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            bins: config.ece_bins.max(1),
            model_version: config.model_version.clone(),
        }
    }

    pub fn brier(observation: &OutcomeObservation) -> f64 {
        let diff = observation.predicted() - observation.status.as_binary();
        diff * diff
    }

    fn bin_index(&self, predicted: f64) -> usize {
        ((predicted * self.bins as f64) as usize).min(self.bins - 1)
    }

    /// Report over `observations`, one per recommendation. Repeated ids keep
    /// the latest recording.
    pub fn report(&self, observations: &[OutcomeObservation], now: DateTime<Utc>) -> CalibrationReport {
        let population = latest_per_id(observations);
        let n = population.len();
        if n == 0 {
            return CalibrationReport {
                population_size: 0,
                mean_brier: 0.0,
                ece: 0.0,
                win_rate: 0.0,
                overconfidence_ratio: 0.0,
                underconfidence_ratio: 0.0,
                bins: Vec::new(),
                model_version: self.model_version.clone(),
                computed_at: now,
            };
        }
        let total = n as f64;

        let mean_brier = population.iter().map(Self::brier).sum::<f64>() / total;
        let win_rate = population.iter().map(|o| o.status.as_binary()).sum::<f64>() / total;

        let bins = self.bin_stats(&population);
        let ece = bins
            .iter()
            .map(|b| (b.count as f64 / total) * (b.accuracy - b.mean_confidence).abs())
            .sum();

        let over = population.iter().filter(|o| o.predicted() > win_rate).count();
        let under = population.iter().filter(|o| o.predicted() < win_rate).count();

        CalibrationReport {
            population_size: n,
            mean_brier,
            ece,
            win_rate,
            overconfidence_ratio: over as f64 / total,
            underconfidence_ratio: under as f64 / total,
            bins,
            model_version: self.model_version.clone(),
            computed_at: now,
        }
    }

    /// Metrics for one recommendation within the population. `None` if the
    /// id has no recorded outcome.
    pub fn metrics_for(
        &self,
        id: &RecommendationId,
        observations: &[OutcomeObservation],
        now: DateTime<Utc>,
    ) -> Option<CalibrationMetrics> {
        let population = latest_per_id(observations);
        let target = population.iter().find(|o| o.recommendation_id == *id)?;
        let report = self.report(&population, now);

        let bin = &report.bins[self.bin_index(target.predicted())];
        let ece_contribution =
            (bin.accuracy - bin.mean_confidence).abs() / report.population_size as f64;

        Some(CalibrationMetrics {
            brier_score: Self::brier(target),
            ece_contribution,
            population_ece: report.ece,
            overconfidence_ratio: report.overconfidence_ratio,
            underconfidence_ratio: report.underconfidence_ratio,
            population_size: report.population_size,
            model_version: report.model_version,
            computed_at: now,
        })
    }

    fn bin_stats(&self, population: &[OutcomeObservation]) -> Vec<CalibrationBin> {
        let mut sums = vec![(0usize, 0.0f64, 0.0f64); self.bins];
        for o in population {
            let slot = &mut sums[self.bin_index(o.predicted())];
            slot.0 += 1;
            slot.1 += o.predicted();
            slot.2 += o.status.as_binary();
        }
        let width = 1.0 / self.bins as f64;
        sums.into_iter()
            .enumerate()
            .map(|(i, (count, conf, wins))| {
                let (mean_confidence, accuracy) = if count == 0 {
                    (0.0, 0.0)
                } else {
                    (conf / count as f64, wins / count as f64)
                };
                CalibrationBin {
                    lower: i as f64 * width,
                    upper: (i + 1) as f64 * width,
                    count,
                    mean_confidence,
                    accuracy,
                }
            })
            .collect()
    }
}

/// One observation per id, the most recently recorded one winning. Output
/// is ordered by id so results do not depend on input order.
fn latest_per_id(observations: &[OutcomeObservation]) -> Vec<OutcomeObservation> {
    let mut latest: BTreeMap<RecommendationId, &OutcomeObservation> = BTreeMap::new();
    for o in observations {
        match latest.get(&o.recommendation_id) {
            Some(existing) if existing.recorded_at > o.recorded_at => {}
            _ => {
                latest.insert(o.recommendation_id, o);
            }
        }
    }
    latest.into_values().cloned().collect()
}
