//! Sustainability impact estimation.
//!
//! Two pure functions form the core: a per-category carbon estimate for a
//! listed material, and a weighted score over a user's aggregate activity.
//! The service module aggregates store data into those functions; the router
//! serves the results.

pub mod router;
pub mod service;

pub use router::impact_router;
pub use service::{ImpactService, ImpactServiceError, PlatformImpact};

use serde::{Deserialize, Serialize};

const CARBON_WEIGHT: f64 = 0.5;
const MATERIALS_WEIGHT: f64 = 0.3;
const PROJECTS_WEIGHT: f64 = 0.2;

/// Estimated kg CO2e avoided per unit, by material category. Unknown
/// categories use the "other" factor.
pub fn carbon_factor(category: &str) -> f64 {
    match category.trim().to_ascii_lowercase().as_str() {
        "fabric" => 25.0,
        "clothing" => 20.0,
        "accessories" => 5.0,
        "leather" => 30.0,
        _ => 15.0,
    }
}

/// kg CO2e saved by reusing `quantity` units of a category, rounded to two
/// decimal places. An empty category yields zero, and a negative or
/// non-finite quantity is clamped to zero rather than producing a negative
/// estimate: quantities are counts of reused units, so the function's
/// domain is `quantity >= 0` and anything below it is treated as absent.
pub fn estimate_carbon_saved(category: &str, quantity: f64) -> f64 {
    if category.trim().is_empty() || !quantity.is_finite() || quantity <= 0.0 {
        return 0.0;
    }
    round_hundredth(carbon_factor(category) * quantity)
}

/// Weighted impact score over a user's aggregate activity. Rounds half away
/// from zero.
pub fn impact_score(carbon_saved: f64, materials_recycled: u64, projects_completed: u64) -> i64 {
    let score = carbon_saved * CARBON_WEIGHT
        + materials_recycled as f64 * MATERIALS_WEIGHT
        + projects_completed as f64 * PROJECTS_WEIGHT;
    score.round() as i64
}

fn round_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A user's aggregate impact, as served to dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub carbon_saved: f64,
    pub materials_recycled: u64,
    pub projects_completed: u64,
    pub impact_score: i64,
}

impl ImpactSummary {
    /// Derive the summary from raw aggregates. The score uses the unrounded
    /// carbon total; only the displayed value is rounded to two decimals.
    pub fn derive(carbon_saved: f64, materials_recycled: u64, projects_completed: u64) -> Self {
        Self {
            carbon_saved: round_hundredth(carbon_saved),
            materials_recycled,
            projects_completed,
            impact_score: impact_score(carbon_saved, materials_recycled, projects_completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fabric_estimate_is_linear_in_quantity() {
        assert_eq!(estimate_carbon_saved("fabric", 10.0), 250.0);
        assert_eq!(
            estimate_carbon_saved("fabric", 8.0),
            2.0 * estimate_carbon_saved("fabric", 4.0)
        );
    }

    #[test]
    fn unknown_category_falls_back_to_other_factor() {
        assert_eq!(estimate_carbon_saved("UNKNOWN", 4.0), 60.0);
        assert_eq!(carbon_factor("reclaimed-timber"), carbon_factor("other"));
    }

    #[test]
    fn category_lookup_is_case_insensitive() {
        assert_eq!(
            estimate_carbon_saved("Leather", 2.0),
            estimate_carbon_saved("leather", 2.0)
        );
    }

    #[test]
    fn absent_inputs_short_circuit_to_zero() {
        assert_eq!(estimate_carbon_saved("", 5.0), 0.0);
        assert_eq!(estimate_carbon_saved("fabric", 0.0), 0.0);
        assert_eq!(estimate_carbon_saved("fabric", -1.0), 0.0);
        assert_eq!(estimate_carbon_saved("fabric", f64::NAN), 0.0);
    }

    #[test]
    fn estimate_rounds_to_two_decimals() {
        // 15 * 0.333 = 4.995 -> 5.0 at two decimals.
        assert_eq!(estimate_carbon_saved("other", 0.333), 5.0);
    }

    #[test]
    fn estimate_is_deterministic() {
        let first = estimate_carbon_saved("clothing", 7.0);
        let second = estimate_carbon_saved("clothing", 7.0);
        assert_eq!(first, second);
    }

    #[test]
    fn weighted_score_matches_reference_values() {
        // 100*0.5 + 5*0.3 + 2*0.2 = 51.9 -> 52
        assert_eq!(impact_score(100.0, 5, 2), 52);
        assert_eq!(impact_score(0.0, 0, 0), 0);
    }

    #[test]
    fn score_rounds_half_away_from_zero() {
        // 1.0*0.5 = 0.5 rounds up.
        assert_eq!(impact_score(1.0, 0, 0), 1);
    }

    #[test]
    fn summary_rounds_carbon_for_display_but_scores_raw_total() {
        let summary = ImpactSummary::derive(33.333, 5, 2);
        assert_eq!(summary.carbon_saved, 33.33);
        // round(33.333*0.5 + 1.5 + 0.4) = round(18.5665) = 19
        assert_eq!(summary.impact_score, 19);
    }
}
