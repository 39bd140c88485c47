//! The reroute decision: stay in this lot or abandon it for a
//! registered alternative. Pure function of its inputs.

use crate::engine::confidence::SpotRecommendation;
use crate::engine::ranker::LotSummary;
use crate::registry::AlternativeLot;
use serde::Serialize;

pub const OCCUPANCY_REROUTE_THRESHOLD: f64 = 0.85;
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.40;
pub const DEFAULT_DRIVE_BUDGET_MINUTES: f64 = 15.0;

const REASON_FORCED: &str = "Demo override requested reroute";
const REASON_LOT_FULL: &str = "Lot is over 85% full";
const REASON_LOW_CONFIDENCE: &str = "No high-confidence spots found";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RerouteDecision {
    pub should_reroute: bool,
    pub reason: Option<String>,
    pub current_confidence: f64,
    pub alternative: Option<AlternativeLot>,
}

pub fn decide(
    recommendations: &[SpotRecommendation],
    summary: &LotSummary,
    force_reroute: bool,
    alternatives: &[AlternativeLot],
    drive_budget_minutes: f64,
) -> RerouteDecision {
    let current_confidence = recommendations
        .iter()
        .map(|r| r.overall_confidence)
        .fold(0.0, f64::max);

    let reason = if force_reroute {
        Some(REASON_FORCED)
    } else if summary.occupancy_rate > OCCUPANCY_REROUTE_THRESHOLD {
        Some(REASON_LOT_FULL)
    } else if current_confidence < LOW_CONFIDENCE_THRESHOLD {
        Some(REASON_LOW_CONFIDENCE)
    } else {
        None
    };

    let should_reroute = reason.is_some();
    let alternative = if should_reroute {
        best_alternative(alternatives, drive_budget_minutes).cloned()
    } else {
        None
    };

    RerouteDecision {
        should_reroute,
        reason: reason.map(str::to_string),
        current_confidence,
        alternative,
    }
}

/// Highest estimated confidence within the drive-time budget. The
/// first qualifying lot wins exact ties, so the registry order is the
/// tiebreak.
fn best_alternative(
    alternatives: &[AlternativeLot],
    drive_budget_minutes: f64,
) -> Option<&AlternativeLot> {
    alternatives
        .iter()
        .filter(|lot| lot.estimated_drive_minutes <= drive_budget_minutes)
        .reduce(|best, lot| {
            if lot.estimated_confidence > best.estimated_confidence {
                lot
            } else {
                best
            }
        })
}
