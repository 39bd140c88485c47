//! Deterministic ordering of recommendations and the lot-wide
//! occupancy summary.

use crate::engine::confidence::SpotRecommendation;
use crate::signal::DetectedSpot;
use serde::Serialize;

pub const TOP_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSummary {
    pub total_spots: u32,
    pub open_spots: u32,
    pub occupied_spots: u32,
    pub occupancy_rate: f64,
}

/// Confidence descending, then distance ascending, then id ascending.
pub fn rank(recommendations: &mut [SpotRecommendation]) {
    recommendations.sort_by(|a, b| {
        b.overall_confidence
            .total_cmp(&a.overall_confidence)
            .then(a.distance_meters.total_cmp(&b.distance_meters))
            .then(a.spot.id.cmp(&b.spot.id))
    });
}

pub fn lot_summary(all_spots: &[DetectedSpot]) -> LotSummary {
    let total_spots = all_spots.len() as u32;
    let open_spots = all_spots.iter().filter(|s| s.is_empty()).count() as u32;
    let occupied_spots = total_spots - open_spots;
    let occupancy_rate = if total_spots == 0 {
        0.0
    } else {
        f64::from(occupied_spots) / f64::from(total_spots)
    };

    LotSummary {
        total_spots,
        open_spots,
        occupied_spots,
        occupancy_rate,
    }
}

/// Summary with the occupancy rate pinned by the demo override. The
/// rate carries the forced percentage exactly; counts are rounded to
/// whole spots, so on small lots they can differ from the rate by less
/// than one spot while open + occupied still equals total.
pub fn lot_summary_with_rate(all_spots: &[DetectedSpot], occupancy_percent: u8) -> LotSummary {
    let total_spots = all_spots.len() as u32;
    let occupancy_rate = f64::from(occupancy_percent.min(100)) / 100.0;
    let occupied_spots =
        ((f64::from(total_spots) * occupancy_rate).round() as u32).min(total_spots);
    let open_spots = total_spots - occupied_spots;

    LotSummary {
        total_spots,
        open_spots,
        occupied_spots,
        occupancy_rate,
    }
}
