//! Timed-restriction evaluation for the work scenario: lot-wide legal
//! context entries plus a per-spot risk classification, both computed
//! from the same registered zone list.

use crate::engine::confidence::SpotRecommendation;
use crate::registry::{RestrictionZone, SpotId, ZoneRule};
use serde::Serialize;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time};

pub const DEFAULT_PARKING_DURATION_MINUTES: u32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalContextEntry {
    pub zone_name: String,
    pub is_legal: bool,
    pub reason: String,
    /// `None` exactly when the zone is free.
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpotClassification {
    #[serde(rename = "safe")]
    Safe,
    #[serde(rename = "sweep-risk")]
    SweepRisk,
    #[serde(rename = "meter-expiring")]
    MeterExpiring,
    #[serde(rename = "illegal-at-arrival")]
    IllegalAtArrival,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecommendation {
    pub spot_id: SpotId,
    pub classification: SpotClassification,
}

struct WindowHit {
    active_at_arrival: bool,
}

/// First occurrence of a daily hour window (optionally pinned to one
/// weekday, 0 = Monday) that intersects `[arrival, departure)`. An end
/// hour at or before the start hour wraps past midnight into the next
/// day.
fn window_hit(
    arrival: OffsetDateTime,
    departure: OffsetDateTime,
    weekday: Option<u8>,
    start_hour: u8,
    end_hour: u8,
) -> Option<WindowHit> {
    let span_days = (departure - arrival).whole_days() + 1;
    // The scan starts one day back so a wrapped window that began the
    // previous evening still covers an early-morning arrival.
    for offset in -1..=span_days {
        let Some(day) = arrival.date().checked_add(Duration::days(offset)) else {
            return None;
        };
        if let Some(weekday) = weekday
            && day.weekday().number_days_from_monday() != weekday
        {
            continue;
        }
        let midnight =
            PrimitiveDateTime::new(day, Time::MIDNIGHT).assume_offset(arrival.offset());
        let start = midnight + Duration::hours(i64::from(start_hour));
        let end = if end_hour > start_hour {
            midnight + Duration::hours(i64::from(end_hour))
        } else {
            midnight + Duration::hours(i64::from(end_hour) + 24)
        };
        if start < departure && end > arrival {
            return Some(WindowHit {
                active_at_arrival: start <= arrival && arrival < end,
            });
        }
    }
    None
}

pub fn metered_cost(hourly_rate: f64, daily_max: f64, duration_minutes: u32) -> f64 {
    let billed_hours = duration_minutes.div_ceil(60);
    (hourly_rate * f64::from(billed_hours)).min(daily_max)
}

fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}

/// Legality and cost per registered zone for a stay of
/// `duration_minutes` starting at `arrival`.
pub fn evaluate_zones(
    zones: &[RestrictionZone],
    arrival: OffsetDateTime,
    duration_minutes: u32,
) -> Vec<LegalContextEntry> {
    let departure = arrival + Duration::minutes(i64::from(duration_minutes));
    zones
        .iter()
        .map(|zone| {
            let (is_legal, reason, estimated_cost) = match &zone.rule {
                ZoneRule::Sweeping {
                    weekday,
                    start_hour,
                    end_hour,
                } => {
                    if window_hit(arrival, departure, Some(*weekday), *start_hour, *end_hour)
                        .is_some()
                    {
                        (
                            false,
                            format!(
                                "Street sweeping {} {:02}:00-{:02}:00 overlaps the stay",
                                weekday_name(*weekday),
                                start_hour,
                                end_hour
                            ),
                            None,
                        )
                    } else {
                        (true, "No sweeping during the stay".to_string(), None)
                    }
                }
                ZoneRule::Permit {
                    start_hour,
                    end_hour,
                } => {
                    if window_hit(arrival, departure, None, *start_hour, *end_hour).is_some() {
                        (
                            false,
                            format!(
                                "Permit-only hours {:02}:00-{:02}:00 overlap the stay",
                                start_hour, end_hour
                            ),
                            None,
                        )
                    } else {
                        (true, "Outside permit-only hours".to_string(), None)
                    }
                }
                ZoneRule::Metered {
                    hourly_rate,
                    daily_max,
                    time_limit_minutes,
                } => {
                    let cost = metered_cost(*hourly_rate, *daily_max, duration_minutes);
                    if duration_minutes > *time_limit_minutes {
                        (
                            false,
                            format!("Stay exceeds the {time_limit_minutes} minute meter limit"),
                            Some(cost),
                        )
                    } else {
                        (
                            true,
                            format!("Within the {time_limit_minutes} minute meter limit"),
                            Some(cost),
                        )
                    }
                }
                ZoneRule::Free => (true, "No restrictions".to_string(), None),
            };

            LegalContextEntry {
                zone_name: zone.name.clone(),
                is_legal,
                reason,
                estimated_cost,
            }
        })
        .collect()
}

fn zone_covers_row(zone: &RestrictionZone, row: &str) -> bool {
    zone.rows
        .as_ref()
        .is_none_or(|rows| rows.iter().any(|r| r == row))
}

/// Risk category for one spot over the full stay. Timed windows that
/// are already active at arrival dominate; otherwise a sweeping window
/// inside the stay, then a lapsing meter.
pub fn classify_spot(
    zones: &[RestrictionZone],
    row: &str,
    arrival: OffsetDateTime,
    duration_minutes: u32,
) -> SpotClassification {
    let departure = arrival + Duration::minutes(i64::from(duration_minutes));
    let mut sweep_risk = false;
    let mut meter_expiring = false;

    for zone in zones.iter().filter(|z| zone_covers_row(z, row)) {
        match &zone.rule {
            ZoneRule::Sweeping {
                weekday,
                start_hour,
                end_hour,
            } => {
                if let Some(hit) =
                    window_hit(arrival, departure, Some(*weekday), *start_hour, *end_hour)
                {
                    if hit.active_at_arrival {
                        return SpotClassification::IllegalAtArrival;
                    }
                    sweep_risk = true;
                }
            }
            ZoneRule::Permit {
                start_hour,
                end_hour,
            } => {
                if let Some(hit) = window_hit(arrival, departure, None, *start_hour, *end_hour)
                    && hit.active_at_arrival
                {
                    return SpotClassification::IllegalAtArrival;
                }
            }
            ZoneRule::Metered {
                time_limit_minutes, ..
            } => {
                if duration_minutes > *time_limit_minutes {
                    meter_expiring = true;
                }
            }
            ZoneRule::Free => {}
        }
    }

    if sweep_risk {
        SpotClassification::SweepRisk
    } else if meter_expiring {
        SpotClassification::MeterExpiring
    } else {
        SpotClassification::Safe
    }
}

pub fn classify_recommendations(
    zones: &[RestrictionZone],
    recommendations: &[SpotRecommendation],
    arrival: OffsetDateTime,
    duration_minutes: u32,
) -> Vec<WorkRecommendation> {
    recommendations
        .iter()
        .map(|rec| WorkRecommendation {
            spot_id: rec.spot.id,
            classification: classify_spot(zones, &rec.spot.row, arrival, duration_minutes),
        })
        .collect()
}
