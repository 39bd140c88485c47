//! Multi-source confidence fusion and the short-horizon forecast curve.

use crate::signal::DetectedSpot;
use serde::Serialize;

pub const CAMERA_WEIGHT: f64 = 0.5;
pub const CROWD_WEIGHT: f64 = 0.3;
pub const PREDICTION_WEIGHT: f64 = 0.2;

/// Crowd signal mapped to a confidence term: a fresh "spot is free"
/// report is strong, an explicit "someone is there" strongly negative.
pub const CROWD_FREE_CONFIDENCE: f64 = 0.9;
pub const CROWD_TAKEN_CONFIDENCE: f64 = 0.2;

pub const WALKING_SPEED_M_PER_MIN: f64 = 80.0;

const FORECAST_GAIN_CAP: f64 = 0.25;
const FORECAST_PRESSURE_SCALE: f64 = 0.5;
const FORECAST_MAX_HORIZON_MIN: f64 = 10.0;

/// Per-spot signal terms after overrides and degradation. `None` means
/// the source is unavailable and its weight is dropped from the fusion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTerms {
    pub camera: Option<f64>,
    pub crowd: Option<f64>,
    pub prediction: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastCurve {
    #[serde(rename = "1min")]
    pub one_min: f64,
    #[serde(rename = "3min")]
    pub three_min: f64,
    #[serde(rename = "5min")]
    pub five_min: f64,
    #[serde(rename = "10min")]
    pub ten_min: f64,
}

impl ForecastCurve {
    pub fn flat(confidence: f64) -> Self {
        Self {
            one_min: confidence,
            three_min: confidence,
            five_min: confidence,
            ten_min: confidence,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [self.one_min, self.three_min, self.five_min, self.ten_min]
    }
}

/// A ranked empty spot with its fused score and forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRecommendation {
    #[serde(flatten)]
    pub spot: DetectedSpot,
    pub distance_meters: f64,
    pub walking_time_minutes: f64,
    pub queue_position: u32,
    pub distance_penalty: f64,
    pub queue_penalty: f64,
    pub overall_confidence: f64,
    pub future_confidence: ForecastCurve,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover_minutes: Option<f64>,
}

pub fn crowd_confidence(spot_free: bool) -> f64 {
    if spot_free {
        CROWD_FREE_CONFIDENCE
    } else {
        CROWD_TAKEN_CONFIDENCE
    }
}

/// Weighted average over the present terms, weights renormalized so a
/// missing source redistributes its share instead of dragging the
/// score down.
pub fn fuse(terms: &SignalTerms) -> f64 {
    let weighted = [
        (terms.camera, CAMERA_WEIGHT),
        (terms.crowd, CROWD_WEIGHT),
        (terms.prediction, PREDICTION_WEIGHT),
    ];

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (value, weight) in weighted {
        if let Some(value) = value {
            numerator += value.clamp(0.0, 1.0) * weight;
            denominator += weight;
        }
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Confidence drift at a horizon: short turnover frees spots up over
/// time, queue pressure eats into that the further out you look. No
/// turnover history means no drift.
fn decay_factor(horizon_min: f64, turnover_minutes: Option<f64>, queue_penalty: f64) -> f64 {
    let Some(turnover) = turnover_minutes else {
        return 0.0;
    };
    let turnover = turnover.max(1.0);
    let gain = FORECAST_GAIN_CAP * (horizon_min / (horizon_min + turnover));
    let pressure =
        FORECAST_PRESSURE_SCALE * queue_penalty * (horizon_min / FORECAST_MAX_HORIZON_MIN);
    gain - pressure
}

pub fn forecast(
    overall_confidence: f64,
    turnover_minutes: Option<f64>,
    queue_penalty: f64,
) -> ForecastCurve {
    let at = |horizon: f64| {
        (overall_confidence + decay_factor(horizon, turnover_minutes, queue_penalty))
            .clamp(0.0, 1.0)
    };
    ForecastCurve {
        one_min: at(1.0),
        three_min: at(3.0),
        five_min: at(5.0),
        ten_min: at(10.0),
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fuse the signal terms for one empty spot and attach penalties and
/// the forecast curve.
pub fn score_spot(
    spot: DetectedSpot,
    distance_meters: f64,
    queue_position: u32,
    terms: &SignalTerms,
    turnover_minutes: Option<f64>,
) -> SpotRecommendation {
    let distance_penalty = super::occupancy::distance_penalty(distance_meters);
    let queue_penalty = super::occupancy::queue_penalty(queue_position);
    let raw = fuse(terms);
    let overall_confidence = (raw - distance_penalty - queue_penalty).clamp(0.0, 1.0);
    let future_confidence = forecast(overall_confidence, turnover_minutes, queue_penalty);
    let walking_time_minutes = round_tenth(distance_meters.max(0.0) / WALKING_SPEED_M_PER_MIN);

    SpotRecommendation {
        spot,
        distance_meters,
        walking_time_minutes,
        queue_position,
        distance_penalty,
        queue_penalty,
        overall_confidence,
        future_confidence,
        turnover_minutes,
    }
}
