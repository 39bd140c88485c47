//! Signal source adapters: camera-ML detections, crowdsourced phone
//! reports, and the historical prediction baseline.
//!
//! Each adapter sits behind a trait so the service can swap the live
//! registry-backed implementations for scripted mocks in tests. Demo
//! overrides bypass an adapter entirely for a single request; the
//! override paths therefore live with the service, not here.

use crate::error::SignalError;
use crate::registry::{CameraSite, SpotId, SpotLabel};
use serde::Serialize;
use std::collections::HashMap;
use time::OffsetDateTime;

pub mod live;
pub mod mock;

/// ML confidence reported for every spot when the camera override
/// forces "available" / "taken".
pub const FORCED_AVAILABLE_CONFIDENCE: f64 = 0.95;
pub const FORCED_TAKEN_CONFIDENCE: f64 = 0.05;

/// One spot as detected by the camera feed for a single request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSpot {
    pub id: SpotId,
    pub row: String,
    pub label: SpotLabel,
    pub ml_confidence: f64,
    pub lat: f64,
    pub lng: f64,
    pub distance_from_camera_meters: f64,
}

impl DetectedSpot {
    pub fn is_empty(&self) -> bool {
        self.label == SpotLabel::Empty
    }
}

pub trait CameraDetector: Send + Sync {
    /// Fresh detections for every spot the camera covers.
    fn detect(&self, camera: &CameraSite) -> Result<Vec<DetectedSpot>, SignalError>;
}

pub trait CrowdSource: Send + Sync {
    /// Sparse "no one currently in spot" reports. A missing spot id
    /// means the crowd signal is unknown for that spot.
    fn reports(&self, camera: &CameraSite) -> Result<HashMap<SpotId, bool>, SignalError>;
}

pub trait PredictionSource: Send + Sync {
    /// Baseline availability confidence for the given wall-clock time.
    fn baseline(&self, at: OffsetDateTime) -> Result<f64, SignalError>;
}

/// Detections taken straight from the camera's registered layout.
pub fn spots_from_layout(camera: &CameraSite) -> Vec<DetectedSpot> {
    camera
        .spots
        .iter()
        .map(|site| DetectedSpot {
            id: site.id,
            row: site.row.clone(),
            label: site.baseline_label,
            ml_confidence: site.baseline_ml_confidence.clamp(0.0, 1.0),
            lat: site.lat,
            lng: site.lng,
            distance_from_camera_meters: site.distance_from_camera_meters,
        })
        .collect()
}

/// Layout detections with every label forced by the camera override.
pub fn spots_with_forced_label(camera: &CameraSite, available: bool) -> Vec<DetectedSpot> {
    let (label, confidence) = if available {
        (SpotLabel::Empty, FORCED_AVAILABLE_CONFIDENCE)
    } else {
        (SpotLabel::Occupied, FORCED_TAKEN_CONFIDENCE)
    };
    let mut spots = spots_from_layout(camera);
    for spot in &mut spots {
        spot.label = label;
        spot.ml_confidence = confidence;
    }
    spots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn layout_spots_mirror_baselines() {
        let registry = Registry::builtin();
        let camera = &registry.cameras[0];

        let spots = spots_from_layout(camera);

        assert_eq!(spots.len(), camera.spots.len());
        assert_eq!(spots[0].id, camera.spots[0].id);
        assert_eq!(spots[0].label, camera.spots[0].baseline_label);
        assert_eq!(spots[0].ml_confidence, camera.spots[0].baseline_ml_confidence);
    }

    #[test]
    fn forced_available_marks_every_spot_empty() {
        let registry = Registry::builtin();
        let camera = &registry.cameras[0];

        let spots = spots_with_forced_label(camera, true);

        assert!(spots.iter().all(|s| s.label == SpotLabel::Empty));
        assert!(spots
            .iter()
            .all(|s| s.ml_confidence == FORCED_AVAILABLE_CONFIDENCE));
    }

    #[test]
    fn forced_taken_marks_every_spot_occupied() {
        let registry = Registry::builtin();
        let camera = &registry.cameras[0];

        let spots = spots_with_forced_label(camera, false);

        assert!(spots.iter().all(|s| s.label == SpotLabel::Occupied));
        assert!(spots
            .iter()
            .all(|s| s.ml_confidence == FORCED_TAKEN_CONFIDENCE));
    }

    #[test]
    fn detected_spot_serializes_camel_case() {
        let spot = DetectedSpot {
            id: 3,
            row: "A".to_string(),
            label: SpotLabel::Empty,
            ml_confidence: 0.8,
            lat: 37.0,
            lng: -122.0,
            distance_from_camera_meters: 12.0,
        };

        let value = serde_json::to_value(spot).expect("serialize spot");

        assert_eq!(value["mlConfidence"], 0.8);
        assert_eq!(value["distanceFromCameraMeters"], 12.0);
        assert_eq!(value["label"], "empty");
    }
}
