//! Registry-backed "live" signal sources. Detection and crowd reports
//! come from the camera's registered baselines so identical requests
//! produce identical signals.

use crate::error::SignalError;
use crate::registry::{CameraSite, Registry, SpotId};
use crate::signal::{spots_from_layout, CameraDetector, CrowdSource, DetectedSpot, PredictionSource};
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Debug, Default)]
pub struct RegistryCameraDetector;

impl CameraDetector for RegistryCameraDetector {
    fn detect(&self, camera: &CameraSite) -> Result<Vec<DetectedSpot>, SignalError> {
        Ok(spots_from_layout(camera))
    }
}

#[derive(Debug, Default)]
pub struct RegistryCrowdSource;

impl CrowdSource for RegistryCrowdSource {
    fn reports(&self, camera: &CameraSite) -> Result<HashMap<SpotId, bool>, SignalError> {
        Ok(camera.crowd_reports.clone())
    }
}

/// Time-of-day baseline from the registry's prediction table. Always
/// answers; there is no unknown state in the table.
#[derive(Debug)]
pub struct TablePrediction {
    registry: Arc<Registry>,
}

impl TablePrediction {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

impl PredictionSource for TablePrediction {
    fn baseline(&self, at: OffsetDateTime) -> Result<f64, SignalError> {
        Ok(self.registry.prediction.baseline(at))
    }
}
