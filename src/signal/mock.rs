//! Scriptable signal sources for tests: fixed payloads or forced
//! failures, one behavior per adapter.

use crate::error::SignalError;
use crate::registry::{CameraSite, SpotId};
use crate::signal::{CameraDetector, CrowdSource, DetectedSpot, PredictionSource};
use std::collections::HashMap;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct MockCameraDetector {
    result: Result<Vec<DetectedSpot>, SignalError>,
    delay: Duration,
}

impl MockCameraDetector {
    pub fn with_spots(spots: Vec<DetectedSpot>) -> Self {
        Self {
            result: Ok(spots),
            delay: Duration::ZERO,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            result: Err(SignalError::Unreachable("mock camera offline".to_string())),
            delay: Duration::ZERO,
        }
    }

    /// Sleeps before answering, for adapter-timeout tests.
    pub fn slow(delay: Duration, spots: Vec<DetectedSpot>) -> Self {
        Self {
            result: Ok(spots),
            delay,
        }
    }
}

impl CameraDetector for MockCameraDetector {
    fn detect(&self, _camera: &CameraSite) -> Result<Vec<DetectedSpot>, SignalError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.result.clone()
    }
}

#[derive(Debug, Clone)]
pub struct MockCrowdSource {
    result: Result<HashMap<SpotId, bool>, SignalError>,
}

impl MockCrowdSource {
    pub fn with_reports(reports: HashMap<SpotId, bool>) -> Self {
        Self {
            result: Ok(reports),
        }
    }

    pub fn silent() -> Self {
        Self {
            result: Ok(HashMap::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            result: Err(SignalError::Unreachable("mock crowd offline".to_string())),
        }
    }
}

impl CrowdSource for MockCrowdSource {
    fn reports(&self, _camera: &CameraSite) -> Result<HashMap<SpotId, bool>, SignalError> {
        self.result.clone()
    }
}

#[derive(Debug, Clone)]
pub struct MockPredictionSource {
    result: Result<f64, SignalError>,
}

impl MockPredictionSource {
    pub fn with_baseline(baseline: f64) -> Self {
        Self {
            result: Ok(baseline),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            result: Err(SignalError::Unreachable(
                "mock prediction offline".to_string(),
            )),
        }
    }
}

impl PredictionSource for MockPredictionSource {
    fn baseline(&self, _at: OffsetDateTime) -> Result<f64, SignalError> {
        self.result.clone()
    }
}
