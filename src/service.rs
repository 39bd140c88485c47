//! Stateless request orchestration: validate input, gather the three
//! signal sources concurrently, run the scoring pipeline, and assemble
//! the aggregate response.

use crate::api::responses::{CameraInfo, IntelligenceResponse};
use crate::engine::confidence::{self, SignalTerms};
use crate::engine::legal;
use crate::engine::occupancy::{
    CandidateSpot, CompetitionModel, SimulatedCompetition, HIGH_CONFIDENCE_ML,
};
use crate::engine::ranker::{self, TOP_RECOMMENDATIONS};
use crate::engine::reroute::{self, DEFAULT_DRIVE_BUDGET_MINUTES};
use crate::error::{EngineError, SignalError};
use crate::geo;
use crate::overrides::DemoOverrides;
use crate::registry::{Registry, SpotId, SpotLabel};
use crate::signal::live::{RegistryCameraDetector, RegistryCrowdSource, TablePrediction};
use crate::signal::{
    spots_from_layout, spots_with_forced_label, CameraDetector, CrowdSource, PredictionSource,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

pub const DEFAULT_SEARCH_RADIUS_M: f64 = 1500.0;
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// How far a camera may be from the queried point.
    pub search_radius_m: f64,
    /// Budget for each individual signal adapter call.
    pub adapter_timeout: Duration,
    pub drive_budget_minutes: f64,
    pub top_recommendations: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            drive_budget_minutes: DEFAULT_DRIVE_BUDGET_MINUTES,
            top_recommendations: TOP_RECOMMENDATIONS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntelligenceRequest {
    pub lat: f64,
    pub lng: f64,
    pub overrides: DemoOverrides,
}

pub struct IntelligenceService {
    registry: Arc<Registry>,
    camera: Arc<dyn CameraDetector>,
    crowd: Arc<dyn CrowdSource>,
    prediction: Arc<dyn PredictionSource>,
    competition: Arc<dyn CompetitionModel>,
    settings: EngineSettings,
}

impl IntelligenceService {
    /// Service wired to the registry-backed live adapters.
    pub fn new(registry: Arc<Registry>, settings: EngineSettings) -> Self {
        let prediction = Arc::new(TablePrediction::new(Arc::clone(&registry)));
        Self::with_adapters(
            registry,
            Arc::new(RegistryCameraDetector),
            Arc::new(RegistryCrowdSource),
            prediction,
            Arc::new(SimulatedCompetition),
            settings,
        )
    }

    pub fn with_adapters(
        registry: Arc<Registry>,
        camera: Arc<dyn CameraDetector>,
        crowd: Arc<dyn CrowdSource>,
        prediction: Arc<dyn PredictionSource>,
        competition: Arc<dyn CompetitionModel>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            camera,
            crowd,
            prediction,
            competition,
            settings,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn handle(
        &self,
        request: &IntelligenceRequest,
        now: OffsetDateTime,
    ) -> Result<IntelligenceResponse, EngineError> {
        if !geo::valid_latitude(request.lat) {
            return Err(EngineError::InvalidRequest(format!(
                "latitude {} out of range",
                request.lat
            )));
        }
        if !geo::valid_longitude(request.lng) {
            return Err(EngineError::InvalidRequest(format!(
                "longitude {} out of range",
                request.lng
            )));
        }

        let (camera_site, camera_distance) = self
            .registry
            .nearest_camera(request.lat, request.lng)
            .filter(|(_, distance)| *distance <= self.settings.search_radius_m)
            .map(|(camera, distance)| (camera.clone(), distance))
            .ok_or(EngineError::NoCameraInRange(self.settings.search_radius_m))?;

        let overrides = &request.overrides;
        let timeout = self.settings.adapter_timeout;

        // The three sources are independent; gather them concurrently,
        // each under its own timeout. A demo override resolves the
        // source immediately without touching the live adapter.
        let camera_signal = async {
            match overrides.camera_spot_available {
                Some(available) => Ok(spots_with_forced_label(&camera_site, available)),
                None => {
                    let detector = Arc::clone(&self.camera);
                    let site = camera_site.clone();
                    call_blocking(timeout, move || detector.detect(&site)).await
                }
            }
        };
        let crowd_signal = async {
            match overrides.phone_spot_free {
                Some(free) => Ok(camera_site
                    .spots
                    .iter()
                    .map(|spot| (spot.id, free))
                    .collect::<HashMap<SpotId, bool>>()),
                None => {
                    let crowd = Arc::clone(&self.crowd);
                    let site = camera_site.clone();
                    call_blocking(timeout, move || crowd.reports(&site)).await
                }
            }
        };
        let prediction_signal = async {
            let prediction = Arc::clone(&self.prediction);
            call_blocking(timeout, move || prediction.baseline(now)).await
        };

        let (camera_result, crowd_result, prediction_result) =
            tokio::join!(camera_signal, crowd_signal, prediction_signal);

        if let (Err(camera_err), Err(crowd_err), Err(prediction_err)) =
            (&camera_result, &crowd_result, &prediction_result)
        {
            return Err(EngineError::UpstreamUnavailable(format!(
                "camera: {camera_err}; crowd: {crowd_err}; prediction: {prediction_err}"
            )));
        }

        // Fallback chain: without camera detections, score the known
        // layout from the remaining sources.
        let (all_spots, camera_available) = match camera_result {
            Ok(spots) => (spots, true),
            Err(err) => {
                warn!(error = %err, camera = %camera_site.id, "Camera feed unavailable, degrading to layout");
                let mut fallback = spots_from_layout(&camera_site);
                for spot in &mut fallback {
                    spot.label = SpotLabel::Empty;
                    spot.ml_confidence = 0.0;
                }
                (fallback, false)
            }
        };
        let crowd_reports = match crowd_result {
            Ok(reports) => Some(reports),
            Err(err) => {
                warn!(error = %err, camera = %camera_site.id, "Crowd reports unavailable");
                None
            }
        };
        let prediction_baseline = match prediction_result {
            Ok(baseline) => Some(baseline.clamp(0.0, 1.0)),
            Err(err) => {
                warn!(error = %err, "Prediction baseline unavailable");
                None
            }
        };

        let empty_spots: Vec<_> = all_spots
            .iter()
            .filter(|spot| spot.is_empty())
            .map(|spot| {
                let distance =
                    geo::haversine_m(request.lat, request.lng, spot.lat, spot.lng);
                (spot.clone(), distance)
            })
            .collect();

        let candidates: Vec<CandidateSpot> = empty_spots
            .iter()
            .map(|(spot, distance)| CandidateSpot {
                id: spot.id,
                distance_meters: *distance,
                high_confidence: !camera_available || spot.ml_confidence >= HIGH_CONFIDENCE_ML,
            })
            .collect();

        let traffic = overrides.traffic.unwrap_or_default();
        let assignment = self.competition.simulate(traffic, &candidates);

        let mut recommendations: Vec<_> = empty_spots
            .into_iter()
            .map(|(spot, distance)| {
                let terms = SignalTerms {
                    camera: camera_available.then_some(spot.ml_confidence),
                    crowd: crowd_reports
                        .as_ref()
                        .and_then(|reports| reports.get(&spot.id))
                        .map(|&free| confidence::crowd_confidence(free)),
                    prediction: prediction_baseline,
                };
                let turnover = camera_site.row_turnover_minutes.get(&spot.row).copied();
                let queue_position = assignment.position(spot.id);
                confidence::score_spot(spot, distance, queue_position, &terms, turnover)
            })
            .collect();

        ranker::rank(&mut recommendations);
        recommendations.truncate(self.settings.top_recommendations);

        let lot_summary = match overrides.occupancy {
            Some(percent) => ranker::lot_summary_with_rate(&all_spots, percent),
            None => ranker::lot_summary(&all_spots),
        };

        let reroute_decision = reroute::decide(
            &recommendations,
            &lot_summary,
            overrides.force_reroute,
            &self.registry.alternatives,
            self.settings.drive_budget_minutes,
        );

        let (legal_context, work_recommendations) = if overrides.work_scenario {
            let duration = overrides
                .parking_duration_minutes
                .unwrap_or(legal::DEFAULT_PARKING_DURATION_MINUTES);
            (
                Some(legal::evaluate_zones(&camera_site.zones, now, duration)),
                Some(legal::classify_recommendations(
                    &camera_site.zones,
                    &recommendations,
                    now,
                    duration,
                )),
            )
        } else {
            (None, None)
        };

        Ok(IntelligenceResponse {
            camera: CameraInfo {
                id: camera_site.id.clone(),
                name: camera_site.name.clone(),
                lot_name: camera_site.lot_name.clone(),
                lat: camera_site.lat,
                lng: camera_site.lng,
            },
            camera_distance,
            lot_summary,
            recommendations,
            all_spots,
            reroute_decision,
            simulated_users: assignment.simulated_users,
            legal_context,
            work_recommendations,
            timestamp: format_timestamp(now),
        })
    }
}

fn format_timestamp(now: OffsetDateTime) -> String {
    now.format(&Rfc3339).unwrap_or_else(|err| {
        warn!(error = %err, "Failed to format response timestamp");
        "1970-01-01T00:00:00Z".to_string()
    })
}

async fn call_blocking<T, F>(timeout: Duration, task: F) -> Result<T, SignalError>
where
    F: FnOnce() -> Result<T, SignalError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(task)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(SignalError::Unreachable(join_error.to_string())),
        Err(_) => Err(SignalError::Timeout(timeout.as_millis())),
    }
}
