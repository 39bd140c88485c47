use crate::engine::confidence::SpotRecommendation;
use crate::engine::legal::{LegalContextEntry, WorkRecommendation};
use crate::engine::ranker::LotSummary;
use crate::engine::reroute::RerouteDecision;
use crate::signal::DetectedSpot;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    pub id: String,
    pub name: String,
    pub lot_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// The aggregate answer for one request. `legalContext` and
/// `workRecommendations` appear only for work-scenario requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceResponse {
    pub camera: CameraInfo,
    pub camera_distance: f64,
    pub lot_summary: LotSummary,
    pub recommendations: Vec<SpotRecommendation>,
    pub all_spots: Vec<DetectedSpot>,
    pub reroute_decision: RerouteDecision,
    pub simulated_users: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_context: Option<Vec<LegalContextEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_recommendations: Option<Vec<WorkRecommendation>>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub cameras: usize,
    pub alternatives: usize,
    pub timestamp: String,
}
