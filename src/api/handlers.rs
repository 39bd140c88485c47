use crate::api::responses::{ErrorBody, HealthResponse, IntelligenceResponse};
use crate::error::EngineError;
use crate::overrides::DemoOverrides;
use crate::service::{IntelligenceRequest, IntelligenceService};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub enum IntelligenceHttpResponse {
    Success(Box<IntelligenceResponse>),
    Error { status: StatusCode, body: ErrorBody },
}

impl IntoResponse for IntelligenceHttpResponse {
    fn into_response(self) -> Response {
        match self {
            IntelligenceHttpResponse::Success(body) => {
                (StatusCode::OK, Json(body)).into_response()
            }
            IntelligenceHttpResponse::Error { status, body } => {
                (status, Json(body)).into_response()
            }
        }
    }
}

pub async fn get_spot_intelligence(
    State(service): State<Arc<IntelligenceService>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let request = match build_request(&params) {
        Ok(request) => request,
        Err(err) => return error_response(err),
    };

    match service.handle(&request, OffsetDateTime::now_utc()).await {
        Ok(response) => IntelligenceHttpResponse::Success(Box::new(response)),
        Err(err) => error_response(err),
    }
}

fn build_request(params: &HashMap<String, String>) -> Result<IntelligenceRequest, EngineError> {
    let lat = parse_coordinate(params, "lat")?;
    let lng = parse_coordinate(params, "lng")?;
    Ok(IntelligenceRequest {
        lat,
        lng,
        overrides: DemoOverrides::from_query(params),
    })
}

fn parse_coordinate(params: &HashMap<String, String>, key: &str) -> Result<f64, EngineError> {
    let raw = params
        .get(key)
        .ok_or_else(|| EngineError::InvalidRequest(format!("missing required parameter {key}")))?;
    raw.parse::<f64>()
        .map_err(|_| EngineError::InvalidRequest(format!("{key} is not a number: {raw}")))
}

fn error_response(err: EngineError) -> IntelligenceHttpResponse {
    let status = match err {
        EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        EngineError::NoCameraInRange(_) => StatusCode::NOT_FOUND,
        EngineError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
    };
    IntelligenceHttpResponse::Error {
        status,
        body: ErrorBody {
            error: err.to_string(),
        },
    }
}

pub async fn get_health(State(service): State<Arc<IntelligenceService>>) -> impl IntoResponse {
    let registry = service.registry();
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());
    Json(HealthResponse {
        status: "ok",
        cameras: registry.cameras.len(),
        alternatives: registry.alternatives.len(),
        timestamp,
    })
}
