//! Per-request demo overrides, parsed fresh from query parameters and
//! discarded with the request. Invalid values are ignored with a
//! warning rather than failing the request.

use crate::engine::occupancy::TrafficLevel;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoOverrides {
    /// Directly pins the lot occupancy rate, 0-100.
    pub occupancy: Option<u8>,
    pub traffic: Option<TrafficLevel>,
    pub force_reroute: bool,
    pub camera_spot_available: Option<bool>,
    pub phone_spot_free: Option<bool>,
    pub work_scenario: bool,
    pub parking_duration_minutes: Option<u32>,
}

impl DemoOverrides {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut overrides = Self::default();

        if let Some(raw) = params.get("demoOccupancy") {
            match raw.parse::<u8>() {
                Ok(pct) if pct <= 100 => overrides.occupancy = Some(pct),
                _ => warn!(value = %raw, "Ignoring invalid demoOccupancy"),
            }
        }

        if let Some(raw) = params.get("demoTraffic") {
            match TrafficLevel::parse(raw) {
                Some(level) => overrides.traffic = Some(level),
                None => warn!(value = %raw, "Ignoring invalid demoTraffic"),
            }
        }

        if let Some(raw) = params.get("demoForceReroute") {
            match parse_bool(raw) {
                Some(flag) => overrides.force_reroute = flag,
                None => warn!(value = %raw, "Ignoring invalid demoForceReroute"),
            }
        }

        if let Some(raw) = params.get("demoCameraSpotAvailable") {
            match parse_bool(raw) {
                Some(flag) => overrides.camera_spot_available = Some(flag),
                None => warn!(value = %raw, "Ignoring invalid demoCameraSpotAvailable"),
            }
        }

        if let Some(raw) = params.get("demoPhoneSpotFree") {
            match parse_bool(raw) {
                Some(flag) => overrides.phone_spot_free = Some(flag),
                None => warn!(value = %raw, "Ignoring invalid demoPhoneSpotFree"),
            }
        }

        if let Some(raw) = params.get("workScenario") {
            match parse_bool(raw) {
                Some(flag) => overrides.work_scenario = flag,
                None => warn!(value = %raw, "Ignoring invalid workScenario"),
            }
        }

        if let Some(raw) = params.get("parkingDuration") {
            match raw.parse::<u32>() {
                Ok(minutes) if minutes > 0 => overrides.parking_duration_minutes = Some(minutes),
                _ => warn!(value = %raw, "Ignoring invalid parkingDuration"),
            }
        }

        overrides
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
