//! Read-only reference data shared by all requests: camera sites with
//! their spot layouts, pre-registered alternative lots, restriction
//! zones, and the historical prediction table.
//!
//! Loaded once at startup from `data/registry.json`; a built-in default
//! registry is used when the file is missing or invalid.

use crate::geo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;

pub type SpotId = u32;

pub const DEFAULT_REGISTRY_PATH: &str = "data/registry.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotLabel {
    Empty,
    Occupied,
}

/// A physical spot as the camera sees it, with the baseline detection
/// the live camera feed reports for it. Baselines keep detection
/// deterministic across identical requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSite {
    pub id: SpotId,
    pub row: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_from_camera_meters: f64,
    pub baseline_label: SpotLabel,
    pub baseline_ml_confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSite {
    pub id: String,
    pub name: String,
    pub lot_name: String,
    pub lat: f64,
    pub lng: f64,
    pub spots: Vec<SpotSite>,
    /// Historical average minutes a spot in the row stays occupied.
    #[serde(default)]
    pub row_turnover_minutes: HashMap<String, f64>,
    /// Sparse crowdsourced reports: spot id -> "no one currently in spot".
    #[serde(default)]
    pub crowd_reports: HashMap<SpotId, bool>,
    #[serde(default)]
    pub zones: Vec<RestrictionZone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeLot {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub estimated_confidence: f64,
    pub estimated_drive_minutes: f64,
    pub total_spots: u32,
    pub typical_open_spots: u32,
}

/// One timed restriction. The same zone list feeds both the legal
/// context entries and the per-spot work classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionZone {
    pub name: String,
    /// Rows the zone covers; absent means the whole lot.
    #[serde(default)]
    pub rows: Option<Vec<String>>,
    pub rule: ZoneRule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ZoneRule {
    /// Street sweeping on one weekday (0 = Monday) between two hours.
    /// An end hour at or before the start hour wraps past midnight.
    Sweeping {
        weekday: u8,
        start_hour: u8,
        end_hour: u8,
    },
    /// Permit-only hours, every day; wraps past midnight the same way.
    Permit { start_hour: u8, end_hour: u8 },
    Metered {
        hourly_rate: f64,
        daily_max: f64,
        time_limit_minutes: u32,
    },
    Free,
}

/// Baseline availability confidence keyed by day class and hour of day.
/// Total: every timestamp maps to a value, so the prediction source
/// never reports "unknown".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionTable {
    pub weekday_hours: Vec<f64>,
    pub weekend_hours: Vec<f64>,
}

impl PredictionTable {
    pub fn baseline(&self, at: OffsetDateTime) -> f64 {
        let hours = match at.weekday() {
            time::Weekday::Saturday | time::Weekday::Sunday => &self.weekend_hours,
            _ => &self.weekday_hours,
        };
        hours
            .get(at.hour() as usize)
            .copied()
            .unwrap_or(0.5)
            .clamp(0.0, 1.0)
    }
}

impl Default for PredictionTable {
    fn default() -> Self {
        // Lots empty out overnight and fill through business hours.
        let weekday_hours = vec![
            0.9, 0.92, 0.93, 0.93, 0.9, 0.85, 0.7, 0.5, 0.35, 0.3, 0.3, 0.35, 0.4, 0.38, 0.36,
            0.38, 0.45, 0.55, 0.65, 0.72, 0.78, 0.82, 0.86, 0.88,
        ];
        let weekend_hours = vec![
            0.92, 0.93, 0.94, 0.94, 0.93, 0.9, 0.85, 0.78, 0.68, 0.58, 0.5, 0.45, 0.42, 0.42,
            0.45, 0.5, 0.55, 0.6, 0.65, 0.7, 0.76, 0.82, 0.87, 0.9,
        ];
        Self {
            weekday_hours,
            weekend_hours,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub cameras: Vec<CameraSite>,
    pub alternatives: Vec<AlternativeLot>,
    #[serde(default)]
    pub prediction: PredictionTable,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Registry, RegistryError> {
    let contents = std::fs::read_to_string(path)?;
    let registry: Registry = serde_json::from_str(&contents)?;
    Ok(registry)
}

impl Registry {
    /// Nearest camera to the given point and its distance in meters.
    pub fn nearest_camera(&self, lat: f64, lng: f64) -> Option<(&CameraSite, f64)> {
        self.cameras
            .iter()
            .map(|camera| {
                (
                    camera,
                    geo::haversine_m(lat, lng, camera.lat, camera.lng),
                )
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
    }

    /// Built-in fallback registry: one monitored lot in Mission Bay with
    /// two registered alternatives.
    pub fn builtin() -> Self {
        let spot = |id: SpotId,
                    row: &str,
                    lat: f64,
                    lng: f64,
                    from_camera: f64,
                    label: SpotLabel,
                    confidence: f64| SpotSite {
            id,
            row: row.to_string(),
            lat,
            lng,
            distance_from_camera_meters: from_camera,
            baseline_label: label,
            baseline_ml_confidence: confidence,
        };

        let camera = CameraSite {
            id: "cam-01".to_string(),
            name: "Mission Bay North".to_string(),
            lot_name: "Mission Bay Lot A".to_string(),
            lat: 37.7689,
            lng: -122.3892,
            spots: vec![
                spot(1, "A", 37.76895, -122.38928, 9.0, SpotLabel::Empty, 0.92),
                spot(2, "A", 37.76898, -122.38936, 16.0, SpotLabel::Occupied, 0.88),
                spot(3, "A", 37.76901, -122.38944, 24.0, SpotLabel::Empty, 0.84),
                spot(4, "A", 37.76904, -122.38952, 31.0, SpotLabel::Occupied, 0.9),
                spot(5, "B", 37.76885, -122.38930, 14.0, SpotLabel::Empty, 0.79),
                spot(6, "B", 37.76882, -122.38938, 21.0, SpotLabel::Occupied, 0.93),
                spot(7, "B", 37.76879, -122.38946, 29.0, SpotLabel::Empty, 0.71),
                spot(8, "B", 37.76876, -122.38954, 37.0, SpotLabel::Empty, 0.66),
            ],
            row_turnover_minutes: HashMap::from([("A".to_string(), 35.0), ("B".to_string(), 55.0)]),
            crowd_reports: HashMap::from([(1, true), (7, false)]),
            zones: vec![
                RestrictionZone {
                    name: "Row A street sweeping".to_string(),
                    rows: Some(vec!["A".to_string()]),
                    rule: ZoneRule::Sweeping {
                        weekday: 1,
                        start_hour: 4,
                        end_hour: 6,
                    },
                },
                RestrictionZone {
                    name: "Metered stalls".to_string(),
                    rows: None,
                    rule: ZoneRule::Metered {
                        hourly_rate: 4.0,
                        daily_max: 28.0,
                        time_limit_minutes: 240,
                    },
                },
                RestrictionZone {
                    name: "Overflow gravel lot".to_string(),
                    rows: None,
                    rule: ZoneRule::Free,
                },
            ],
        };

        let alternatives = vec![
            AlternativeLot {
                id: "alt-01".to_string(),
                name: "4th Street Garage".to_string(),
                lat: 37.7731,
                lng: -122.3917,
                estimated_confidence: 0.72,
                estimated_drive_minutes: 8.0,
                total_spots: 220,
                typical_open_spots: 35,
            },
            AlternativeLot {
                id: "alt-02".to_string(),
                name: "Pier 48 Overflow".to_string(),
                lat: 37.7762,
                lng: -122.3851,
                estimated_confidence: 0.9,
                estimated_drive_minutes: 22.0,
                total_spots: 60,
                typical_open_spots: 28,
            },
        ];

        Self {
            cameras: vec![camera],
            alternatives,
            prediction: PredictionTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::{Date, Month, PrimitiveDateTime, Time};

    fn at(year: i32, month: Month, day: u8, hour: u8) -> OffsetDateTime {
        let date = Date::from_calendar_date(year, month, day).expect("valid date");
        let time = Time::from_hms(hour, 0, 0).expect("valid time");
        PrimitiveDateTime::new(date, time).assume_utc()
    }

    #[test]
    fn builtin_registry_has_camera_and_alternatives() {
        let registry = Registry::builtin();

        assert_eq!(registry.cameras.len(), 1);
        assert_eq!(registry.alternatives.len(), 2);
        assert!(!registry.cameras[0].spots.is_empty());
        assert!(!registry.cameras[0].zones.is_empty());
    }

    #[test]
    fn nearest_camera_returns_closest() {
        let registry = Registry::builtin();

        let (camera, distance) = registry
            .nearest_camera(37.7689, -122.3892)
            .expect("camera found");

        assert_eq!(camera.id, "cam-01");
        assert!(distance < 1.0, "got {distance}");
    }

    #[test]
    fn nearest_camera_on_empty_registry_is_none() {
        let registry = Registry {
            cameras: Vec::new(),
            alternatives: Vec::new(),
            prediction: PredictionTable::default(),
        };

        assert!(registry.nearest_camera(0.0, 0.0).is_none());
    }

    #[test]
    fn prediction_table_covers_weekday_and_weekend() {
        let table = PredictionTable::default();
        // 2026-03-02 is a Monday, 2026-03-07 a Saturday.
        let monday_morning = table.baseline(at(2026, Month::March, 2, 9));
        let saturday_morning = table.baseline(at(2026, Month::March, 7, 9));

        assert!((0.0..=1.0).contains(&monday_morning));
        assert!((0.0..=1.0).contains(&saturday_morning));
        assert!(saturday_morning > monday_morning);
    }

    #[test]
    fn prediction_table_short_rows_fall_back() {
        let table = PredictionTable {
            weekday_hours: vec![0.4],
            weekend_hours: Vec::new(),
        };

        assert_eq!(table.baseline(at(2026, Month::March, 2, 12)), 0.5);
        assert_eq!(table.baseline(at(2026, Month::March, 7, 0)), 0.5);
    }

    #[test]
    fn missing_registry_file_returns_read_error() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("spotsense-registry-missing-{unique}.json"));

        let result = load_from_path(&path);

        assert!(matches!(result, Err(RegistryError::Read(_))));
    }

    #[test]
    fn invalid_json_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("spotsense-registry-invalid-{unique}.json"));
        fs::write(&path, "{not json")?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(RegistryError::Parse(_))));
        Ok(())
    }

    #[test]
    fn registry_parses_zone_rules() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"{
            "cameras": [{
                "id": "cam-x",
                "name": "Test",
                "lotName": "Test Lot",
                "lat": 1.0,
                "lng": 2.0,
                "spots": [],
                "zones": [
                    {"name": "sweep", "rows": ["A"],
                     "rule": {"kind": "sweeping", "weekday": 1, "startHour": 4, "endHour": 6}},
                    {"name": "meter",
                     "rule": {"kind": "metered", "hourlyRate": 4.0, "dailyMax": 28.0,
                              "timeLimitMinutes": 120}},
                    {"name": "free", "rule": {"kind": "free"}}
                ]
            }],
            "alternatives": []
        }"#;

        let registry: Registry = serde_json::from_str(json)?;

        let zones = &registry.cameras[0].zones;
        assert_eq!(zones.len(), 3);
        assert!(matches!(zones[0].rule, ZoneRule::Sweeping { weekday: 1, .. }));
        assert!(matches!(zones[1].rule, ZoneRule::Metered { .. }));
        assert!(matches!(zones[2].rule, ZoneRule::Free));
        Ok(())
    }
}
