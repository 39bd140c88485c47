//! Simulated competing drivers and the virtual queue they form over
//! the lot's empty spots.

use crate::registry::SpotId;
use std::collections::HashMap;

pub const QUEUE_PENALTY_STEP: f64 = 0.12;
pub const QUEUE_PENALTY_CAP: f64 = 0.5;
pub const DISTANCE_PENALTY_CAP: f64 = 0.3;
pub const DISTANCE_PENALTY_SCALE_M: f64 = 1000.0;

/// Camera confidence at or above this counts as a "high-confidence"
/// detection when simulated drivers pick their targets.
pub const HIGH_CONFIDENCE_ML: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrafficLevel {
    Light,
    #[default]
    Moderate,
    Heavy,
}

impl TrafficLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "moderate" => Some(Self::Moderate),
            "heavy" => Some(Self::Heavy),
            _ => None,
        }
    }
}

/// An empty spot as the simulator sees it.
#[derive(Debug, Clone)]
pub struct CandidateSpot {
    pub id: SpotId,
    pub distance_meters: f64,
    pub high_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAssignment {
    pub simulated_users: u32,
    /// Spots with no entry have an empty queue.
    pub queue_positions: HashMap<SpotId, u32>,
}

impl QueueAssignment {
    pub fn position(&self, id: SpotId) -> u32 {
        self.queue_positions.get(&id).copied().unwrap_or(0)
    }
}

/// Strategy seam for the competing-driver model. The simulated
/// implementation stands in until live multi-user contention data
/// exists.
pub trait CompetitionModel: Send + Sync + std::fmt::Debug {
    fn simulate(&self, traffic: TrafficLevel, candidates: &[CandidateSpot]) -> QueueAssignment;
}

#[derive(Debug, Default)]
pub struct SimulatedCompetition;

impl SimulatedCompetition {
    fn driver_count(traffic: TrafficLevel) -> u32 {
        match traffic {
            TrafficLevel::Light => 1,
            TrafficLevel::Moderate => 3,
            TrafficLevel::Heavy => 6,
        }
    }
}

impl CompetitionModel for SimulatedCompetition {
    /// Drivers target spots in attractiveness order (high-confidence
    /// first, then nearest, then lowest id) and wrap around when there
    /// are more drivers than spots. A spot's queue position is the
    /// number of drivers targeting it. No randomness: identical inputs
    /// always produce the identical assignment.
    fn simulate(&self, traffic: TrafficLevel, candidates: &[CandidateSpot]) -> QueueAssignment {
        let simulated_users = Self::driver_count(traffic);
        let mut ranked: Vec<&CandidateSpot> = candidates.iter().collect();
        ranked.sort_by(|a, b| {
            b.high_confidence
                .cmp(&a.high_confidence)
                .then(a.distance_meters.total_cmp(&b.distance_meters))
                .then(a.id.cmp(&b.id))
        });

        let mut queue_positions = HashMap::new();
        if !ranked.is_empty() {
            for driver in 0..simulated_users {
                let target = ranked[(driver as usize) % ranked.len()];
                *queue_positions.entry(target.id).or_insert(0) += 1;
            }
        }

        QueueAssignment {
            simulated_users,
            queue_positions,
        }
    }
}

pub fn queue_penalty(queue_position: u32) -> f64 {
    (f64::from(queue_position) * QUEUE_PENALTY_STEP).min(QUEUE_PENALTY_CAP)
}

pub fn distance_penalty(distance_meters: f64) -> f64 {
    (distance_meters.max(0.0) / DISTANCE_PENALTY_SCALE_M).min(DISTANCE_PENALTY_CAP)
}
