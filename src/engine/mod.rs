//! The scoring pipeline: competition simulation, confidence fusion,
//! ranking, reroute decision, and timed-restriction evaluation.

pub mod confidence;
pub mod legal;
pub mod occupancy;
pub mod ranker;
pub mod reroute;
