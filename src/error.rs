use thiserror::Error;

/// Request-level failures surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no camera within {0:.0} m of the requested location")]
    NoCameraInRange(f64),
    #[error("all signal sources unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Failure of a single live signal source. Recovered by dropping the
/// source from the fusion weights; only surfaced when every source in
/// the chain fails.
#[derive(Debug, Clone, Error)]
pub enum SignalError {
    #[error("signal source unreachable: {0}")]
    Unreachable(String),
    #[error("signal source timed out after {0} ms")]
    Timeout(u128),
}
