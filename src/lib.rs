pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod overrides;
pub mod registry;
pub mod service;
pub mod signal;
