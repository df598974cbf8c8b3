//! Flight kernel: authoritative plane state, lift stepping and scene clocks.
//!
//! # Invariants
//! - One `step` is one frame; pacing belongs to the caller.
//! - All phase changes are recorded in the event log.
//! - Stepping is deterministic for a given sequence of pressures.

pub mod airflow;
pub mod config;
pub mod environment;
pub mod flight;
pub mod telemetry;

pub use airflow::{AirflowField, AirflowSide, StreamlineGroup, StreamlineLayout};
pub use config::{CameraConfig, ConfigError, ControlsConfig, ModelConfig, SimConfig, WindowConfig};
pub use environment::{Environment, SceneParams};
pub use flight::{FlightEvent, FlightParams, FlightPhase, FlightSim, Pressures};
pub use telemetry::FlightSummary;
