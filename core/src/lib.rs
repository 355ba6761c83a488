//! Core of the cadence orchestration engine.
//!
//! Two execution surfaces share one plugin seam:
//! - [`orchestrator::DagOrchestrator`] runs configured agent units over a
//!   dependency graph (sequential, parallel, or dag mode) with per-unit
//!   timeouts and condition gating.
//! - [`wave::WaveOrchestrator`] runs a strategy-planned [`wave::WavePlan`]
//!   wave by wave, threading an accumulated [`wave::WaveContext`] through.
//!
//! Executors, hooks, breakpoints, and planning strategies are injected via
//! the traits in [`traits`]; concrete implementations live in the
//! `cadence-plugins` crate.

pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod runner;
pub mod traits;
pub mod wave;
