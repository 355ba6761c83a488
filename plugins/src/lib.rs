//! Concrete plugin implementations for cadence: process and no-op executors,
//! tracing-backed hooks, and the built-in wave-planning strategies.

pub mod executor;
pub mod factory;
pub mod hooks;
pub mod strategies;
