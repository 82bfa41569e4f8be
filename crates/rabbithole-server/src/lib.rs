//! # rabbithole-server
//!
//! HTTP surface for the rabbithole service: sentence read/update,
//! projection read, regenerate, reset, liveness, and Prometheus metrics,
//! plus the background worker that embeds each accepted sentence and
//! re-projects the trajectory.

pub mod api;
pub mod auth;
pub mod config;
pub mod metrics;
pub mod orchestrator;
