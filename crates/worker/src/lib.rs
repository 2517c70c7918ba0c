//! Polling agents that evaluate single operations for the orchestrator.
//!
//! Each agent repeatedly asks `GET /internal/task` for work, waits the
//! simulated operation time, computes the result and reports it back via
//! `POST /internal/task/result`.

pub mod client;
pub mod compute;
pub mod config;
pub mod runner;
