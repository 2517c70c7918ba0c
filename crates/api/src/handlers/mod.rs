//! HTTP handlers, grouped by audience.
//!
//! `expressions` serves clients submitting and polling expressions;
//! `tasks` serves workers claiming operations and reporting results.

pub mod expressions;
pub mod tasks;
