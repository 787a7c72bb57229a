//! Shared plumbing for Postbox services: environment config, tracing setup,
//! health checks and the HTTP middleware stack.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
