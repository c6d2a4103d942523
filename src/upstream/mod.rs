//! Outbound (origin-facing) subsystem.
//!
//! # Design Decisions
//! - One shared client with connection pooling; per-request state stays local
//! - Redirect policy and timeouts are fixed at construction from config
//! - Transport failures map to gateway errors; origin statuses pass through

pub mod client;

pub use client::{Dispatcher, UpstreamError};
