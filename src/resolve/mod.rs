//! Target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, headers)
//!     → path.rs (split into segments, capture query verbatim)
//!     → strategy.rs (ordered tiers: path segment → Referer → session cookie)
//!     → ResolvedTarget (host, resource path, primary flag)
//!     → target.rs (absolute origin URL)
//! ```
//!
//! # Design Decisions
//! - Tiers are pure functions over the request context, tried in order
//! - First tier to produce a host wins; all-miss is a client error
//! - Malformed Referer/Cookie values count as absent, never as errors
//! - Deterministic: same request always resolves to the same target

pub mod cookie;
pub mod path;
pub mod strategy;
pub mod target;

pub use path::RequestPath;
pub use strategy::{RequestContext, ResolveError, ResolvedTarget, Resolution, ResolverChain};
pub use target::build_target_url;
