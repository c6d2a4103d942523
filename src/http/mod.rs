//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, proxy pipeline)
//!     → request.rs (request ID, outbound header construction)
//!     → [resolve layer picks the origin host]
//!     → [upstream client forwards the request]
//!     → response.rs (sanitize headers, CORS, session cookie)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
