//! HTTP REST control plane.
//!
//! - `common`: response envelope, validated-JSON extractor, error mapping
//! - `modules`: one handler module per resource
//! - `state`: the unified `AppState` and its `FromRef` projections
//! - `router`: route wiring, auth layers, CORS, rate limiting

pub mod common;
pub mod modules;
pub mod router;
pub mod state;

pub use router::build_router;
