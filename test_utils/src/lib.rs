//! Utility helpers for tests.
pub mod app;
pub mod builders;

pub use app::{sim_app, step, ThreadSafeMatch};
pub use builders::{ball_at, body, item, orbiting_item, sword_spec};
