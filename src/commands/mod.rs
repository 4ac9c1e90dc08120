//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `release.rs` — release-prepare/verify/diff (gate-driving commands).
//! - `admin.rs` — show-baseline/baselines/snapshot/sync-status.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod admin;
pub mod release;

pub use admin::handle_admin_commands;
pub use release::handle_release_commands;
