//! Simulation core of a vertically scrolling arcade shooter.
//!
//! Rendering, physics integration, contact detection and input polling are
//! the host's job; this crate owns the pooled entities and every rule that
//! decides what a frame does to them.

pub mod collision;
pub mod combat;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod follower;
pub mod pool;
pub mod spawn;
pub mod timers;
