//! Domain models for Automara.
//!
//! These are the core types shared across all crates.

pub mod activity;
pub mod credential;
pub mod tenant;
pub mod workflow;
