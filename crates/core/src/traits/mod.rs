//! Core traits for platform-agnostic store functionality.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Platform implementations live with the platform code

pub mod time;

pub use time::{MockClock, TimeSource, WallClock};
