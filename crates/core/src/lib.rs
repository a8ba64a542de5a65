//! sprinkler_core - Pure no_std logic for the sprinkler record store
//!
//! This crate contains the platform-agnostic parts of the flash record
//! store: the on-flash formats, the address-space layout and the policies
//! that decide when a record may be written. Everything here can be tested
//! on host without any feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Platform services injected via traits
//!
//! # Modules
//!
//! - [`checksum`]: Rolling subtraction checksum
//! - [`config`]: Store constants and runtime configuration
//! - [`layout`]: Flash area layout from the hardware capacity identifier
//! - [`rate`]: Write-rate budget
//! - [`record`]: Record, zone and log entry formats
//! - [`scheduler`]: Deferred-task queue
//! - [`traits`]: Time abstractions (TimeSource, WallClock)

#![no_std]

pub mod checksum;
pub mod config;
pub mod layout;
pub mod rate;
pub mod record;
pub mod scheduler;
pub mod traits;
