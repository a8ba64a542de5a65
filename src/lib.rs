#![cfg_attr(not(test), no_std)]

//! sprinkler_store - Flash record store for an ESP8266 irrigation controller
//!
//! This library provides the platform abstraction and the wear-leveled
//! record store that persists the controller settings and event log.

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

// Logging macros (defmt on target, stdout in tests)
pub mod logging;

// Platform abstraction layer (flash access, mocks)
pub mod platform;

// Record store engine
pub mod storage;
