//! Platform abstraction layer
//!
//! Hardware access for the record store is isolated to this module. The
//! storage engine only sees the [`FlashInterface`] trait.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result};
pub use traits::FlashInterface;
