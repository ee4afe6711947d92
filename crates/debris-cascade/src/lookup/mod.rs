//! Shared read-mostly lookups: material strength and radiation pressure.
//!
//! Worker threads stepping different cells share one [`LookupService`].
//! Its caches are bounded and synchronized; a cache miss only costs time,
//! never correctness. Counters of clamped table inputs are atomic so that
//! every clamped call is counted exactly once.

mod cache;
mod clamp;
mod radiation;
mod service;


pub use cache::{BoundedCache, CacheStats};
pub use clamp::{ClampKind, ClampSnapshot, ClampStats};
pub use radiation::{radiation_beta, QprTable, RadiationInputs, SOLAR_LUMINOSITY_W, SPEED_OF_LIGHT};
pub use service::{LookupService, DEFAULT_CACHE_CAPACITY};
