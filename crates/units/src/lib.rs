//! SI physical quantities for collisional debris-disk models.
//!
//! Every quantity is a `Copy` newtype over `f64` stored in SI base units.
//! Engine code takes these at its public boundary and works on raw `f64`
//! slices internally via the `to_*` accessors.

pub mod angular_velocity;
pub mod density;
pub mod length;
pub mod mass_rate;
pub mod surface_density;
pub mod time;
pub mod velocity;

#[cfg(test)]
mod surface_density_test;

pub use angular_velocity::AngularVelocity;
pub use density::Density;
pub use length::{Length, MARS_RADIUS_M};
pub use mass_rate::{MassRate, MARS_MASS_KG};
pub use surface_density::{SurfaceDensity, SurfaceDensityRate};
pub use time::{Time, SECONDS_PER_YEAR};
pub use velocity::{circular_orbital_velocity, Velocity, G};
