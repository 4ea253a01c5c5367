// src/geo/mod.rs
// Geodetic placement utilities
// RELEVANT FILES: src/geo/enu.rs, src/convert/compose.rs

pub mod enu;

pub use enu::{enu_to_ecef, geodetic_to_ecef, GeoAnchor};
