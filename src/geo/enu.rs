// src/geo/enu.rs
// East/north/up placement frames on the WGS84 ellipsoid
// RELEVANT FILES: src/geo/mod.rs, src/convert/batch.rs

use glam::{DMat4, DVec3};

use crate::error::{TileError, TileResult};

// WGS84 semi-axes squared, meters^2
const ELLIPSOID_A2: f64 = 40_680_631_590_769.0;
const ELLIPSOID_C2: f64 = 40_408_299_984_661.4;

/// Geodetic anchor for a dataset's local frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoAnchor {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub height_m: f64,
}

impl GeoAnchor {
    pub fn new(lon_deg: f64, lat_deg: f64, height_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            height_m,
        }
    }

    pub fn validate(&self) -> TileResult<()> {
        if !(-180.0..=180.0).contains(&self.lon_deg) {
            return Err(TileError::anchor(format!(
                "longitude {} out of range [-180, 180]",
                self.lon_deg
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat_deg) {
            return Err(TileError::anchor(format!(
                "latitude {} out of range [-90, 90]",
                self.lat_deg
            )));
        }
        Ok(())
    }

    /// Placement matrix anchoring the local frame at this anchor
    pub fn placement(&self) -> DMat4 {
        enu_to_ecef(self.lon_deg, self.lat_deg, self.height_m)
    }
}

/// Outward unit normal of the ellipsoid at a geodetic anchor
fn geodetic_normal(lon_deg: f64, lat_deg: f64) -> DVec3 {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    DVec3::new(lon.cos() * lat.cos(), lon.sin() * lat.cos(), lat.sin())
}

/// Convert a geodetic anchor to Cartesian ECEF coordinates.
///
/// The surface point is the spot on the ellipsoid whose geodetic normal
/// matches the anchor; height displaces along that normal.
pub fn geodetic_to_ecef(lon_deg: f64, lat_deg: f64, height_m: f64) -> DVec3 {
    let n = geodetic_normal(lon_deg, lat_deg);
    let scaled = DVec3::new(ELLIPSOID_A2 * n.x, ELLIPSOID_A2 * n.y, ELLIPSOID_C2 * n.z);
    let gamma = n.dot(scaled).sqrt();
    scaled / gamma + n * height_m
}

/// Build the local-tangent-plane to ECEF placement matrix at a geodetic
/// anchor.
///
/// Columns are the east, north and up unit vectors with the ECEF anchor as
/// the translation. Stateless and deterministic to full f64 precision.
pub fn enu_to_ecef(lon_deg: f64, lat_deg: f64, height_m: f64) -> DMat4 {
    let lon = lon_deg.to_radians();
    let up = geodetic_normal(lon_deg, lat_deg);
    let east = DVec3::new(-lon.sin(), lon.cos(), 0.0);
    let north = up.cross(east);
    let origin = geodetic_to_ecef(lon_deg, lat_deg, height_m);
    DMat4::from_cols(
        east.extend(0.0),
        north.extend(0.0),
        up.extend(0.0),
        origin.extend(1.0),
    )
}
