//! Source dataset metadata
//!
//! Capture pipelines drop a `metadata.xml` next to the block directories
//! carrying the spatial reference of the local frame. Only ENU anchors are
//! understood here; EPSG references need a reprojection toolchain this crate
//! does not carry, so they are reported rather than silently ignored.

use std::path::Path;

use serde::Deserialize;

use crate::error::{TileError, TileResult};
use crate::geo::GeoAnchor;

#[derive(Debug, Deserialize)]
struct ModelMetadata {
    #[serde(rename = "SRS")]
    srs: String,
    #[serde(rename = "SRSOrigin", default)]
    _srs_origin: Option<String>,
}

/// Read the geodetic anchor from `<source_root>/metadata.xml` if present.
///
/// Returns `Ok(None)` when the file does not exist; a file that exists but
/// cannot be understood is an error.
pub fn read_anchor(source_root: &Path) -> TileResult<Option<GeoAnchor>> {
    let path = source_root.join("metadata.xml");
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    let meta: ModelMetadata = serde_xml_rs::from_str(&text)
        .map_err(|e| TileError::anchor(format!("{}: {}", path.display(), e)))?;
    parse_srs(&meta.srs).map(Some)
}

/// ENU SRS entries are `ENU:lat,lon`
fn parse_srs(srs: &str) -> TileResult<GeoAnchor> {
    let mut parts = srs.splitn(2, ':');
    match (parts.next(), parts.next()) {
        (Some("ENU"), Some(origin)) => {
            let nums: Vec<&str> = origin.split(',').collect();
            if nums.len() < 2 {
                return Err(TileError::anchor(format!(
                    "ENU anchor needs lat,lon but got '{origin}'"
                )));
            }
            let lat: f64 = nums[0]
                .trim()
                .parse()
                .map_err(|_| TileError::anchor(format!("bad ENU latitude '{}'", nums[0])))?;
            let lon: f64 = nums[1]
                .trim()
                .parse()
                .map_err(|_| TileError::anchor(format!("bad ENU longitude '{}'", nums[1])))?;
            let anchor = GeoAnchor::new(lon, lat, 0.0);
            anchor.validate()?;
            Ok(anchor)
        }
        (Some("EPSG"), Some(code)) => Err(TileError::anchor(format!(
            "EPSG:{code} anchors are not supported, supply --lon/--lat directly"
        ))),
        _ => Err(TileError::anchor(format!("unrecognized SRS '{srs}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enu_srs_parses_lat_then_lon() {
        let anchor = parse_srs("ENU:30.5,120.25").unwrap();
        assert_eq!(anchor.lat_deg, 30.5);
        assert_eq!(anchor.lon_deg, 120.25);
        assert_eq!(anchor.height_m, 0.0);
    }

    #[test]
    fn epsg_srs_is_rejected_with_guidance() {
        let err = parse_srs("EPSG:32650").unwrap_err();
        assert!(err.to_string().contains("EPSG:32650"));
    }

    #[test]
    fn garbage_srs_is_rejected() {
        assert!(parse_srs("WGS84").is_err());
        assert!(parse_srs("ENU:only-one").is_err());
        assert!(parse_srs("ENU:91.0,10.0").is_err());
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_anchor(dir.path()).unwrap(), None);
    }

    #[test]
    fn metadata_file_supplies_the_anchor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("metadata.xml"),
            r#"<?xml version="1.0" encoding="utf-8"?>
<ModelMetadata version="1">
    <SRS>ENU:39.91,116.39</SRS>
    <SRSOrigin>0,0,0</SRSOrigin>
</ModelMetadata>"#,
        )
        .unwrap();
        let anchor = read_anchor(dir.path()).unwrap().unwrap();
        assert_eq!(anchor.lon_deg, 116.39);
        assert_eq!(anchor.lat_deg, 39.91);
    }
}
