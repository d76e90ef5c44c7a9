use std::fmt;

use crate::error::{RegressError, Result};

// ---------------------------------------------------------------------------
// RegionSpec – a named lat/lon box
// ---------------------------------------------------------------------------

/// Geographic bounding box in degrees. Longitudes run 0..360 east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSpec {
    pub name: &'static str,
    pub lat_ll: f64,
    pub lat_ul: f64,
    pub lon_ll: f64,
    pub lon_ul: f64,
}

impl RegionSpec {
    const fn new(name: &'static str, lat_ll: f64, lat_ul: f64, lon_ll: f64, lon_ul: f64) -> Self {
        RegionSpec {
            name,
            lat_ll,
            lat_ul,
            lon_ll,
            lon_ul,
        }
    }

    /// `(south, north, west, east)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.lat_ll, self.lat_ul, self.lon_ll, self.lon_ul)
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.lat_ll && lat <= self.lat_ul
    }

    /// Longitude test after wrapping `lon` into 0..360.
    pub fn contains_lon(&self, lon: f64) -> bool {
        let lon = lon.rem_euclid(360.0);
        lon >= self.lon_ll && lon <= self.lon_ul
    }
}

impl fmt::Display for RegionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}..{}N, {}..{}E]",
            self.name, self.lat_ll, self.lat_ul, self.lon_ll, self.lon_ul
        )
    }
}

// ---------------------------------------------------------------------------
// Region table
// ---------------------------------------------------------------------------

pub const REGIONS: [RegionSpec; 15] = [
    RegionSpec::new("global", -90.0, 90.0, 0.0, 360.0),
    RegionSpec::new("NH", 0.0, 90.0, 0.0, 360.0),
    RegionSpec::new("SH", -90.0, 0.0, 0.0, 360.0),
    RegionSpec::new("SH_high_lats", -90.0, -50.0, 0.0, 360.0),
    RegionSpec::new("SH_mid_lats", -50.0, -20.0, 0.0, 360.0),
    RegionSpec::new("tropics", -20.0, 20.0, 0.0, 360.0),
    RegionSpec::new("NH_mid_lats", 20.0, 50.0, 0.0, 360.0),
    RegionSpec::new("NH_high_lats", 50.0, 90.0, 0.0, 360.0),
    RegionSpec::new("Nino3", -5.0, 5.0, 210.0, 270.0),
    RegionSpec::new("Nino3.4", -5.0, 5.0, 190.0, 240.0),
    RegionSpec::new("Nino4", -5.0, 5.0, 160.0, 210.0),
    RegionSpec::new("Tropical_Pacific", -5.0, 5.0, 160.0, 270.0),
    RegionSpec::new("Greater_Tropical_Pacific", -30.0, 30.0, 120.0, 290.0),
    RegionSpec::new("EPAC", -5.0, 5.0, 230.0, 280.0),
    RegionSpec::new("INDO", -5.0, 5.0, 90.0, 140.0),
];

/// Look up a region by its exact name.
pub fn region(name: &str) -> Result<RegionSpec> {
    REGIONS
        .iter()
        .find(|r| r.name == name)
        .copied()
        .ok_or_else(|| RegressError::UnknownRegion(name.to_string()))
}

/// Bounds of the named region as `(lat_ll, lat_ul, lon_ll, lon_ul)`.
pub fn get_reg_box(name: &str) -> Result<(f64, f64, f64, f64)> {
    region(name).map(|r| r.bounds())
}
