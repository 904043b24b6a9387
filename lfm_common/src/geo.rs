/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

///! geodetic value types for map areas: `Location` and `BoundingBox`
///! radii are nautical miles (1nm == 1 arc minute of latitude)

use std::fmt;
use serde::{Serialize,Deserialize};
use uom::si::{f64::Length, length::nautical_mile};

use crate::{define_error, sin, cos, atan2, deg, rad};

define_error!{ pub GeoError =
    InvalidLatitude(f64) : "latitude {0} not within [-90,90]",
    InvalidLongitude(f64) : "longitude {0} not within [-180,180]",
    InvalidRadius(f64) : "invalid radius {0}nm",
    PoleProximity(f64) : "latitude {0} too close to pole to compute radius",
    InvalidBounds(String) : "invalid bounding box: {0}"
}

pub type Result<T> = std::result::Result<T, GeoError>;

/// latitudes beyond this make the longitude span of a radius degenerate
pub const MAX_RADIUS_LATITUDE: f64 = 89.9;

/// arc minutes per degree, which is nautical miles per degree of latitude
const NM_PER_DEG: f64 = 60.0;

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

#[inline]
pub fn nautical_miles (nm: f64) -> Length { Length::new::<nautical_mile>(nm) }

/* #region Location ******************************************************************/

/// immutable geodetic position in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Location {
    #[serde(alias="lat")]
    pub latitude: f64,
    #[serde(alias="lon")]
    pub longitude: f64,
}

impl Location {
    pub fn new (latitude: f64, longitude: f64) -> Result<Self> {
        let loc = Location { latitude, longitude };
        loc.validate()?;
        Ok(loc)
    }

    pub fn validate (&self) -> Result<()> {
        if !(-90.0..=90.0).contains( &self.latitude) { return Err( GeoError::InvalidLatitude(self.latitude)) }
        if !(-180.0..=180.0).contains( &self.longitude) { return Err( GeoError::InvalidLongitude(self.longitude)) }
        Ok(())
    }

    /// initial great circle bearing from self to `other` in degrees [0,360), 0 is north
    pub fn bearing_to (&self, other: &Location) -> f64 {
        let φ1 = rad(self.latitude);
        let φ2 = rad(other.latitude);
        let Δλ = rad(other.longitude - self.longitude);

        let y = sin(Δλ) * cos(φ2);
        let x = cos(φ1) * sin(φ2) - sin(φ1) * cos(φ2) * cos(Δλ);

        normalize_360( deg( atan2(y, x)))
    }
}

impl fmt::Display for Location {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6},{:.6})", self.latitude, self.longitude)
    }
}

/* #endregion Location */

/* #region BoundingBox ***************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new (min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self> {
        let bbox = BoundingBox { min_lat, max_lat, min_lon, max_lon };
        bbox.validate()?;
        Ok(bbox)
    }

    /// equirectangular approximation of the box around `center` that contains a circle of `radius`.
    /// The longitude span grows with 1/cos(lat) and is capped at 180deg, all bounds are clamped to
    /// valid coordinate ranges
    pub fn from_center_and_radius (center: &Location, radius: Length) -> Result<Self> {
        let r = radius.get::<nautical_mile>();
        if !r.is_finite() || r <= 0.0 { return Err( GeoError::InvalidRadius(r)) }
        center.validate()?;
        if center.latitude.abs() > MAX_RADIUS_LATITUDE { return Err( GeoError::PoleProximity(center.latitude)) }

        let d_lat = r / NM_PER_DEG;
        let d_lon = (r / NM_PER_DEG / cos( rad(center.latitude))).min(180.0);

        Ok( BoundingBox {
            min_lat: (center.latitude - d_lat).max(-90.0),
            max_lat: (center.latitude + d_lat).min(90.0),
            min_lon: (center.longitude - d_lon).max(-180.0),
            max_lon: (center.longitude + d_lon).min(180.0),
        })
    }

    /// center of the box and the larger of its half height/half width spans
    pub fn to_center_and_radius (&self) -> (Location, Length) {
        let center = self.center();
        let r_lat = (self.max_lat - self.min_lat) / 2.0 * NM_PER_DEG;
        let r_lon = (self.max_lon - self.min_lon) / 2.0 * NM_PER_DEG * cos( rad(center.latitude));

        (center, nautical_miles( r_lat.max(r_lon)))
    }

    pub fn center (&self) -> Location {
        Location {
            latitude: (self.min_lat + self.max_lat) / 2.0,
            longitude: (self.min_lon + self.max_lon) / 2.0,
        }
    }

    pub fn validate (&self) -> Result<()> {
        for lat in [self.min_lat, self.max_lat] {
            if !(-90.0..=90.0).contains( &lat) { return Err( GeoError::InvalidLatitude(lat)) }
        }
        for lon in [self.min_lon, self.max_lon] {
            if !(-180.0..=180.0).contains( &lon) { return Err( GeoError::InvalidLongitude(lon)) }
        }
        if self.min_lat >= self.max_lat {
            return Err( GeoError::InvalidBounds( format!("min_lat {} >= max_lat {}", self.min_lat, self.max_lat)))
        }
        if self.min_lon >= self.max_lon {
            return Err( GeoError::InvalidBounds( format!("min_lon {} >= max_lon {}", self.min_lon, self.max_lon)))
        }
        Ok(())
    }

    pub fn contains (&self, loc: &Location) -> bool {
        loc.latitude >= self.min_lat && loc.latitude <= self.max_lat
            && loc.longitude >= self.min_lon && loc.longitude <= self.max_lon
    }

    #[inline] pub fn north (&self) -> f64 { self.max_lat }
    #[inline] pub fn south (&self) -> f64 { self.min_lat }
    #[inline] pub fn east (&self) -> f64 { self.max_lon }
    #[inline] pub fn west (&self) -> f64 { self.min_lon }
}

impl fmt::Display for BoundingBox {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4},{:.4}]x[{:.4},{:.4}]", self.min_lat, self.max_lat, self.min_lon, self.max_lon)
    }
}

/* #endregion BoundingBox */
