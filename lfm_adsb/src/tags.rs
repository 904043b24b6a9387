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

///! classification tags for aircraft features, used for client side filtering.
///! Tags have the form `<key>:<value>`

use geojson::{JsonObject, JsonValue};
use crate::feature::*;

pub const LOW_ALTITUDE: f64 = 10_000.0;
pub const MEDIUM_ALTITUDE: f64 = 30_000.0;
pub const SLOW_SPEED: f64 = 200.0;
pub const MEDIUM_SPEED: f64 = 500.0;

/// altitude value that marks aircraft on the ground
pub const GROUND: &str = "ground";

/// emitter category names indexed by the numeric (OpenSky) category code
pub const CATEGORY_NAMES: [&str; 21] = [
    "no-information", // 0: no information at all
    "no-information", // 1: no ADS-B emitter category information
    "light",
    "small",
    "large",
    "high-vortex-large",
    "heavy",
    "high-performance",
    "rotorcraft",
    "glider",
    "lighter-than-air",
    "parachutist",
    "ultralight",
    "reserved",
    "uav",
    "space-vehicle",
    "surface-emergency-vehicle",
    "surface-service-vehicle",
    "point-obstacle",
    "cluster-obstacle",
    "line-obstacle",
];

pub const POSITION_SOURCE_NAMES: [&str; 4] = [ "adsb", "asterix", "mlat", "flarm" ];

fn tag (key: &str, value: impl AsRef<str>) -> String {
    format!("{key}:{}", value.as_ref())
}

fn verbatim (v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.trim().to_string(),
        other => other.to_string()
    }
}

/// numeric value of a number or a numeric string
fn as_number (v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None
    }
}

pub fn altitude_class (v: &JsonValue) -> &'static str {
    if v.as_str().is_some_and( |s| s.trim().eq_ignore_ascii_case( GROUND)) {
        return "low"
    }
    match as_number(v) {
        Some(alt) if alt < LOW_ALTITUDE => "low",
        Some(alt) if alt < MEDIUM_ALTITUDE => "medium",
        Some(_) => "high",
        None => "unknown"
    }
}

pub fn speed_class (v: &JsonValue) -> &'static str {
    match as_number(v) {
        Some(spd) if spd < SLOW_SPEED => "slow",
        Some(spd) if spd < MEDIUM_SPEED => "medium",
        Some(_) => "fast",
        None => "unknown"
    }
}

/// map ADS-B emitter category strings such as "A3" onto the numeric category codes
fn emitter_category_code (s: &str) -> Option<usize> {
    let mut chars = s.chars();
    let set = chars.next()?.to_ascii_uppercase();
    let n = chars.as_str().parse::<usize>().ok()?;

    match (set, n) {
        ('A'|'B'|'C', 0) => Some(0),
        ('A', 1..=7) => Some(n + 1), // light .. rotorcraft
        ('B', 1..=4) => Some(n + 8), // glider .. ultralight
        ('B', 5) => Some(13),        // reserved
        ('B', 6..=7) => Some(n + 8), // uav, space vehicle
        ('C', 1..=5) => Some(n + 15), // surface emergency vehicle .. line obstacle
        _ => None
    }
}

pub fn category_name (v: &JsonValue) -> Option<&'static str> {
    let code = match v {
        JsonValue::Number(n) => n.as_u64().map( |c| c as usize),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<usize>().ok().or_else( || emitter_category_code(s))
        }
        _ => None
    }?;
    CATEGORY_NAMES.get( code).copied()
}

pub fn position_source_name (v: &JsonValue) -> Option<&'static str> {
    let code = as_number(v)?;
    if code >= 0.0 && code.fract() == 0.0 {
        POSITION_SOURCE_NAMES.get( code as usize).copied()
    } else {
        None
    }
}

/// compute the tags for the given feature properties
pub fn derive_tags (props: &JsonObject) -> Vec<String> {
    let mut tags = Vec::with_capacity(8);

    let icao24 = present_property( props, ICAO24).map( verbatim).unwrap_or_else( || "unknown".to_string());
    tags.push( tag( "icao24", icao24));

    for key in [TYPE, CALLSIGN, REGISTRATION, EMERGENCY] {
        if let Some(v) = present_property( props, key) {
            tags.push( tag( key, verbatim(v)));
        }
    }

    let altitude = [BARO_ALTITUDE, GEOM_ALTITUDE, GEO_ALTITUDE].into_iter().find_map( |k| present_property( props, k));
    if let Some(alt) = altitude {
        tags.push( tag( "altitude", altitude_class( alt)));
    }

    let speed = [GROUND_SPEED, VELOCITY].into_iter().find_map( |k| present_property( props, k));
    if let Some(spd) = speed {
        tags.push( tag( "speed", speed_class( spd)));
    }

    if let Some(name) = present_property( props, CATEGORY).and_then( category_name) {
        tags.push( tag( "category", name));
    }

    if let Some(name) = present_property( props, POSITION_SOURCE).and_then( position_source_name) {
        tags.push( tag( "position_source", name));
    }

    tags
}
