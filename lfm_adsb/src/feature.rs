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

///! GeoJSON helpers for aircraft features. Each aircraft is a `geojson::Feature` with a Point geometry
///! (or none if it cannot be located) and a flat property map that gets extended by enrichment

use std::cmp::Ordering;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoValue, feature::Id};
use serde::Serialize;

use lfm_common::{geo::Location, non_empty};
use crate::errors::{Result, op_failed};

pub type AircraftFeature = Feature;

// property names shared by all providers
pub const ICAO24: &str = "icao24_code";
pub const CALLSIGN: &str = "callsign";
pub const REGISTRATION: &str = "registration";
pub const TYPE: &str = "type";
pub const EMERGENCY: &str = "emergency_status";
pub const BARO_ALTITUDE: &str = "baro_altitude";
pub const GEOM_ALTITUDE: &str = "geom_altitude";
pub const GEO_ALTITUDE: &str = "geo_altitude";
pub const GROUND_SPEED: &str = "ground_speed";
pub const VELOCITY: &str = "velocity";
pub const CATEGORY: &str = "category";
pub const POSITION_SOURCE: &str = "position_source";
pub const TAGS: &str = "tags";
pub const ENRICHMENT_INCOMPLETE: &str = "enrichment_incomplete";

pub const ORIGIN_PREFIX: &str = "origin_";
pub const DESTINATION_PREFIX: &str = "destination_";

/// create an aircraft feature. The feature id is the ICAO24 address so that clients can reconcile snapshots
pub fn aircraft_feature (icao24: &str, lon_lat: Option<(f64,f64)>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: lon_lat.map( |(lon,lat)| Geometry::new( GeoValue::Point( vec![lon,lat]))),
        id: non_empty( icao24).map( |id| Id::String( id.to_lowercase())),
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn feature_collection (features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection { bbox: None, features, foreign_members: None }
}

pub fn empty_feature_collection () -> FeatureCollection {
    feature_collection( Vec::new())
}

/// serialize a record into a JSON object, which for our response types yields the feature property names
pub fn to_properties<T: Serialize> (record: &T) -> Result<JsonObject> {
    match serde_json::to_value( record)? {
        JsonValue::Object(map) => Ok(map),
        other => Err( op_failed( format!("record does not serialize into an object: {other}")))
    }
}

/// the Point location of a feature, if any
pub fn feature_location (feature: &Feature) -> Option<Location> {
    match feature.geometry.as_ref().map( |g| &g.value) {
        Some(GeoValue::Point(pos)) if pos.len() >= 2 => Some( Location { latitude: pos[1], longitude: pos[0] }),
        _ => None
    }
}

/// the property value for `key` if it is neither null nor a blank string
pub fn present_property<'a> (props: &'a JsonObject, key: &str) -> Option<&'a JsonValue> {
    match props.get( key) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v)
    }
}

/// trimmed string property
pub fn str_property<'a> (feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature.properties.as_ref()
        .and_then( |props| props.get( key))
        .and_then( |v| v.as_str())
        .and_then( non_empty)
}

/// merge all non-null fields of `record` into the feature properties, with names prefixed by `prefix`.
/// Existing properties are overwritten, but never removed. Returns the number of merged fields
pub fn merge_properties (feature: &mut Feature, record: JsonObject, prefix: &str) -> usize {
    let props = feature.properties.get_or_insert_with( JsonObject::new);
    let mut n = 0;
    for (k,v) in record.into_iter().filter( |(_,v)| !v.is_null()) {
        props.insert( format!("{prefix}{k}"), v);
        n += 1;
    }
    n
}

pub fn merge_record<T: Serialize> (feature: &mut Feature, record: &T, prefix: &str) -> Result<usize> {
    Ok( merge_properties( feature, to_properties( record)?, prefix))
}

/// stable sort by initial bearing from `center`, clockwise from north. Unlocated features go last
pub fn sort_by_bearing (features: &mut [Feature], center: &Location) {
    features.sort_by_cached_key( |f| BearingKey( feature_location(f).map( |loc| center.bearing_to( &loc))));
}

#[derive(PartialEq)]
struct BearingKey (Option<f64>);

impl Eq for BearingKey {}

impl PartialOrd for BearingKey {
    fn partial_cmp (&self, other: &Self) -> Option<Ordering> { Some( self.cmp(other)) }
}

impl Ord for BearingKey {
    fn cmp (&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.total_cmp( &b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal
        }
    }
}
