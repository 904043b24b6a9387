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

///! client for the ADS-B Exchange API (RapidAPI v2 endpoints)

use geojson::{Feature, FeatureCollection, JsonValue};
use reqwest::{Client, header::HeaderMap};
use serde::{Serialize,Deserialize};
use tracing::{debug,warn};
use uom::si::{f64::Length, length::nautical_mile};

use lfm_common::{
    cache::ShortLivedCache, geo::Location, net::{get_headermap, get_optional_json, join_url},
    non_empty, rate_limit::RateLimiter
};
use crate::{
    config::AdsbExchangeConfig,
    errors::{Result, LfmAdsbError, validation_error},
    feature::{aircraft_feature, feature_collection, to_properties}
};

/// ADS-B state of an aircraft as reported by ADS-B Exchange. Fields are deserialized from the API names and
/// serialized as feature property names
#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct AdsbxAircraft {
    #[serde(rename(deserialize="hex"))] pub icao24_code: String,
    #[serde(rename(deserialize="flight"))] pub callsign: Option<String>,
    #[serde(rename(deserialize="r"))] pub registration: Option<String>,
    #[serde(rename(deserialize="t"))] pub r#type: Option<String>,
    #[serde(rename(deserialize="alt_baro"))] pub baro_altitude: Option<JsonValue>, // "ground" or feet
    #[serde(rename(deserialize="alt_geom"))] pub geom_altitude: Option<i64>,
    #[serde(rename(deserialize="gs"))] pub ground_speed: Option<f64>,
    #[serde(rename(deserialize="ias"))] pub indicated_airspeed: Option<f64>,
    #[serde(rename(deserialize="tas"))] pub true_airspeed: Option<f64>,
    pub mach: Option<f64>,
    #[serde(rename(deserialize="wd"))] pub wind_direction: Option<f64>,
    #[serde(rename(deserialize="ws"))] pub wind_speed: Option<f64>,
    #[serde(rename(deserialize="oat"))] pub outside_air_temperature: Option<f64>,
    #[serde(rename(deserialize="tat"))] pub total_air_temperature: Option<f64>,
    #[serde(rename(deserialize="track"))] pub track_angle: Option<f64>,
    pub track_rate: Option<f64>,
    #[serde(rename(deserialize="roll"))] pub roll_angle: Option<f64>,
    #[serde(rename(deserialize="mag_heading"))] pub magnetic_heading: Option<f64>,
    pub true_heading: Option<f64>,
    #[serde(rename(deserialize="baro_rate"))] pub baro_rate_of_climb_descent: Option<f64>,
    #[serde(rename(deserialize="geom_rate"))] pub geom_rate_of_climb_descent: Option<f64>,
    #[serde(rename(deserialize="squawk"))] pub squawk_code: Option<String>,
    #[serde(rename(deserialize="emergency"))] pub emergency_status: Option<String>,
    pub category: Option<String>, // ADS-B emitter category such as "A3"
    #[serde(rename(deserialize="nav_qnh"))] pub qnh_pressure: Option<f64>,
    #[serde(rename(deserialize="nav_altitude_mcp"))] pub mcp_altitude: Option<i64>,
    #[serde(rename(deserialize="nav_altitude_fms"))] pub fms_altitude: Option<i64>,
    #[serde(rename(deserialize="nav_heading"))] pub heading: Option<f64>,
    #[serde(rename(deserialize="nav_modes"))] pub navigation_modes: Option<Vec<String>>,
    #[serde(rename(deserialize="lat"))] pub latitude: Option<f64>,
    #[serde(rename(deserialize="lon"))] pub longitude: Option<f64>,
    #[serde(rename(deserialize="nic"))] pub navigation_integrity_category: Option<i64>,
    #[serde(rename(deserialize="rc"))] pub radius_of_containment: Option<i64>,
    #[serde(rename(deserialize="seen_pos"))] pub time_since_last_position_update: Option<f64>,
    pub version: Option<i64>,
    #[serde(rename(deserialize="nic_baro"))] pub baro_navigation_integrity_category: Option<i64>,
    #[serde(rename(deserialize="nac_p"))] pub navigation_accuracy_category_for_position: Option<i64>,
    #[serde(rename(deserialize="nac_v"))] pub navigation_accuracy_category_for_velocity: Option<i64>,
    #[serde(rename(deserialize="sil"))] pub surveillance_integrity_level: Option<i64>,
    #[serde(rename(deserialize="sil_type"))] pub surveillance_integrity_level_type: Option<String>,
    #[serde(rename(deserialize="gva"))] pub geometric_vertical_accuracy: Option<i64>,
    #[serde(rename(deserialize="sda"))] pub system_design_assurance: Option<i64>,
    #[serde(rename(deserialize="alert"))] pub alert_flag: Option<i64>,
    #[serde(rename(deserialize="spi"))] pub special_position_indicator_flag: Option<i64>,
    #[serde(rename(deserialize="mlat"))] pub multilateration_sources: Option<Vec<String>>,
    #[serde(rename(deserialize="tisb"))] pub tisb_sources: Option<Vec<String>>,
    #[serde(rename(deserialize="messages"))] pub number_of_messages_received: Option<i64>,
    #[serde(rename(deserialize="seen"))] pub time_since_last_update: Option<f64>,
    #[serde(rename(deserialize="rssi"))] pub received_signal_strength_indicator: Option<f64>,
    #[serde(rename(deserialize="gpsOkBefore"))] pub time_since_last_gps_update: Option<f64>,
    #[serde(rename(deserialize="gpsOkLat"))] pub latitude_of_gps_update: Option<f64>,
    #[serde(rename(deserialize="gpsOkLon"))] pub longitude_of_gps_update: Option<f64>,
}

impl AdsbxAircraft {
    /// (lon,lat) position, preferring the last position with good GPS
    pub fn lon_lat (&self) -> Option<(f64,f64)> {
        match (self.longitude_of_gps_update, self.latitude_of_gps_update) {
            (Some(lon), Some(lat)) => Some((lon,lat)),
            _ => self.longitude.zip( self.latitude)
        }
    }

    pub fn to_feature (&self) -> Result<Feature> {
        Ok( aircraft_feature( &self.icao24_code, self.lon_lat(), to_properties( self)?))
    }
}

#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct AdsbExchangeResponse {
    #[serde(default)]
    pub ac: Option<Vec<AdsbxAircraft>>,
    pub msg: Option<String>,
    pub now: Option<i64>, // epoch millis
    pub total: Option<u64>,
    pub ctime: Option<i64>,
    pub ptime: Option<i64>,
}

impl AdsbExchangeResponse {
    pub fn aircraft (&self) -> &[AdsbxAircraft] {
        self.ac.as_deref().unwrap_or_default()
    }

    pub fn to_feature_collection (&self) -> Result<FeatureCollection> {
        let features = self.aircraft().iter().map( |ac| ac.to_feature()).collect::<Result<Vec<Feature>>>()?;
        Ok( feature_collection( features))
    }
}

/// rate limited operations of the ADS-B Exchange API
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum AdsbxOp { Range, Lookup, Military }

pub struct AdsbExchangeClient {
    config: AdsbExchangeConfig,
    client: Client,
    limiter: RateLimiter<AdsbxOp>,
    range_cache: ShortLivedCache<String,Option<AdsbExchangeResponse>>,
    lookup_cache: ShortLivedCache<String,Option<AdsbExchangeResponse>>,
}

impl AdsbExchangeClient {
    pub fn new (config: AdsbExchangeConfig, client: Client) -> Self {
        let range_cache = ShortLivedCache::with_ttl( "adsbx_range", config.range_ttl);
        let lookup_cache = ShortLivedCache::with_max_entries( "adsbx_lookup", config.max_entries);

        AdsbExchangeClient { config, client, limiter: RateLimiter::new(), range_cache, lookup_cache }
    }

    pub fn is_authenticated (&self) -> bool { self.config.api_key.is_some() }

    fn window (&self) -> std::time::Duration {
        if self.is_authenticated() { self.config.window_auth } else { self.config.window_no_auth }
    }

    fn headers (&self) -> Result<HeaderMap> {
        let mut headers = vec![ ("X-RapidAPI-Host", self.config.host.as_str()) ];
        if let Some(key) = &self.config.api_key {
            headers.push( ("X-RapidAPI-Key", key.as_str()));
        }
        Ok( get_headermap( headers)? )
    }

    async fn get (&self, op: AdsbxOp, path: String) -> Result<Option<AdsbExchangeResponse>> {
        let url = join_url( &self.config.base_url, &path);
        let headers = self.headers()?;

        self.limiter.acquire( op, self.window()).await;
        debug!( url = %url, "adsbexchange request");
        Ok( get_optional_json( self.client.get( url).headers( headers)).await? )
    }

    async fn lookup (&self, op: AdsbxOp, path: String) -> Result<Option<AdsbExchangeResponse>> {
        self.lookup_cache.get_or_try_insert_with( path.clone(), move || self.get( op, path)).await
    }

    /// all aircraft within `radius` of `center`
    pub async fn get_aircraft_within_range (&self, center: &Location, radius: Length) -> Result<Option<AdsbExchangeResponse>> {
        center.validate()?;
        let r = radius.get::<nautical_mile>();
        if !(r > 0.0) { return Err( validation_error!("invalid range radius {r}")) }

        let path = format!("v2/lat/{:.6}/lon/{:.6}/dist/{:.3}/", center.latitude, center.longitude, r);
        self.range_cache.get_or_try_insert_with( path.clone(), move || self.get( AdsbxOp::Range, path)).await
    }

    pub async fn get_by_registration (&self, registration: &str) -> Result<Option<AdsbExchangeResponse>> {
        let reg = required( "registration", registration)?;
        self.lookup( AdsbxOp::Lookup, format!("v2/registration/{reg}/")).await
    }

    pub async fn get_by_icao (&self, icao24: &str) -> Result<Option<AdsbExchangeResponse>> {
        let hex = required( "icao24", icao24)?.to_lowercase();
        self.lookup( AdsbxOp::Lookup, format!("v2/icao/{hex}/")).await
    }

    pub async fn get_by_callsign (&self, callsign: &str) -> Result<Option<AdsbExchangeResponse>> {
        let cs = required( "callsign", callsign)?;
        self.lookup( AdsbxOp::Lookup, format!("v2/callsign/{cs}/")).await
    }

    pub async fn get_by_squawk (&self, squawk: &str) -> Result<Option<AdsbExchangeResponse>> {
        let sq = required( "squawk", squawk)?;
        if !(sq.len() == 4 && sq.chars().all( |c| ('0'..='7').contains(&c))) {
            return Err( validation_error!("invalid squawk code '{sq}'"))
        }
        self.lookup( AdsbxOp::Lookup, format!("v2/sqk/{sq}/")).await
    }

    /// military aircraft are not cached as this is live data
    pub async fn get_military (&self) -> Result<Option<AdsbExchangeResponse>> {
        self.get( AdsbxOp::Military, "v2/mil/".to_string()).await
    }

    pub fn close (&self) {
        self.range_cache.close();
        self.lookup_cache.close();
        self.limiter.reset();
        debug!("adsbexchange client closed");
    }
}

fn required<'a> (what: &str, s: &'a str) -> Result<&'a str> {
    non_empty( s).ok_or_else( || validation_error!("missing {what}"))
}
