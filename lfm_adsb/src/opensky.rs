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

///! client for the OpenSky Network REST API

use std::time::Duration;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoValue, feature::Id};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize,Deserialize};
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug,info,warn};

use lfm_common::{
    cache::ShortLivedCache, datetime::{days, is_older_than, secs},
    geo::BoundingBox, net::{get_optional_json, join_url}, non_empty, rate_limit::RateLimiter
};
use crate::{
    config::OpenSkyConfig,
    errors::{Result, LfmAdsbError, parse_error, validation_error},
    feature::{aircraft_feature, feature_collection, to_properties}
};

/// the oldest track OpenSky serves
pub const MAX_TRACK_AGE: Duration = days(30);

/// tokens are refreshed this long before they expire
const TOKEN_EXPIRY_MARGIN: Duration = secs(30);

/// field names of positional state vector arrays, in order. `category` is only included for extended queries
pub const STATE_FIELDS: [&str; 18] = [
    "icao24", "callsign", "origin_country", "time_position", "last_contact", "longitude", "latitude",
    "baro_altitude", "on_ground", "velocity", "true_track", "vertical_rate", "sensors", "geo_altitude",
    "squawk", "spi", "position_source", "category"
];
const MIN_STATE_FIELDS: usize = 17;

/* #region response types ************************************************************/

/// state of an aircraft as reported by OpenSky. Deserializes from OpenSky field names, serializes as feature property names
#[derive(Deserialize,Serialize,Debug,Clone,Default,PartialEq)]
pub struct StateVector {
    #[serde(rename(deserialize="icao24"))] pub icao24_code: String,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub time_position: Option<i64>,
    pub last_contact: Option<i64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude: Option<f64>, // meters
    #[serde(default)] pub on_ground: bool,
    pub velocity: Option<f64>, // m/s
    #[serde(rename(deserialize="true_track"))] pub track_angle: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub sensors: Option<Vec<i64>>,
    pub geo_altitude: Option<f64>,
    #[serde(rename(deserialize="squawk"))] pub squawk_code: Option<String>,
    #[serde(rename(deserialize="spi"), default)] pub special_position_indicator_flag: bool,
    pub position_source: Option<u8>, // 0: ADS-B, 1: ASTERIX, 2: MLAT, 3: FLARM
    pub category: Option<u8>,
}

impl StateVector {
    /// parse a positional state array (17 entries, or 18 for extended queries)
    pub fn from_values (values: &[JsonValue]) -> Result<Self> {
        if values.len() < MIN_STATE_FIELDS {
            return Err( parse_error!("state vector has {} fields, expected at least {}", values.len(), MIN_STATE_FIELDS))
        }
        let obj: JsonObject = STATE_FIELDS.iter().zip( values.iter())
            .map( |(k,v)| (k.to_string(), v.clone()))
            .collect();

        Self::from_object( obj)
    }

    pub fn from_object (obj: JsonObject) -> Result<Self> {
        let mut sv: StateVector = serde_json::from_value( JsonValue::Object(obj))?;
        sv.callsign = sv.callsign.as_deref().and_then( non_empty).map( |s| s.to_string());
        Ok(sv)
    }

    pub fn to_feature (&self) -> Result<Feature> {
        Ok( aircraft_feature( &self.icao24_code, self.longitude.zip( self.latitude), to_properties( self)?))
    }
}

/// states can be reported as positional arrays or as objects
#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(untagged)]
pub enum RawState {
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

impl RawState {
    pub fn to_state_vector (&self) -> Result<StateVector> {
        match self {
            RawState::Array(values) => StateVector::from_values( values),
            RawState::Object(obj) => StateVector::from_object( obj.clone()),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct OpenSkyStates {
    pub time: i64,
    #[serde(default)]
    pub states: Option<Vec<RawState>>,
}

impl OpenSkyStates {
    pub fn state_vectors (&self) -> Result<Vec<StateVector>> {
        self.states.iter().flatten().map( |s| s.to_state_vector()).collect()
    }

    pub fn to_feature_collection (&self) -> Result<FeatureCollection> {
        let features = self.state_vectors()?.iter().map( |sv| sv.to_feature()).collect::<Result<Vec<Feature>>>()?;
        Ok( feature_collection( features))
    }
}

/// a waypoint of a flight track: (time, latitude, longitude, baro_altitude, true_track, on_ground)
#[derive(Deserialize,Serialize,Debug,Clone,PartialEq)]
pub struct Waypoint (pub i64, pub Option<f64>, pub Option<f64>, pub Option<f64>, pub Option<f64>, pub bool);

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(rename_all="camelCase")]
pub struct FlightTrack {
    pub icao24: String,
    pub start_time: i64,
    pub end_time: i64,
    pub callsign: Option<String>,
    #[serde(default)]
    pub path: Vec<Waypoint>,
}

impl FlightTrack {
    /// LineString feature of all located waypoints
    pub fn to_feature (&self) -> Feature {
        let located: Vec<&Waypoint> = self.path.iter().filter( |wp| wp.1.is_some() && wp.2.is_some()).collect();
        let coords: Vec<Vec<f64>> = located.iter().filter_map( |wp| Some( vec![wp.2?, wp.1?])).collect();

        let mut props = JsonObject::new();
        props.insert( "icao24_code".into(), self.icao24.clone().into());
        props.insert( "callsign".into(), self.callsign.as_deref().and_then( non_empty).into());
        props.insert( "start_time".into(), self.start_time.into());
        props.insert( "end_time".into(), self.end_time.into());
        props.insert( "times".into(), located.iter().map( |wp| wp.0).collect::<Vec<i64>>().into());
        props.insert( "baro_altitudes".into(), located.iter().map( |wp| wp.3).collect::<Vec<Option<f64>>>().into());

        Feature {
            bbox: None,
            geometry: if coords.is_empty() { None } else { Some( Geometry::new( GeoValue::LineString( coords))) },
            id: Some( Id::String( self.icao24.to_lowercase())),
            properties: Some(props),
            foreign_members: None,
        }
    }
}

/* #endregion response types */

/* #region authentication ************************************************************/

#[derive(Deserialize,Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>, // seconds
}

struct AccessToken {
    token: String,
    expires: Instant,
}

/* #endregion authentication */

/// rate limited operations of the OpenSky API
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum OpenSkyOp { States, OwnStates, Tracks }

pub struct OpenSkyClient {
    config: OpenSkyConfig,
    client: Client,
    limiter: RateLimiter<OpenSkyOp>,
    states_cache: ShortLivedCache<String,Option<OpenSkyStates>>,
    token: Mutex<Option<AccessToken>>,
}

impl OpenSkyClient {
    pub fn new (config: OpenSkyConfig, client: Client) -> Self {
        let states_cache = ShortLivedCache::with_ttl( "opensky_states", config.states_ttl);
        OpenSkyClient { config, client, limiter: RateLimiter::new(), states_cache, token: Mutex::new(None) }
    }

    pub fn is_authenticated (&self) -> bool { self.config.has_credentials() }

    fn window (&self) -> Duration {
        if self.is_authenticated() { self.config.window_auth } else { self.config.window_no_auth }
    }

    /// get a cached OAuth2 token or request a new one with the configured client credentials
    async fn access_token (&self, client_id: &str, client_secret: &str) -> Result<String> {
        let mut token = self.token.lock().await;

        if let Some(t) = token.as_ref() {
            if Instant::now() < t.expires { return Ok( t.token.clone()) }
        }

        let params = [("grant_type", "client_credentials"), ("client_id", client_id), ("client_secret", client_secret)];
        let response = self.client.post( &self.config.auth_url).form( &params).send().await?;

        match response.status() {
            StatusCode::OK => {
                let tr: TokenResponse = response.json().await?;
                let lifetime = secs( tr.expires_in.unwrap_or(1800)).saturating_sub( TOKEN_EXPIRY_MARGIN);
                info!( expires_in_secs = lifetime.as_secs(), "obtained OpenSky access token");

                *token = Some( AccessToken { token: tr.access_token.clone(), expires: Instant::now() + lifetime });
                Ok( tr.access_token)
            }
            other => {
                *token = None;
                Err( LfmAdsbError::AuthError( format!("token request failed with status {other}")))
            }
        }
    }

    async fn authorize (&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let cfg = &self.config;
        if let (Some(id), Some(secret)) = (&cfg.client_id, &cfg.client_secret) {
            let token = self.access_token( id, secret).await?;
            Ok( req.bearer_auth( token))
        } else if let (Some(user), Some(pw)) = (&cfg.username, &cfg.password) {
            Ok( req.basic_auth( user, Some(pw)))
        } else {
            Ok(req)
        }
    }

    async fn get<T> (&self, op: OpenSkyOp, path: &str, query: &[(&str,String)]) -> Result<Option<T>> where T: serde::de::DeserializeOwned {
        let url = join_url( &self.config.base_url, path);
        let req = self.authorize( self.client.get( &url).query( query)).await?;

        self.limiter.acquire( op, self.window()).await;
        debug!( url = %url, ?query, "opensky request");
        Ok( get_optional_json( req).await? )
    }

    /// all state vectors, optionally filtered by time, aircraft and area
    pub async fn get_states (&self, time: Option<i64>, icao24s: &[String], bbox: Option<&BoundingBox>) -> Result<Option<OpenSkyStates>> {
        let mut query = time_and_icao24_params( time, icao24s);
        if let Some(bbox) = bbox {
            bbox.validate()?;
            query.push( ("lamin", bbox.min_lat.to_string()));
            query.push( ("lamax", bbox.max_lat.to_string()));
            query.push( ("lomin", bbox.min_lon.to_string()));
            query.push( ("lomax", bbox.max_lon.to_string()));
        }
        query.push( ("extended", "1".to_string()));

        let key = cache_key( &query);
        self.states_cache.get_or_try_insert_with( key, move || async move {
            self.get( OpenSkyOp::States, "api/states/all", &query).await
        }).await
    }

    /// state vectors of the own sensors. Requires credentials
    pub async fn get_own_states (&self, time: Option<i64>, icao24s: &[String], serials: &[i64]) -> Result<Option<OpenSkyStates>> {
        if !self.is_authenticated() {
            return Err( validation_error!("own states require OpenSky credentials"))
        }
        let mut query = time_and_icao24_params( time, icao24s);
        for s in serials {
            query.push( ("serials", s.to_string()));
        }

        let key = format!("own?{}", cache_key( &query));
        self.states_cache.get_or_try_insert_with( key, move || async move {
            self.get( OpenSkyOp::OwnStates, "api/states/own", &query).await
        }).await
    }

    /// trajectory of an aircraft. `time` 0 is the live track, otherwise it has to be within the last 30 days
    pub async fn get_track_by_aircraft (&self, icao24: &str, time: i64) -> Result<Option<FlightTrack>> {
        let Some(icao24) = non_empty( icao24) else { return Err( validation_error!("missing icao24")) };
        if time != 0 && is_older_than( time, MAX_TRACK_AGE) {
            return Err( validation_error!("track time {time} is more than 30 days in the past"))
        }
        let query = [("icao24", icao24.to_lowercase()), ("time", time.to_string())];
        self.get( OpenSkyOp::Tracks, "api/tracks/all", &query).await
    }

    pub fn close (&self) {
        self.states_cache.close();
        self.limiter.reset();
        if let Ok(mut token) = self.token.try_lock() { *token = None }
        debug!("opensky client closed");
    }
}

fn time_and_icao24_params (time: Option<i64>, icao24s: &[String]) -> Vec<(&'static str,String)> {
    let mut query = Vec::new();
    if let Some(t) = time.filter( |t| *t != 0) {
        query.push( ("time", t.to_string()));
    }
    for icao24 in icao24s.iter().filter_map( |s| non_empty(s)) {
        query.push( ("icao24", icao24.to_lowercase()));
    }
    query
}

fn cache_key (query: &[(&str,String)]) -> String {
    query.iter().map( |(k,v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}
