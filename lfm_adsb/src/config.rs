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

use std::{fmt, net::SocketAddr, path::Path, str::FromStr, time::Duration};
use serde::{Serialize,Deserialize};
use uom::si::f64::Length;

use lfm_common::{
    config::{load_config, env_override},
    datetime::{millis, secs},
    geo::{BoundingBox, Location, nautical_miles},
    net::HttpConfig
};
use crate::errors::{Result, LfmAdsbError};

/// the upstream service that provides live aircraft positions
#[derive(Deserialize,Serialize,Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum DataProvider {
    /// ADS-B Exchange range query around the map center
    #[serde(rename="adsbexchange")] AdsbExchange,
    /// aircraft seen by an ADS-B Exchange feeder station
    #[serde(rename="adsbexchange_feed")] AdsbExchangeFeed,
    /// OpenSky Network bounding box query
    #[serde(rename="opensky")] OpenSky,
    /// OpenSky Network states of the own (registered) sensors
    #[serde(rename="opensky_personal")] OpenSkyPersonal,
}

impl DataProvider {
    pub fn name (&self) -> &'static str {
        match self {
            DataProvider::AdsbExchange => "adsbexchange",
            DataProvider::AdsbExchangeFeed => "adsbexchange_feed",
            DataProvider::OpenSky => "opensky",
            DataProvider::OpenSkyPersonal => "opensky_personal",
        }
    }
}

impl fmt::Display for DataProvider {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name()) }
}

impl FromStr for DataProvider {
    type Err = LfmAdsbError;

    fn from_str (s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "adsbexchange" => Ok(DataProvider::AdsbExchange),
            "adsbexchange_feed" => Ok(DataProvider::AdsbExchangeFeed),
            "opensky" => Ok(DataProvider::OpenSky),
            "opensky_personal" => Ok(DataProvider::OpenSkyPersonal),
            other => Err( LfmAdsbError::ValidationError( format!("unknown data provider '{other}'")))
        }
    }
}

/* #region provider configs **********************************************************/

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct AdsbExchangeConfig {
    pub base_url: String,
    pub host: String, // RapidAPI host header
    pub api_key: Option<String>,
    pub window_auth: Duration, // min interval between calls if we have an api_key
    pub window_no_auth: Duration,
    pub range_ttl: Duration, // how long range query results are valid
    pub max_entries: usize, // of lookup caches (registration, icao etc.)
}

impl Default for AdsbExchangeConfig {
    fn default() -> Self {
        AdsbExchangeConfig {
            base_url: "https://adsbexchange-com1.p.rapidapi.com/".into(),
            host: "adsbexchange-com1.p.rapidapi.com".into(),
            api_key: None,
            window_auth: millis(100),
            window_no_auth: secs(1),
            range_ttl: millis(100),
            max_entries: 1000,
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct AdsbExchangeFeedConfig {
    pub base_url: String,
    pub uuid: Option<String>, // of the feeder station
    pub window: Duration,
    pub ttl: Duration,
}

impl Default for AdsbExchangeFeedConfig {
    fn default() -> Self {
        AdsbExchangeFeedConfig {
            base_url: "https://globe.adsbexchange.com/".into(),
            uuid: None,
            window: millis(250),
            ttl: millis(100),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct OpenSkyConfig {
    pub base_url: String,
    pub auth_url: String, // OAuth2 token endpoint

    // OAuth2 client credentials take precedence over (legacy) basic auth
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    pub serials: Vec<i64>, // own sensors to query for the opensky_personal provider

    pub window_auth: Duration,
    pub window_no_auth: Duration,
    pub states_ttl: Duration,
}

impl OpenSkyConfig {
    pub fn has_oauth2_credentials (&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    pub fn has_basic_credentials (&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    pub fn has_credentials (&self) -> bool {
        self.has_oauth2_credentials() || self.has_basic_credentials()
    }
}

impl Default for OpenSkyConfig {
    fn default() -> Self {
        OpenSkyConfig {
            base_url: "https://opensky-network.org/".into(),
            auth_url: "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token".into(),
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            serials: Vec::new(),
            window_auth: secs(5),
            window_no_auth: secs(10),
            states_ttl: millis(100),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct HexDbConfig {
    pub base_url: String,
    pub max_entries: usize,
}

impl Default for HexDbConfig {
    fn default() -> Self {
        HexDbConfig { base_url: "https://hexdb.io/".into(), max_entries: 1000 }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone,Default)]
#[serde(default)]
pub struct ApiConfig {
    pub http: HttpConfig,
    pub adsbexchange: AdsbExchangeConfig,
    pub adsbexchange_feed: AdsbExchangeFeedConfig,
    pub opensky: OpenSkyConfig,
    pub hexdb: HexDbConfig,
}

impl ApiConfig {
    /// replace credentials with non-empty `LFM_..` environment variables so that they don't have to be
    /// stored in config files
    pub fn with_env_overrides (mut self) -> Self {
        self.adsbexchange.api_key = env_override( "LFM_ADSBEXCHANGE_API_KEY", self.adsbexchange.api_key.take());
        self.adsbexchange_feed.uuid = env_override( "LFM_ADSBEXCHANGE_FEED_UUID", self.adsbexchange_feed.uuid.take());
        self.opensky.client_id = env_override( "LFM_OPENSKY_CLIENT_ID", self.opensky.client_id.take());
        self.opensky.client_secret = env_override( "LFM_OPENSKY_CLIENT_SECRET", self.opensky.client_secret.take());
        self.opensky.username = env_override( "LFM_OPENSKY_USERNAME", self.opensky.username.take());
        self.opensky.password = env_override( "LFM_OPENSKY_PASSWORD", self.opensky.password.take());
        self
    }
}

/* #endregion provider configs */

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct ServerConfig {
    pub sock_addr: SocketAddr,
}

impl ServerConfig {
    pub fn url (&self) -> String {
        format!("http://{}", self.sock_addr)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { sock_addr: SocketAddr::from( ([127,0,0,1], 5006)) }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center: Location,
    pub radius: f64, // nautical miles
    pub bbox: Option<BoundingBox>, // explicit area, otherwise derived from center and radius
    pub provider: DataProvider,

    pub batch_size: usize, // number of features enriched concurrently
    pub max_concurrent: usize, // max enrichments in flight
    pub max_concurrent_metadata: usize, // max metadata lookups in flight, has to be <= max_concurrent
    pub mark_incomplete: bool, // tag features with failed metadata lookups

    pub refresh_interval: Duration, // UI poll interval
    pub server: ServerConfig,
    pub api: ApiConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: Location { latitude: 50.15, longitude: 8.3166667 },
            radius: 50.0,
            bbox: None,
            provider: DataProvider::AdsbExchange,
            batch_size: 50,
            max_concurrent: 10,
            max_concurrent_metadata: 5,
            mark_incomplete: false,
            refresh_interval: millis(200),
            server: ServerConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl MapConfig {
    pub fn load (path: impl AsRef<Path>) -> Result<Self> {
        let config: MapConfig = load_config( path)?;
        config.validate()?;
        Ok( config.with_env_overrides())
    }

    pub fn with_env_overrides (mut self) -> Self {
        self.api = self.api.with_env_overrides();
        self
    }

    pub fn validate (&self) -> Result<()> {
        self.center.validate()?;
        if let Some(bbox) = &self.bbox { bbox.validate()? }
        if !(self.radius > 0.0) {
            return Err( LfmAdsbError::ValidationError( format!("invalid radius {}", self.radius)))
        }
        if self.batch_size == 0 || self.max_concurrent == 0 || self.max_concurrent_metadata == 0 {
            return Err( LfmAdsbError::ValidationError( "batch size and concurrency limits have to be > 0".into()))
        }
        Ok(())
    }

    pub fn radius_length (&self) -> Length { nautical_miles( self.radius) }

    /// the configured bbox or the one computed from center and radius
    pub fn bounding_box (&self) -> Result<BoundingBox> {
        match &self.bbox {
            Some(bbox) => Ok( *bbox),
            None => Ok( BoundingBox::from_center_and_radius( &self.center, self.radius_length())?)
        }
    }
}
