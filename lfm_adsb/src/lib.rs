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

//! live aircraft positions for a local flight map. Positions come from one of the configured
//! providers (ADS-B Exchange, an ADS-B Exchange feeder station or the OpenSky Network) and are
//! enriched with aircraft registry, route and airport metadata from hexdb.io before they are
//! served as a GeoJSON FeatureCollection

use std::fmt;
use async_trait::async_trait;
use geojson::FeatureCollection;
use uom::si::{f64::Length, length::nautical_mile};

use lfm_common::{geo::{BoundingBox, Location}, non_empty};

pub mod errors;
pub mod config;
pub mod feature;
pub mod tags;
pub mod adsbexchange;
pub mod adsbexchange_feed;
pub mod opensky;
pub mod hexdb;
pub mod clients;
pub mod enricher;
pub mod pipeline;
pub mod adsb_service;

use errors::{Result, validation_error};
use config::{DataProvider, MapConfig};
use hexdb::{AircraftInformation, AirportInformation, RouteInformation};

/// the single provider request made per poll cycle
#[derive(Debug,Clone,PartialEq)]
pub enum LiveQuery {
    /// all aircraft within radius of center (ADS-B Exchange)
    Range { center: Location, radius: Length },
    /// all aircraft within area (OpenSky)
    Area(BoundingBox),
    /// aircraft seen by the own OpenSky sensors
    OwnSensors { serials: Vec<i64> },
    /// aircraft seen by an ADS-B Exchange feeder station
    Feed { uuid: String },
}

impl LiveQuery {
    pub fn from_config (config: &MapConfig) -> Result<Self> {
        match config.provider {
            DataProvider::AdsbExchange => Ok( LiveQuery::Range { center: config.center, radius: config.radius_length() }),
            DataProvider::OpenSky => Ok( LiveQuery::Area( config.bounding_box()?)),
            DataProvider::OpenSkyPersonal => Ok( LiveQuery::OwnSensors { serials: config.api.opensky.serials.clone() }),
            DataProvider::AdsbExchangeFeed => {
                let uuid = config.api.adsbexchange_feed.uuid.as_deref().and_then( non_empty)
                    .ok_or_else( || validation_error!("no feeder uuid configured"))?;
                Ok( LiveQuery::Feed { uuid: uuid.to_string() })
            }
        }
    }

    pub fn provider (&self) -> DataProvider {
        match self {
            LiveQuery::Range{..} => DataProvider::AdsbExchange,
            LiveQuery::Area(_) => DataProvider::OpenSky,
            LiveQuery::OwnSensors{..} => DataProvider::OpenSkyPersonal,
            LiveQuery::Feed{..} => DataProvider::AdsbExchangeFeed,
        }
    }
}

impl fmt::Display for LiveQuery {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveQuery::Range{center,radius} => write!(f, "range {} {:.1}nm", center, radius.get::<nautical_mile>()),
            LiveQuery::Area(bbox) => write!(f, "area {}", bbox),
            LiveQuery::OwnSensors{serials} => write!(f, "own sensors {:?}", serials),
            LiveQuery::Feed{..} => write!(f, "feeder"), // don't log the uuid
        }
    }
}

/// source of raw (not yet enriched) live aircraft features. `Ok(None)` means no data for this cycle
#[async_trait]
pub trait AircraftSource: Send + Sync {
    async fn fetch_live_aircraft (&self, query: &LiveQuery) -> Result<Option<FeatureCollection>>;
}

/// aircraft, route and airport metadata used to enrich live features. `Ok(None)` means not found
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn fetch_aircraft_info (&self, icao24: &str) -> Result<Option<AircraftInformation>>;
    async fn fetch_route_info (&self, callsign: &str) -> Result<Option<RouteInformation>>;
    async fn fetch_airport_info (&self, icao: &str) -> Result<Option<AirportInformation>>;
}

pub use clients::ApiClients;
pub use enricher::FeatureEnricher;
pub use pipeline::{BatchEnrichmentPipeline, PipelineSettings};
