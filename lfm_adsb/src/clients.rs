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

use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use geojson::FeatureCollection;
use tracing::info;

use lfm_common::net::build_client;
use crate::{
    adsbexchange::AdsbExchangeClient, adsbexchange_feed::AdsbExchangeFeedClient, opensky::OpenSkyClient, hexdb::{HexDbClient, AircraftInformation, RouteInformation, AirportInformation},
    config::ApiConfig, errors::Result, AircraftSource, LiveQuery, MetadataLookup
};

/// one client per upstream provider, sharing a single HTTP connection pool.
/// Owned caches are released by `close()`, which is also called on drop
pub struct ApiClients {
    pub adsbexchange: AdsbExchangeClient,
    pub adsbexchange_feed: AdsbExchangeFeedClient,
    pub opensky: OpenSkyClient,
    pub hexdb: HexDbClient,
    closed: AtomicBool,
}

impl ApiClients {
    pub fn new (config: &ApiConfig) -> Result<Self> {
        let client = build_client( &config.http)?;

        Ok( ApiClients {
            adsbexchange: AdsbExchangeClient::new( config.adsbexchange.clone(), client.clone()),
            adsbexchange_feed: AdsbExchangeFeedClient::new( config.adsbexchange_feed.clone(), client.clone()),
            opensky: OpenSkyClient::new( config.opensky.clone(), client.clone()),
            hexdb: HexDbClient::new( config.hexdb.clone(), client),
            closed: AtomicBool::new(false),
        })
    }

    /// release all cached responses. Only the first call has an effect
    pub fn close (&self) {
        if !self.closed.swap( true, Ordering::SeqCst) {
            self.adsbexchange.close();
            self.adsbexchange_feed.close();
            self.opensky.close();
            self.hexdb.close();
            info!("api clients closed");
        }
    }

    pub fn is_closed (&self) -> bool { self.closed.load( Ordering::SeqCst) }
}

impl Drop for ApiClients {
    fn drop (&mut self) { self.close() }
}

#[async_trait]
impl AircraftSource for ApiClients {
    async fn fetch_live_aircraft (&self, query: &LiveQuery) -> Result<Option<FeatureCollection>> {
        match query {
            LiveQuery::Range{center,radius} => {
                self.adsbexchange.get_aircraft_within_range( center, *radius).await?
                    .map( |r| r.to_feature_collection()).transpose()
            }
            LiveQuery::Area(bbox) => {
                self.opensky.get_states( None, &[], Some(bbox)).await?
                    .map( |r| r.to_feature_collection()).transpose()
            }
            LiveQuery::OwnSensors{serials} => {
                self.opensky.get_own_states( None, &[], serials).await?
                    .map( |r| r.to_feature_collection()).transpose()
            }
            LiveQuery::Feed{uuid} => {
                self.adsbexchange_feed.get_aircraft_from_feed( uuid).await?
                    .map( |r| r.to_feature_collection()).transpose()
            }
        }
    }
}

#[async_trait]
impl MetadataLookup for ApiClients {
    async fn fetch_aircraft_info (&self, icao24: &str) -> Result<Option<AircraftInformation>> {
        self.hexdb.get_aircraft_information( icao24).await
    }

    async fn fetch_route_info (&self, callsign: &str) -> Result<Option<RouteInformation>> {
        self.hexdb.get_route_information( callsign).await
    }

    async fn fetch_airport_info (&self, icao: &str) -> Result<Option<AirportInformation>> {
        self.hexdb.get_airport_information( icao).await
    }
}
