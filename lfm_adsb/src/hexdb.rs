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

///! client for the hexdb.io aircraft, route and airport metadata service

use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize,Deserialize};
use tracing::debug;

use lfm_common::{cache::ShortLivedCache, net::{get_optional_json, join_url}, non_empty};
use crate::{config::HexDbConfig, errors::{Result, LfmAdsbError}, MetadataLookup};

/// aircraft registry record. Deserialized from hexdb field names, serialized as feature property names
#[derive(Deserialize,Serialize,Debug,Clone,PartialEq,Default)]
pub struct AircraftInformation {
    #[serde(rename(deserialize="ICAOTypeCode"))] pub icao_type_code: Option<String>,
    #[serde(rename(deserialize="Manufacturer"))] pub manufacturer: Option<String>,
    #[serde(rename(deserialize="ModeS"))] pub mode_s: Option<String>,
    #[serde(rename(deserialize="OperatorFlagCode"))] pub operator_flag_code: Option<String>,
    #[serde(rename(deserialize="RegisteredOwners"))] pub registered_owners: Option<String>,
    #[serde(rename(deserialize="Registration"))] pub registration: Option<String>,
    #[serde(rename(deserialize="Type"))] pub r#type: Option<String>,
}

#[derive(Deserialize,Serialize,Debug,Clone,PartialEq,Default)]
pub struct RouteInformation {
    pub flight: Option<String>,
    pub route: Option<String>, // "<origin ICAO>-<destination ICAO>"
    #[serde(rename(deserialize="updatetime"))] pub update_time: Option<i64>,
}

impl RouteInformation {
    /// origin and destination airport codes if the route has at least two legs.
    /// For multi-leg routes these are the first and the last airport
    pub fn endpoints (&self) -> Option<(Option<&str>,Option<&str>)> {
        let route = self.route.as_deref()?;
        let parts: Vec<&str> = route.split('-').map( |s| s.trim()).collect();
        if parts.len() < 2 { return None }

        let origin = non_empty( parts[0]);
        let destination = non_empty( parts[parts.len()-1]);
        if origin.is_none() && destination.is_none() { None } else { Some((origin, destination)) }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone,PartialEq,Default)]
pub struct AirportInformation {
    pub airport: Option<String>,
    pub country_code: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub region_name: Option<String>,
}

/// hexdb.io client. All lookups are cached (including not-found results) since the data changes slowly
pub struct HexDbClient {
    config: HexDbConfig,
    client: Client,
    aircraft_cache: ShortLivedCache<String,Option<AircraftInformation>>,
    route_cache: ShortLivedCache<String,Option<RouteInformation>>,
    airport_cache: ShortLivedCache<String,Option<AirportInformation>>,
}

impl HexDbClient {
    pub fn new (config: HexDbConfig, client: Client) -> Self {
        let n = config.max_entries;
        HexDbClient {
            config,
            client,
            aircraft_cache: ShortLivedCache::with_max_entries( "hexdb_aircraft", n),
            route_cache: ShortLivedCache::with_max_entries( "hexdb_route", n),
            airport_cache: ShortLivedCache::with_max_entries( "hexdb_airport", n),
        }
    }

    fn url (&self, path: &str) -> String { join_url( &self.config.base_url, path) }

    pub async fn get_aircraft_information (&self, icao24: &str) -> Result<Option<AircraftInformation>> {
        let Some(key) = non_empty( icao24).map( |s| s.to_lowercase()) else { return Ok(None) };
        let url = self.url( &format!("api/v1/aircraft/{key}"));

        self.aircraft_cache.get_or_try_insert_with( key, move || async move {
            Ok::<_,LfmAdsbError>( get_optional_json( self.client.get( url)).await? )
        }).await
    }

    pub async fn get_route_information (&self, callsign: &str) -> Result<Option<RouteInformation>> {
        let Some(key) = non_empty( callsign).map( |s| s.to_lowercase()) else { return Ok(None) };
        let url = self.url( &format!("api/v1/route/icao/{key}"));

        self.route_cache.get_or_try_insert_with( key, move || async move {
            Ok::<_,LfmAdsbError>( get_optional_json( self.client.get( url)).await? )
        }).await
    }

    pub async fn get_airport_information (&self, icao: &str) -> Result<Option<AirportInformation>> {
        let Some(key) = non_empty( icao).map( |s| s.to_lowercase()) else { return Ok(None) };
        let url = self.url( &format!("api/v1/airport/icao/{key}"));

        self.airport_cache.get_or_try_insert_with( key, move || async move {
            Ok::<_,LfmAdsbError>( get_optional_json( self.client.get( url)).await? )
        }).await
    }

    pub fn close (&self) {
        self.aircraft_cache.close();
        self.route_cache.close();
        self.airport_cache.close();
        debug!("hexdb client closed");
    }
}

#[async_trait]
impl MetadataLookup for HexDbClient {
    async fn fetch_aircraft_info (&self, icao24: &str) -> Result<Option<AircraftInformation>> {
        self.get_aircraft_information( icao24).await
    }

    async fn fetch_route_info (&self, callsign: &str) -> Result<Option<RouteInformation>> {
        self.get_route_information( callsign).await
    }

    async fn fetch_airport_info (&self, icao: &str) -> Result<Option<AirportInformation>> {
        self.get_airport_information( icao).await
    }
}
