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

///! client for the aircraft list of an ADS-B Exchange feeder station (globe.adsbexchange.com)

use geojson::{Feature, FeatureCollection, JsonValue};
use reqwest::Client;
use serde::{Serialize,Deserialize};
use tracing::debug;

use lfm_common::{cache::ShortLivedCache, net::{get_optional_json, join_url}, non_empty, rate_limit::RateLimiter};
use crate::{
    adsbexchange::AdsbxAircraft,
    config::AdsbExchangeFeedConfig,
    errors::{Result, LfmAdsbError, validation_error},
    feature::{aircraft_feature, feature_collection, to_properties}
};

/// last known position, reported if the current position is outdated
#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct LastPosition {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub nic: Option<i64>,
    pub rc: Option<i64>,
    pub seen_pos: Option<f64>,
}

#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct FeederAircraft {
    #[serde(flatten)]
    pub state: AdsbxAircraft,
    #[serde(rename(deserialize="r_dst"))] pub distance_from_receiver: Option<f64>,
    #[serde(rename(deserialize="r_dir"))] pub direction_from_receiver: Option<f64>,
    #[serde(rename(deserialize="calc_track"))] pub calculated_track: Option<f64>,
    #[serde(rename(deserialize="lastPosition"), skip_serializing)] pub last_position: Option<LastPosition>,
}

impl FeederAircraft {
    /// (lon,lat) of the current position or, if there is none, of the last known position
    pub fn lon_lat (&self) -> Option<(f64,f64)> {
        self.state.longitude.zip( self.state.latitude)
            .or_else( || self.last_position.as_ref().and_then( |p| p.lon.zip( p.lat)))
    }

    pub fn is_last_position (&self) -> bool {
        self.state.longitude.zip( self.state.latitude).is_none() && self.lon_lat().is_some()
    }

    pub fn to_feature (&self) -> Result<Feature> {
        let lon_lat = self.lon_lat();
        let mut props = to_properties( self)?;

        if let Some((lon,lat)) = lon_lat {
            props.insert( "latitude".into(), lat.into());
            props.insert( "longitude".into(), lon.into());
        }
        if let Some(last) = &self.last_position {
            fill_null( &mut props, "navigation_integrity_category", last.nic);
            fill_null( &mut props, "radius_of_containment", last.rc);
            fill_null( &mut props, "time_since_last_position_update", last.seen_pos);
        }
        props.insert( "is_last_position".into(), self.is_last_position().into());

        Ok( aircraft_feature( &self.state.icao24_code, lon_lat, props))
    }
}

fn fill_null<T: Into<JsonValue>> (props: &mut geojson::JsonObject, key: &str, v: Option<T>) {
    if props.get( key).is_none_or( |v| v.is_null()) {
        if let Some(v) = v { props.insert( key.into(), v.into()); }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct FeederResponse {
    pub now: Option<f64>, // epoch seconds
    pub messages: Option<i64>,
    #[serde(default)]
    pub aircraft: Vec<FeederAircraft>,
}

impl FeederResponse {
    pub fn to_feature_collection (&self) -> Result<FeatureCollection> {
        let features = self.aircraft.iter().map( |ac| ac.to_feature()).collect::<Result<Vec<Feature>>>()?;
        Ok( feature_collection( features))
    }
}

pub struct AdsbExchangeFeedClient {
    config: AdsbExchangeFeedConfig,
    client: Client,
    limiter: RateLimiter<&'static str>,
    cache: ShortLivedCache<String,Option<FeederResponse>>,
}

impl AdsbExchangeFeedClient {
    pub fn new (config: AdsbExchangeFeedConfig, client: Client) -> Self {
        let cache = ShortLivedCache::with_ttl( "adsbx_feed", config.ttl);
        AdsbExchangeFeedClient { config, client, limiter: RateLimiter::new(), cache }
    }

    /// the configured feeder uuid
    pub fn uuid (&self) -> Option<&str> { self.config.uuid.as_deref().and_then( non_empty) }

    pub async fn get_aircraft_from_feed (&self, uuid: &str) -> Result<Option<FeederResponse>> {
        let Some(uuid) = non_empty( uuid) else { return Err( validation_error!("missing feeder uuid")) };
        let url = join_url( &self.config.base_url, &format!("uuid/?feed={uuid}"));

        self.cache.get_or_try_insert_with( uuid.to_string(), move || async move {
            self.limiter.acquire( "feed", self.config.window).await;
            debug!( url = %url, "feeder request");
            Ok::<_,LfmAdsbError>( get_optional_json( self.client.get( url)).await? )
        }).await
    }

    pub fn close (&self) {
        self.cache.close();
        self.limiter.reset();
        debug!("adsbexchange feed client closed");
    }
}
