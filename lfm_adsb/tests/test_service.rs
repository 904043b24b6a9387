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

use std::{net::SocketAddr, sync::Arc, time::Duration};
use async_trait::async_trait;
use geojson::FeatureCollection;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use lfm_adsb::{
    adsb_service::{spawn_server_task, ui_config, AdsbService, STATUS_HEADER},
    config::{MapConfig, ServerConfig},
    errors::{op_failed, LfmAdsbError, Result},
    hexdb::{AircraftInformation, AirportInformation, RouteInformation},
    AircraftSource, BatchEnrichmentPipeline, MetadataLookup
};

enum Outcome { Empty, NoData, Unavailable, BadRequest }

struct TestSource (Outcome);

#[async_trait]
impl AircraftSource for TestSource {
    async fn fetch_live_aircraft (&self, _query: &lfm_adsb::LiveQuery) -> Result<Option<FeatureCollection>> {
        match self.0 {
            Outcome::Empty => Ok( Some( lfm_adsb::feature::empty_feature_collection())),
            Outcome::NoData => Ok(None),
            Outcome::Unavailable => Err( op_failed("upstream returned 502")),
            Outcome::BadRequest => Err( LfmAdsbError::ValidationError("radius too large".into())),
        }
    }
}

struct NoMetadata;

#[async_trait]
impl MetadataLookup for NoMetadata {
    async fn fetch_aircraft_info (&self, _icao24: &str) -> Result<Option<AircraftInformation>> { Ok(None) }
    async fn fetch_route_info (&self, _callsign: &str) -> Result<Option<RouteInformation>> { Ok(None) }
    async fn fetch_airport_info (&self, _icao: &str) -> Result<Option<AirportInformation>> { Ok(None) }
}

async fn serve (outcome: Outcome, port: u16) -> (String, CancellationToken, tokio::task::JoinHandle<Result<()>>) {
    let mut config = MapConfig::default();
    config.server = ServerConfig { sock_addr: SocketAddr::from( ([127,0,0,1], port)) };
    let config = Arc::new( config);

    let pipeline = Arc::new( BatchEnrichmentPipeline::new( &config, Arc::new( TestSource(outcome)), Arc::new( NoMetadata)).unwrap());
    let cancel = CancellationToken::new();
    let router = AdsbService::new( pipeline, config.clone(), cancel.clone()).router();
    let task = spawn_server_task( &config.server, router, cancel.clone());

    tokio::time::sleep( Duration::from_millis(100)).await; // give the listener time to bind
    (config.server.url(), cancel, task)
}

async fn get_aircrafts (url: &str) -> (Option<String>, Value) {
    let response = reqwest::get( format!("{url}/service/aircrafts")).await.unwrap();
    assert!( response.status().is_success());
    let status = response.headers().get( STATUS_HEADER).and_then( |v| v.to_str().ok()).map( |s| s.to_string());
    (status, response.json().await.unwrap())
}

#[test]
fn test_ui_config() {
    let config = MapConfig::default();
    let v = ui_config( &config).unwrap();
    println!("{}", serde_json::to_string_pretty( &v).unwrap());

    assert_eq!( v["interval"], json!(200));
    assert_eq!( v["center"], json!({"lat": 50.15, "lng": 8.3166667}));
    assert_eq!( v["data_provider"], json!("adsbexchange"));
    assert!( v["bounds"]["north"].as_f64().unwrap() > 50.15);
    assert!( v["bounds"]["west"].as_f64().unwrap() < 8.3166667);
}

#[tokio::test]
async fn test_aircrafts_endpoint() {
    let (url, cancel, task) = serve( Outcome::Empty, 45781).await;

    let (status, body) = get_aircrafts( &url).await;
    println!("body: {body}");
    assert_eq!( status, None);
    assert_eq!( body["type"], json!("FeatureCollection"));
    assert_eq!( body["features"], json!([]));

    let health: Value = reqwest::get( format!("{url}/service/health")).await.unwrap().json().await.unwrap();
    assert_eq!( health, json!({"status": "ok"}));

    cancel.cancel();
    tokio::time::timeout( Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_failures_give_empty_collections() {
    let (url, cancel, task) = serve( Outcome::Unavailable, 45782).await;
    let (status, body) = get_aircrafts( &url).await;
    assert_eq!( status.as_deref(), Some("500"));
    assert_eq!( body["features"], json!([]));
    cancel.cancel();

    let (url, cancel, task) = serve( Outcome::BadRequest, 45783).await;
    let (status, body) = get_aircrafts( &url).await;
    assert_eq!( status.as_deref(), Some("400"));
    cancel.cancel();

    let (url, cancel, task) = serve( Outcome::NoData, 45784).await;
    let (status, body) = get_aircrafts( &url).await;
    assert_eq!( status, None);
    assert_eq!( body["features"], json!([]));
    cancel.cancel();
}
