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

use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lfm_common::geo::Location;
use lfm_adsb::{
    config::{DataProvider, MapConfig},
    feature::{str_property, CALLSIGN, ICAO24, TAGS},
    ApiClients, BatchEnrichmentPipeline
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "fetch and print one enriched aircraft snapshot")]
pub struct Args {
    /// optional RON map config, defaults are used otherwise
    #[arg(short,long)]
    pub config: Option<String>,

    /// override the configured data provider
    #[arg(short,long)]
    pub provider: Option<DataProvider>,

    /// map center latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// map center longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// radius in nautical miles
    #[arg(short,long)]
    pub radius: Option<f64>,

    /// print the full GeoJSON instead of a summary line per aircraft
    #[arg(short,long)]
    pub json: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter( env_filter).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MapConfig::load( path)?,
        None => MapConfig::default().with_env_overrides()
    };
    if let Some(provider) = args.provider { config.provider = provider }
    if let (Some(lat),Some(lon)) = (args.lat, args.lon) { config.center = Location::new( lat, lon)? }
    if let Some(radius) = args.radius { config.radius = radius }
    config.validate()?;

    let clients = Arc::new( ApiClients::new( &config.api)?);
    let pipeline = BatchEnrichmentPipeline::new( &config, clients.clone(), clients.clone())?;

    match pipeline.get_aircraft_geojson().await? {
        Some(fc) if args.json => println!("{}", serde_json::to_string_pretty( &fc)?),
        Some(fc) => {
            println!("------- {} aircraft ({})", fc.features.len(), pipeline.query());
            for f in &fc.features {
                let icao24 = str_property( f, ICAO24).unwrap_or("?");
                let callsign = str_property( f, CALLSIGN).unwrap_or("");
                let tags = f.properties.as_ref().and_then( |p| p.get( TAGS)).map( |t| t.to_string()).unwrap_or_default();
                println!("{icao24:8} {callsign:10} {tags}");
            }
        }
        None => println!("no aircraft data available"),
    }

    clients.close();
    Ok(())
}
