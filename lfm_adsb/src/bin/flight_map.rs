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
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lfm_adsb::{
    adsb_service::{spawn_server_task, AdsbService},
    config::{DataProvider, MapConfig},
    ApiClients, BatchEnrichmentPipeline
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "serve enriched live aircraft positions for a local flight map")]
pub struct Args {
    /// path of the RON map config
    #[arg(short,long, default_value = "configs/flight_map.ron")]
    pub config: String,

    /// override the configured data provider (adsbexchange, adsbexchange_feed, opensky, opensky_personal)
    #[arg(short,long)]
    pub provider: Option<DataProvider>,
}

#[tokio::main]
async fn main()->Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter( env_filter).init();

    let args = Args::parse();

    let mut config = MapConfig::load( &args.config)?;
    if let Some(provider) = args.provider { config.provider = provider }
    let config = Arc::new( config);

    let clients = Arc::new( ApiClients::new( &config.api)?);
    let pipeline = Arc::new( BatchEnrichmentPipeline::new( &config, clients.clone(), clients.clone())?);
    info!( provider = %config.provider, query = %pipeline.query(), "flight map pipeline ready");

    let cancel = CancellationToken::new();
    let router = AdsbService::new( pipeline.clone(), config.clone(), cancel.clone()).router();
    let server_task = spawn_server_task( &config.server, router, cancel.clone());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();

    server_task.await??;
    clients.close();

    Ok(())
}
