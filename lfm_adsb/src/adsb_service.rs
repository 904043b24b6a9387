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
use axum::{
    http::StatusCode,
    routing::{Router,get},
    extract::State,
    response::{Response,IntoResponse},
    Json,
};
use serde_json::json;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    config::{MapConfig, ServerConfig},
    errors::{LfmAdsbError, Result},
    feature::empty_feature_collection,
    pipeline::BatchEnrichmentPipeline,
};

/// header that carries the pipeline status if we have to substitute an empty collection
pub const STATUS_HEADER: &str = "X-Status-Code";

/// the web layer state. Each poll of `/service/aircrafts` runs one pipeline cycle
#[derive(Clone)]
pub struct AdsbService {
    pipeline: Arc<BatchEnrichmentPipeline>,
    config: Arc<MapConfig>,
    cancel: CancellationToken,
}

impl AdsbService {
    pub fn new (pipeline: Arc<BatchEnrichmentPipeline>, config: Arc<MapConfig>, cancel: CancellationToken)->Self {
        AdsbService { pipeline, config, cancel }
    }

    pub fn router (self) -> Router {
        Router::new()
            .route( "/service/aircrafts", get( Self::aircrafts_handler))
            .route( "/service/health", get( Self::health_handler))
            .route( "/ui/config", get( Self::ui_config_handler))
            .with_state( self)
    }

    async fn aircrafts_handler (State(service): State<AdsbService>) -> Response {
        match service.pipeline.get_aircraft_geojson_cancellable( &service.cancel).await {
            Ok(Some(fc)) => Json(fc).into_response(),
            Ok(None) => Json( empty_feature_collection()).into_response(),
            Err(e) => {
                let status = if e.is_validation() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
                error!( provider = %service.config.provider, "aircraft snapshot failed: {e}");
                ( [(STATUS_HEADER, status.as_u16().to_string())], Json( empty_feature_collection())).into_response()
            }
        }
    }

    async fn health_handler () -> Response {
        Json( json!({"status": "ok"})).into_response()
    }

    async fn ui_config_handler (State(service): State<AdsbService>) -> Response {
        match ui_config( &service.config) {
            Ok(v) => Json(v).into_response(),
            Err(e) => {
                error!("invalid map config: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// the map settings the browser client needs
pub fn ui_config (config: &MapConfig) -> Result<serde_json::Value> {
    let bbox = config.bounding_box()?;
    Ok( json!({
        "interval": config.refresh_interval.as_millis() as u64,
        "bounds": { "north": bbox.north(), "south": bbox.south(), "east": bbox.east(), "west": bbox.west() },
        "center": { "lat": config.center.latitude, "lng": config.center.longitude },
        "radius": config.radius,
        "data_provider": config.provider.name(),
    }))
}

/// serve `router` until `cancel` is triggered
pub fn spawn_server_task (config: &ServerConfig, router: Router, cancel: CancellationToken) -> JoinHandle<Result<()>> {
    let sock_addr = config.sock_addr;

    tokio::spawn( async move {
        let listener = TcpListener::bind( sock_addr).await?;
        info!("serving flight map on http://{sock_addr}");

        axum::serve( listener, router)
            .with_graceful_shutdown( async move { cancel.cancelled().await })
            .await?;

        info!("server shut down");
        Ok(())
    })
}
