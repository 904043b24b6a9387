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

///! the batch pipeline that turns one provider snapshot into an enriched, bearing sorted FeatureCollection.
///! Features are enriched in sequential chunks, concurrently within each chunk. The number of enrichments
///! in flight is bounded by a global semaphore, metadata requests by the (smaller) enricher semaphore which
///! is only acquired while holding a global permit

use std::{panic::AssertUnwindSafe, sync::Arc, time::Instant};
use futures::{future::join_all, FutureExt};
use geojson::{Feature, FeatureCollection};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use lfm_common::geo::Location;
use crate::{
    config::MapConfig,
    enricher::FeatureEnricher,
    errors::{LfmAdsbError, Result},
    feature::{sort_by_bearing, str_property, ICAO24},
    AircraftSource, LiveQuery, MetadataLookup
};

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct PipelineSettings {
    pub batch_size: usize,
    pub max_concurrent: usize,
    pub max_concurrent_metadata: usize,
    pub mark_incomplete: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings { batch_size: 50, max_concurrent: 10, max_concurrent_metadata: 5, mark_incomplete: false }
    }
}

impl From<&MapConfig> for PipelineSettings {
    fn from (config: &MapConfig) -> Self {
        PipelineSettings {
            batch_size: config.batch_size,
            max_concurrent: config.max_concurrent,
            max_concurrent_metadata: config.max_concurrent_metadata,
            mark_incomplete: config.mark_incomplete,
        }
    }
}

pub struct BatchEnrichmentPipeline {
    source: Arc<dyn AircraftSource>,
    enricher: FeatureEnricher,
    query: LiveQuery,
    center: Location,  // origin for the bearing sort
    batch_size: usize,
    permits: Arc<Semaphore>,
}

impl BatchEnrichmentPipeline {
    pub fn new (config: &MapConfig, source: Arc<dyn AircraftSource>, metadata: Arc<dyn MetadataLookup>) -> Result<Self> {
        let query = LiveQuery::from_config( config)?;
        Ok( Self::with_query( query, config.center, PipelineSettings::from( config), source, metadata))
    }

    pub fn with_query (query: LiveQuery, center: Location, settings: PipelineSettings,
                       source: Arc<dyn AircraftSource>, metadata: Arc<dyn MetadataLookup>) -> Self {
        let enricher = FeatureEnricher::new( metadata, settings.max_concurrent_metadata, settings.mark_incomplete);
        let permits = Arc::new( Semaphore::new( settings.max_concurrent.max(1)));

        BatchEnrichmentPipeline { source, enricher, query, center, batch_size: settings.batch_size.max(1), permits }
    }

    pub fn query (&self) -> &LiveQuery { &self.query }

    pub fn center (&self) -> &Location { &self.center }

    /// fetch and enrich the current aircraft snapshot. `Ok(None)` means the provider had no data for this cycle,
    /// provider errors are propagated
    pub async fn get_aircraft_geojson (&self) -> Result<Option<FeatureCollection>> {
        let start = Instant::now();

        let Some(raw) = self.source.fetch_live_aircraft( &self.query).await? else {
            info!( provider = %self.query.provider(), "no aircraft data");
            return Ok(None)
        };

        let FeatureCollection { bbox, features, foreign_members } = raw;
        let n_features = features.len();
        let mut enriched: Vec<Feature> = Vec::with_capacity( n_features);

        let mut remaining = features.into_iter();
        loop {
            let chunk: Vec<Feature> = remaining.by_ref().take( self.batch_size).collect();
            if chunk.is_empty() { break }

            let results = join_all( chunk.into_iter().map( |f| self.enrich_guarded(f))).await;
            enriched.extend( results);
        }

        sort_by_bearing( &mut enriched, &self.center);
        debug!( features = n_features, elapsed_ms = start.elapsed().as_millis() as u64, "aircraft snapshot enriched");

        Ok( Some( FeatureCollection { bbox, features: enriched, foreign_members }))
    }

    /// same as `get_aircraft_geojson` but aborts with `LfmAdsbError::Cancelled` once `cancel` is triggered.
    /// Dropping the in-flight future releases all held permits and rate limiter slots
    pub async fn get_aircraft_geojson_cancellable (&self, cancel: &CancellationToken) -> Result<Option<FeatureCollection>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err( LfmAdsbError::Cancelled),
            res = self.get_aircraft_geojson() => res
        }
    }

    /// enrich one feature while holding a global permit. A panicking enrichment yields the raw feature
    async fn enrich_guarded (&self, feature: Feature) -> Feature {
        let Ok(_permit) = self.permits.acquire().await else { return feature };
        let raw = feature.clone();

        match AssertUnwindSafe( self.enricher.enrich( feature)).catch_unwind().await {
            Ok(feature) => feature,
            Err(_) => {
                error!( icao24 = str_property( &raw, ICAO24).unwrap_or("unknown"), "enrichment panicked, keeping raw feature");
                raw
            }
        }
    }
}
