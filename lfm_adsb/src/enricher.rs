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

///! per-feature enrichment with aircraft registry, route and airport metadata

use std::{future::Future, sync::Arc};
use geojson::{Feature, JsonObject, JsonValue};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::{
    errors::{Result, op_failed},
    feature::{merge_record, str_property, CALLSIGN, DESTINATION_PREFIX, ENRICHMENT_INCOMPLETE, ICAO24, ORIGIN_PREFIX, TAGS},
    hexdb::RouteInformation,
    tags::derive_tags,
    MetadataLookup
};

pub struct FeatureEnricher {
    metadata: Arc<dyn MetadataLookup>,
    metadata_permits: Arc<Semaphore>, // bounds concurrent metadata requests
    mark_incomplete: bool,
}

impl FeatureEnricher {
    pub fn new (metadata: Arc<dyn MetadataLookup>, max_concurrent_metadata: usize, mark_incomplete: bool) -> Self {
        let metadata_permits = Arc::new( Semaphore::new( max_concurrent_metadata.max(1)));
        FeatureEnricher { metadata, metadata_permits, mark_incomplete }
    }

    /// enrich a raw aircraft feature. This never fails - whatever could be merged before an error
    /// occurred is kept and the error is logged
    pub async fn enrich (&self, mut feature: Feature) -> Feature {
        let icao24 = str_property( &feature, ICAO24).unwrap_or_default().to_string();
        let callsign = str_property( &feature, CALLSIGN).unwrap_or_default().to_string();

        if let Err(e) = self.try_enrich( &mut feature, &icao24, &callsign).await {
            warn!( icao24 = or_unknown(&icao24), callsign = or_unknown(&callsign), "enrichment failed: {e}");
        }
        feature
    }

    async fn try_enrich (&self, feature: &mut Feature, icao24: &str, callsign: &str) -> Result<()> {
        let mut incomplete = false;

        let (aircraft, route) = tokio::join!(
            self.lookup( self.metadata.fetch_aircraft_info( icao24)),
            self.lookup( self.metadata.fetch_route_info( callsign))
        );

        match aircraft {
            Ok(Some(info)) => { merge_record( feature, &info, "")?; }
            Ok(None) => debug!( icao24 = or_unknown(icao24), "no aircraft information"),
            Err(e) => {
                warn!( icao24 = or_unknown(icao24), "aircraft lookup failed: {e}");
                incomplete = true;
            }
        }

        match route {
            Ok(Some(route)) => {
                merge_record( feature, &route, "")?;
                incomplete |= self.merge_airports( feature, &route, callsign).await?;
            }
            Ok(None) => debug!( callsign = or_unknown(callsign), "no route information"),
            Err(e) => {
                warn!( callsign = or_unknown(callsign), "route lookup failed: {e}");
                incomplete = true;
            }
        }

        let props = feature.properties.get_or_insert_with( JsonObject::new);
        let mut tags = derive_tags( props);
        if incomplete && self.mark_incomplete {
            tags.push( ENRICHMENT_INCOMPLETE.to_string());
            props.insert( ENRICHMENT_INCOMPLETE.into(), JsonValue::Bool(true));
        }
        props.insert( TAGS.into(), JsonValue::from( tags));

        Ok(())
    }

    /// merge origin and destination airports of `route`. Returns true if one of the lookups failed
    async fn merge_airports (&self, feature: &mut Feature, route: &RouteInformation, callsign: &str) -> Result<bool> {
        let Some((origin, destination)) = route.endpoints() else { return Ok(false) };

        let (origin, destination) = tokio::join!(
            self.optional_airport( origin),
            self.optional_airport( destination)
        );

        let mut incomplete = false;
        for (res, prefix) in [(origin, ORIGIN_PREFIX), (destination, DESTINATION_PREFIX)] {
            match res {
                Ok(Some(airport)) => { merge_record( feature, &airport, prefix)?; }
                Ok(None) => {}
                Err(e) => {
                    warn!( callsign = or_unknown(callsign), "{prefix}airport lookup failed: {e}");
                    incomplete = true;
                }
            }
        }
        Ok(incomplete)
    }

    async fn optional_airport (&self, icao: Option<&str>) -> Result<Option<crate::hexdb::AirportInformation>> {
        match icao {
            Some(icao) => self.lookup( self.metadata.fetch_airport_info( icao)).await,
            None => Ok(None)
        }
    }

    /// run a metadata request while holding one of the metadata permits
    async fn lookup<T,F> (&self, request: F) -> Result<T> where F: Future<Output=Result<T>> {
        let _permit = self.metadata_permits.acquire().await.map_err( |_| op_failed("metadata permits closed"))?;
        request.await
    }
}

fn or_unknown (s: &str) -> &str {
    if s.is_empty() { "unknown" } else { s }
}
