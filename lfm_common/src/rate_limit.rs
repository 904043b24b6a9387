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

///! minimum-interval rate limiting for upstream operations

use std::{collections::HashMap, fmt::Debug, hash::Hash, sync::{Arc, Mutex, PoisonError}, time::Duration};
use tokio::{sync::Mutex as AsyncMutex, time::{sleep, Instant}};
use tracing::debug;

/// enforces a minimum interval between successive invocations of the same operation key.
///
/// Each key has its own async lock that is held across the "read last time, maybe sleep, record now"
/// sequence, i.e. concurrent acquirers of the same key are serialized and the second one completes
/// no earlier than `window` after the first one completed. Different keys never wait on each other.
///
/// The window is a parameter of `acquire` and not of the key since the same operation can have
/// different allowed rates (e.g. depending on whether the caller is authenticated).
///
/// Acquisition is cancel safe: dropping the `acquire` future during its sleep releases the key lock
/// and does not record an invocation.
pub struct RateLimiter<K> {
    slots: Mutex<HashMap<K,Arc<AsyncMutex<Option<Instant>>>>>,
}

impl<K> RateLimiter<K> where K: Eq + Hash + Clone + Debug {
    pub fn new ()->Self {
        RateLimiter { slots: Mutex::new( HashMap::new()) }
    }

    fn slot (&self, key: &K) -> Arc<AsyncMutex<Option<Instant>>> {
        let mut slots = self.slots.lock().unwrap_or_else( PoisonError::into_inner);
        slots.entry( key.clone()).or_default().clone()
    }

    /// wait until at least `window` has passed since the last recorded invocation for `key`, then record now.
    /// The first call for a key never waits
    pub async fn acquire (&self, key: K, window: Duration) {
        let slot = self.slot( &key);
        let mut last = slot.lock().await;

        if let Some(t_last) = *last {
            let elapsed = t_last.elapsed();
            if elapsed < window {
                let wait = window - elapsed;
                debug!( key = ?key, wait_ms = wait.as_millis() as u64, "rate limit wait");
                sleep( wait).await;
            }
        }

        *last = Some( Instant::now());
    }

    /// time of the last recorded invocation for `key`, if any
    pub async fn last_invocation (&self, key: &K) -> Option<Instant> {
        let slot = self.slot( key);
        let last = slot.lock().await;
        *last
    }

    /// forget all recorded invocations
    pub fn reset (&self) {
        self.slots.lock().unwrap_or_else( PoisonError::into_inner).clear();
    }
}

impl<K> Default for RateLimiter<K> where K: Eq + Hash + Clone + Debug {
    fn default() -> Self { Self::new() }
}
