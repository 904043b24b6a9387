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

///! short lived memoization of async lookups with request coalescing

use std::{collections::HashMap, fmt::Debug, future::Future, hash::Hash, sync::{Arc, Mutex, MutexGuard, PoisonError, atomic::{AtomicU64, Ordering}}, time::Duration};
use serde::{Serialize,Deserialize};
use tokio::{sync::OnceCell, time::Instant};
use tracing::{debug,trace};

/// expiry policy of a `ShortLivedCache`
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub enum CachePolicy {
    /// keep at most N distinct keys, evicting the least recently used one
    MaxEntries(usize),
    /// entries become stale after the given duration
    TimeToLive(Duration),
}

#[derive(Debug,Default,Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub evictions: u64,
}

/// a computed value and the time it was stored. The cell stays empty while the computation is in flight.
/// Slots of failed computations are removed from the store
struct Slot<V> {
    cell: OnceCell<(V,Instant)>,
    created: Instant,
}

struct Entry<V> {
    slot: Arc<Slot<V>>,
    last_used: u64,
}

struct CacheStore<K,V> {
    entries: HashMap<K,Entry<V>>,
    tick: u64,
    closed: bool,
}

/// memoizes results of an async operation keyed by its arguments.
///
/// Concurrent calls for the same key while a computation is in flight share that computation. Errors
/// are never cached, the next call for the key runs the operation again. After `close()` the cache
/// is bypassed and each call runs the operation directly.
///
/// The cache is an explicit object owned by the client it shields, its lifetime is the client lifetime
pub struct ShortLivedCache<K,V> {
    name: &'static str,
    policy: CachePolicy,
    store: Mutex<CacheStore<K,V>>,

    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

impl<K,V> ShortLivedCache<K,V> where K: Eq + Hash + Clone + Debug, V: Clone {

    pub fn new (name: &'static str, policy: CachePolicy) -> Self {
        ShortLivedCache {
            name,
            policy,
            store: Mutex::new( CacheStore { entries: HashMap::new(), tick: 0, closed: false }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn with_max_entries (name: &'static str, n: usize) -> Self { Self::new( name, CachePolicy::MaxEntries(n)) }

    pub fn with_ttl (name: &'static str, ttl: Duration) -> Self { Self::new( name, CachePolicy::TimeToLive(ttl)) }

    pub fn name (&self) -> &'static str { self.name }

    pub fn policy (&self) -> CachePolicy { self.policy }

    fn lock (&self) -> MutexGuard<'_,CacheStore<K,V>> {
        self.store.lock().unwrap_or_else( PoisonError::into_inner)
    }

    fn is_stale (&self, slot: &Slot<V>, now: Instant) -> bool {
        match self.policy {
            CachePolicy::TimeToLive(ttl) => {
                // empty slots that outlived the ttl belong to abandoned computations
                let t = slot.cell.get().map_or( slot.created, |(_,t)| *t);
                now.duration_since(t) >= ttl
            }
            CachePolicy::MaxEntries(_) => false
        }
    }

    /// get the slot for `key`, replacing stale ones and sweeping expired entries.
    /// Returns `None` if the cache is closed
    fn slot_for (&self, key: &K) -> Option<Arc<Slot<V>>> {
        let now = Instant::now();
        let mut store = self.lock();
        if store.closed { return None }

        store.tick += 1;
        let tick = store.tick;

        if let Some(e) = store.entries.get_mut( key) {
            if !self.is_stale( &e.slot, now) {
                e.last_used = tick;
                if e.slot.cell.initialized() {
                    self.hits.fetch_add( 1, Ordering::Relaxed);
                } else {
                    self.coalesced.fetch_add( 1, Ordering::Relaxed);
                    trace!( cache = self.name, key = ?key, "coalescing with in-flight computation");
                }
                return Some( e.slot.clone())
            }
        }

        self.misses.fetch_add( 1, Ordering::Relaxed);
        let slot = Arc::new( Slot { cell: OnceCell::new(), created: now });
        store.entries.insert( key.clone(), Entry { slot: slot.clone(), last_used: tick });

        if let CachePolicy::TimeToLive(_) = self.policy {
            let n_before = store.entries.len();
            store.entries.retain( |_,e| !self.is_stale( &e.slot, now));
            let n_evicted = (n_before - store.entries.len()) as u64;
            if n_evicted > 0 { self.evictions.fetch_add( n_evicted, Ordering::Relaxed); }
        }

        Some(slot)
    }

    /// return a still valid value for `key` or compute, store and return it by running `f`.
    /// Errors of `f` are passed through and not stored
    pub async fn get_or_try_insert_with<F,Fut,E> (&self, key: K, f: F) -> Result<V,E>
        where F: FnOnce()->Fut, Fut: Future<Output=Result<V,E>>
    {
        match self.slot_for( &key) {
            Some(slot) => {
                match slot.cell.get_or_try_init( || async { f().await.map( |v| (v, Instant::now())) }).await {
                    Ok((v,_)) => {
                        self.enforce_capacity( &key);
                        Ok( v.clone())
                    }
                    Err(e) => {
                        self.remove_failed( &key, &slot);
                        Err(e)
                    }
                }
            }
            None => f().await
        }
    }

    /// evict least recently used entries other than `key` once a stored value exceeds the capacity.
    /// In-flight computations do not push out values before they succeed
    fn enforce_capacity (&self, key: &K) {
        let CachePolicy::MaxEntries(n) = self.policy else { return };
        let mut store = self.lock();

        while store.entries.len() > n {
            let lru = store.entries.iter()
                .filter( |(k,_)| *k != key)
                .min_by_key( |(_,e)| e.last_used)
                .map( |(k,_)| k.clone());

            if let Some(k) = lru {
                store.entries.remove( &k);
                self.evictions.fetch_add( 1, Ordering::Relaxed);
                trace!( cache = self.name, key = ?k, "evicted");
            } else {
                break
            }
        }
    }

    /// drop the entry for `key` if it still refers to the failed `slot`, so that it neither occupies
    /// capacity nor turns the next call into a coalesced one
    fn remove_failed (&self, key: &K, slot: &Arc<Slot<V>>) {
        let mut store = self.lock();
        if store.entries.get( key).is_some_and( |e| Arc::ptr_eq( &e.slot, slot) && !e.slot.cell.initialized()) {
            store.entries.remove( key);
            trace!( cache = self.name, key = ?key, "removed failed computation");
        }
    }

    /// the currently stored, valid value for `key` (does not trigger a computation)
    pub fn peek (&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let store = self.lock();
        store.entries.get( key)
            .filter( |e| !self.is_stale( &e.slot, now))
            .and_then( |e| e.slot.cell.get().map( |(v,_)| v.clone()))
    }

    pub fn invalidate (&self, key: &K) {
        self.lock().entries.remove( key);
    }

    /// number of stored keys, including in-flight computations
    pub fn len (&self) -> usize { self.lock().entries.len() }

    pub fn is_empty (&self) -> bool { self.len() == 0 }

    /// drop all entries. Computations that are still in flight complete for their current callers but
    /// their results are not stored anymore
    pub fn clear (&self) {
        let mut store = self.lock();
        let n = store.entries.len();
        store.entries.clear();
        debug!( cache = self.name, entries = n, "cleared");
    }

    /// clear and stop caching. Idempotent
    pub fn close (&self) {
        let mut store = self.lock();
        if !store.closed {
            store.entries.clear();
            store.closed = true;
            debug!( cache = self.name, "closed");
        }
    }

    pub fn is_closed (&self) -> bool { self.lock().closed }

    pub fn stats (&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load( Ordering::Relaxed),
            misses: self.misses.load( Ordering::Relaxed),
            coalesced: self.coalesced.load( Ordering::Relaxed),
            evictions: self.evictions.load( Ordering::Relaxed),
        }
    }
}
