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

use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
use futures::future::join_all;
use tokio::time::sleep;
use lfm_common::{cache::{CachePolicy, ShortLivedCache}, datetime::millis};

type Res<T> = Result<T,String>;

async fn lookup (calls: &AtomicUsize, key: u32) -> Res<String> {
    calls.fetch_add( 1, Ordering::SeqCst);
    sleep( millis(20)).await;
    Ok( format!("value-{key}"))
}

#[tokio::test]
async fn test_hit_does_not_recompute() {
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", 10);
    let calls = AtomicUsize::new(0);

    let v1 = cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    let v2 = cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();

    println!("v1={v1}, v2={v2}, stats={:?}", cache.stats());
    assert_eq!( v1, v2);
    assert_eq!( calls.load( Ordering::SeqCst), 1);
    assert_eq!( cache.stats().hits, 1);
}

#[tokio::test]
async fn test_lru_eviction() {
    let n = 3;
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", n);
    let calls = AtomicUsize::new(0);

    for k in 0..n as u32 {
        cache.get_or_try_insert_with( k, || lookup( &calls, k)).await.unwrap();
    }
    // touch 0 so that 1 becomes the least recently used key
    cache.get_or_try_insert_with( 0, || lookup( &calls, 0)).await.unwrap();
    cache.get_or_try_insert_with( 99, || lookup( &calls, 99)).await.unwrap();

    println!("len={}, stats={:?}", cache.len(), cache.stats());
    assert_eq!( cache.len(), n);
    assert!( cache.peek( &1).is_none());
    assert!( cache.peek( &0).is_some());
    assert_eq!( calls.load( Ordering::SeqCst), 4);

    // evicted key triggers a fresh computation
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    assert_eq!( calls.load( Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_concurrent_calls_are_coalesced() {
    let cache = Arc::new( ShortLivedCache::<u32,String>::with_max_entries( "test", 10));
    let calls = Arc::new( AtomicUsize::new(0));

    let futs = (0..8).map( |_| {
        let cache = cache.clone();
        let calls = calls.clone();
        async move { cache.get_or_try_insert_with( 7, || lookup( &calls, 7)).await }
    });
    let results = join_all( futs).await;

    println!("results: {results:?}, stats={:?}", cache.stats());
    assert!( results.iter().all( |r| r.as_deref() == Ok("value-7")));
    assert_eq!( calls.load( Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", 10);
    let calls = AtomicUsize::new(0);

    let res = cache.get_or_try_insert_with( 1, || async {
        calls.fetch_add( 1, Ordering::SeqCst);
        Err::<String,String>( "upstream failure".to_string())
    }).await;
    println!("first: {res:?}");
    assert!( res.is_err());

    let res = cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await;
    println!("second: {res:?}");
    assert_eq!( res.as_deref(), Ok("value-1"));
    assert_eq!( calls.load( Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_ttl_expiry() {
    let cache = ShortLivedCache::<u32,String>::new( "test", CachePolicy::TimeToLive( millis(100)));
    let calls = AtomicUsize::new(0);

    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    assert_eq!( calls.load( Ordering::SeqCst), 1);

    sleep( millis(150)).await;
    assert!( cache.peek( &1).is_none());
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    println!("stats={:?}", cache.stats());
    assert_eq!( calls.load( Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_and_close() {
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", 10);
    let calls = AtomicUsize::new(0);

    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    cache.clear();
    assert!( cache.is_empty());
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    assert_eq!( calls.load( Ordering::SeqCst), 2);

    cache.close();
    cache.close();
    assert!( cache.is_closed());
    assert!( cache.is_empty());

    // closed caches pass calls through
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    assert_eq!( calls.load( Ordering::SeqCst), 4);
    assert!( cache.is_empty());
}

#[tokio::test]
async fn test_invalidate_forces_recompute() {
    let calls = AtomicUsize::new(0);
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", 8);

    let v = cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    assert_eq!( v, "value-1");
    assert_eq!( cache.peek( &1).as_deref(), Some("value-1"));

    cache.invalidate( &1);
    assert!( cache.peek( &1).is_none());

    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();
    assert_eq!( calls.load( Ordering::SeqCst), 2);
}

async fn failing_lookup (calls: &AtomicUsize, key: u32) -> Res<String> {
    calls.fetch_add( 1, Ordering::SeqCst);
    sleep( millis(5)).await;
    Err( format!("lookup of {key} failed"))
}

#[tokio::test]
async fn test_failures_do_not_evict_values() {
    let calls = AtomicUsize::new(0);
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", 3);

    for k in 1..=3 { cache.get_or_try_insert_with( k, || lookup( &calls, k)).await.unwrap(); }
    for k in 10..=12 { assert!( cache.get_or_try_insert_with( k, || failing_lookup( &calls, k)).await.is_err()); }

    let valid = (1..=3).filter( |k| cache.peek( k).is_some()).count();
    println!("valid entries after failed lookups: {valid}, len: {}, stats: {:?}", cache.len(), cache.stats());
    assert_eq!( valid, 3);
    assert_eq!( cache.len(), 3);
    assert_eq!( cache.stats().evictions, 0);
}

#[tokio::test]
async fn test_retry_after_failure_is_a_miss() {
    let calls = AtomicUsize::new(0);
    let cache = ShortLivedCache::<u32,String>::with_max_entries( "test", 8);

    assert!( cache.get_or_try_insert_with( 1, || failing_lookup( &calls, 1)).await.is_err());
    assert!( cache.is_empty());
    cache.get_or_try_insert_with( 1, || lookup( &calls, 1)).await.unwrap();

    let stats = cache.stats();
    assert_eq!( stats.misses, 2);
    assert_eq!( stats.coalesced, 0);
    assert_eq!( calls.load( Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_ttl_sweep_drops_failed_keys() {
    let calls = AtomicUsize::new(0);
    let cache = ShortLivedCache::<u32,String>::with_ttl( "test", millis(10));

    for k in 0..100 { assert!( cache.get_or_try_insert_with( k, || failing_lookup( &calls, k)).await.is_err()); }
    assert!( cache.len() <= 1);

    sleep( millis(50)).await;
    cache.get_or_try_insert_with( 1000, || lookup( &calls, 1000)).await.unwrap();
    sleep( millis(50)).await;
    cache.get_or_try_insert_with( 1001, || lookup( &calls, 1001)).await.unwrap();

    println!("len after ttl sweep: {}", cache.len());
    assert!( cache.len() <= 2);
}
