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

use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, timeout};
use lfm_common::{datetime::millis, rate_limit::RateLimiter};

#[tokio::test]
async fn test_first_call_does_not_wait() {
    let limiter = RateLimiter::<&'static str>::new();
    let t0 = Instant::now();
    limiter.acquire( "states", Duration::from_secs(10)).await;
    let dt = t0.elapsed();
    println!("first acquire took {dt:?}");
    assert!( dt < millis(50));
}

#[tokio::test]
async fn test_concurrent_acquire_is_serialized() {
    let limiter = Arc::new( RateLimiter::<&'static str>::new());
    let window = millis(200);

    let l1 = limiter.clone();
    let h1 = tokio::spawn( async move { l1.acquire( "states", window).await; Instant::now() });
    let l2 = limiter.clone();
    let h2 = tokio::spawn( async move { l2.acquire( "states", window).await; Instant::now() });

    let t1 = h1.await.unwrap();
    let t2 = h2.await.unwrap();
    let (first, second) = if t1 <= t2 { (t1,t2) } else { (t2,t1) };
    let dt = second.duration_since( first);
    println!("completion difference: {dt:?}");

    assert!( dt >= window);
}

#[tokio::test]
async fn test_sequential_calls_wait_remaining_window() {
    let limiter = RateLimiter::new();
    limiter.acquire( 1u8, millis(150)).await;
    let t0 = Instant::now();
    limiter.acquire( 1u8, millis(150)).await;
    let dt = t0.elapsed();
    println!("second acquire waited {dt:?}");
    assert!( dt >= millis(100));
}

#[tokio::test]
async fn test_keys_are_independent() {
    let limiter = RateLimiter::<&'static str>::new();
    limiter.acquire( "states", Duration::from_secs(5)).await;

    let t0 = Instant::now();
    limiter.acquire( "tracks", Duration::from_secs(5)).await;
    println!("other key took {:?}", t0.elapsed());
    assert!( t0.elapsed() < millis(50));
}

#[tokio::test]
async fn test_window_is_per_call() {
    let limiter = RateLimiter::<&'static str>::new();
    limiter.acquire( "states", Duration::from_secs(10)).await;

    // a smaller window (e.g. for an authenticated caller) applies to this call only
    let t0 = Instant::now();
    limiter.acquire( "states", millis(50)).await;
    let dt = t0.elapsed();
    println!("small window wait {dt:?}");
    assert!( dt < Duration::from_secs(1));
}

#[tokio::test]
async fn test_cancelled_wait_releases_key() {
    let limiter = RateLimiter::<&'static str>::new();
    limiter.acquire( "states", Duration::from_secs(1)).await;

    // abort a pending wait, this must not leave the key locked or record an invocation
    let res = timeout( millis(50), limiter.acquire( "states", Duration::from_secs(1))).await;
    assert!( res.is_err());

    let t0 = Instant::now();
    limiter.acquire( "states", millis(300)).await;
    println!("after cancellation took {:?}", t0.elapsed());
    assert!( t0.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_last_invocation_and_reset() {
    let limiter = RateLimiter::<&'static str>::new();
    assert!( limiter.last_invocation( &"flights").await.is_none());

    limiter.acquire( "flights", millis(100)).await;
    assert!( limiter.last_invocation( &"flights").await.is_some());
    assert!( limiter.last_invocation( &"tracks").await.is_none());

    limiter.reset();
    assert!( limiter.last_invocation( &"flights").await.is_none());
}
