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

use chrono::Utc;
use std::time::Duration;

// Duration ctor wrappers that read better in config defaults and tests
#[inline] pub const fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub const fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub const fn days (n: u64)->Duration { Duration::from_secs(n * 86400) }

/// seconds since the unix epoch, which is what most flight data APIs use as timestamps
#[inline]
pub fn epoch_secs ()->i64 {
    Utc::now().timestamp()
}

/// is the epoch seconds timestamp `t` more than `age` before now
pub fn is_older_than (t: i64, age: Duration) -> bool {
    epoch_secs() - t > age.as_secs() as i64
}
