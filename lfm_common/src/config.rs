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

///! RON config file support

use std::{fs, path::Path};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::define_error;

define_error!{ pub ConfigError =
    IOError(#[from] std::io::Error) : "config IO error: {0}",
    ParseError(#[from] ron::error::SpannedError) : "config parse error: {0}"
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub fn load_config<C> (path: impl AsRef<Path>) -> Result<C> where C: DeserializeOwned {
    let path = path.as_ref();
    let input = fs::read_to_string( path)?;
    let config = config_from_str( &input)?;
    info!( path = %path.display(), "loaded config");
    Ok(config)
}

pub fn config_from_str<C> (input: &str) -> Result<C> where C: DeserializeOwned {
    Ok( ron::from_str( input)? )
}

/// if the environment variable `var` is set and not empty, return its value, otherwise the given default
pub fn env_override (var: &str, default: Option<String>) -> Option<String> {
    match std::env::var( var) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => default
    }
}
