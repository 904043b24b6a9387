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

 use thiserror::Error;
 use lfm_common::{geo::GeoError, net::NetError, config::ConfigError};

 pub type Result<T> = std::result::Result<T,LfmAdsbError>;


#[derive(Error,Debug)]
pub enum LfmAdsbError {

    /// bad input detected before any network call, not worth retrying
    #[error("invalid request: {0}")]
    ValidationError(String),

    #[error("invalid geometry: {0}")]
    GeoError( #[from] GeoError),

    #[error("network error: {0}")]
    NetError( #[from] NetError),

    #[error("http error: {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError( #[from] ConfigError),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("not authorized: {0}")]
    AuthError(String),

    #[error("parse error {0}")]
    ParseError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl LfmAdsbError {
    /// is this a "bad input" condition the caller should reject instead of retry
    pub fn is_validation (&self) -> bool {
        matches!( self, LfmAdsbError::ValidationError(_) | LfmAdsbError::GeoError(_))
    }
}

macro_rules! validation_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::LfmAdsbError::ValidationError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use validation_error;

macro_rules! parse_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::LfmAdsbError::ParseError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use parse_error;

pub fn op_failed (msg: impl ToString) -> LfmAdsbError {
    LfmAdsbError::OpFailedError( msg.to_string())
}
