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

///! common utility functions for JSON web API access

use std::time::Duration;
use reqwest::{header::{HeaderMap,HeaderName,HeaderValue,ACCEPT}, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned,Serialize,Deserialize};
use tracing::{debug,trace};

use crate::{define_error, datetime::secs};

define_error!{ pub NetError =
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    StatusError(StatusCode,String) : "response status {0} for {1}",
    JsonError(#[from] serde_json::Error) : "JSON error: {0}",
    HeaderError(String) : "invalid header: {0}"
}

pub type Result<T> = std::result::Result<T, NetError>;

/// timeouts for upstream HTTP calls. These are independent of any rate limit windows
#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig { connect_timeout: secs(30), timeout: secs(60), user_agent: None }
    }
}

pub fn build_client (config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout( config.connect_timeout)
        .timeout( config.timeout);

    if let Some(ua) = &config.user_agent {
        builder = builder.user_agent( ua.as_str());
    }

    Ok( builder.build()? )
}

pub fn get_headermap<K,V> (headers: impl IntoIterator<Item=(K,V)>) -> Result<HeaderMap> where K: AsRef<str>, V: AsRef<str> {
    let mut hm = HeaderMap::new();
    for (k,v) in headers {
        let k = k.as_ref().trim();
        hm.append(
            HeaderName::from_bytes( k.as_bytes()).map_err(|e| NetError::HeaderError(format!("{k}: {e}")))?,
            HeaderValue::from_str( v.as_ref().trim()).map_err(|e| NetError::HeaderError(format!("{k}: {e}")))?
        );
    }
    Ok(hm)
}

/// concatenate base url and path without doubling or dropping the '/' separator
pub fn join_url (base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// send request and parse JSON response. A 404 or an empty body is not an error but `Ok(None)`,
/// any other non-success status is reported as `NetError::StatusError`
pub async fn get_optional_json<T> (req: RequestBuilder) -> Result<Option<T>> where T: DeserializeOwned {
    let response = req.header( ACCEPT, "application/json").send().await?;
    let url = response.url().to_string();

    match response.status() {
        StatusCode::NOT_FOUND => {
            debug!( url = %url, "not found");
            Ok(None)
        }
        status if status.is_success() => {
            let bytes = response.bytes().await?;
            if bytes.iter().all( |b| b.is_ascii_whitespace()) {
                debug!( url = %url, "empty response");
                Ok(None)
            } else {
                trace!( url = %url, len=bytes.len(), "got response");
                Ok( Some( serde_json::from_slice(&bytes)? ))
            }
        }
        other => {
            Err( NetError::StatusError( other, url))
        }
    }
}
