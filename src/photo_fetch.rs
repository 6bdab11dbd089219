// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Blocking HTTP fetcher for listing photos.
//!
//! Plugs into [`grid_core::ResourceCache`] as its fetch capability. Every
//! failure mode (bad URL, transport error, HTTP error, empty body) comes back
//! as a [`FetchError`] and the cache records it as permanent.

use std::time::Duration;

use grid_core::{Fetch, FetchError};
use log::debug;
use reqwest::Url;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

/// Parse a locator, accepting only http(s) URLs
pub fn parse_locator(locator: &str) -> Result<Url, FetchError> {
    let url = Url::parse(locator)
        .map_err(|e| FetchError::InvalidLocator(format!("{locator}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidLocator(format!(
            "{locator}: unsupported scheme '{other}'"
        ))),
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        let url = parse_locator(locator)?;

        debug!("Downloading photo: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyPayload);
        }

        Ok(bytes.to_vec())
    }
}
