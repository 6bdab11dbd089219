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

//! Client for the remote listing feed.

use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::listing::ListingFeed;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to reach listing feed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("listing feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("unable to decode listing feed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Pulls the listing feed document over HTTP.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(client, url))
    }

    /// Use an already configured HTTP client
    pub fn with_client(client: reqwest::blocking::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch and decode the current listings
    pub fn pull_listings(&self) -> Result<ListingFeed, FeedError> {
        debug!("Requesting listing feed from {}", self.url);
        let response = self.client.get(&self.url).send()?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let body = response.bytes()?;
        let feed = decode_feed(&body)?;
        info!("Loaded {} listings from {}", feed.listings.len(), self.url);
        Ok(feed)
    }
}

/// Decode a feed document; kept separate from the transport so it can be
/// exercised without a server.
pub fn decode_feed(body: &[u8]) -> Result<ListingFeed, FeedError> {
    Ok(serde_json::from_slice(body)?)
}
