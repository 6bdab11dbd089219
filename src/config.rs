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

//! Application configuration management.
//!
//! Persistent settings are stored as TOML through `confy`: where the listing
//! feed lives, the preferred cell geometry the grid is sized from, and how
//! photos are fetched.

use grid_core::layout::{
    LayoutConfig, DEFAULT_CELL_HEIGHT, DEFAULT_CELL_WIDTH, DEFAULT_MINIMUM_SPACING,
    DEFAULT_REQUESTED_SPACING,
};
use log::info;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "listing-grid";
const CONFIG_NAME: &str = "config";

/// Default listing feed
pub const DEFAULT_FEED_URL: &str = "https://carfax-for-consumers.firebaseio.com/assignment.json";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default)]
    pub config_version: u32,

    /// URL of the listing feed JSON document
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Preferred cell width in points
    #[serde(default = "default_cell_width")]
    pub preferred_cell_width: f64,

    /// Preferred cell height in points (with the width, fixes the aspect ratio)
    #[serde(default = "default_cell_height")]
    pub preferred_cell_height: f64,

    /// Smallest spacing between and around cells
    #[serde(default = "default_minimum_spacing")]
    pub minimum_spacing: f64,

    /// Spacing used when it does not cost a column
    #[serde(default = "default_requested_spacing")]
    pub requested_spacing: f64,

    /// Spacing for viewports too narrow for a full cell
    #[serde(default = "default_minimum_spacing")]
    pub fallback_spacing: f64,

    /// Timeout for feed and photo requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Number of threads prefetching photos
    #[serde(default = "default_prefetch_workers")]
    pub prefetch_workers: usize,

    /// Show listings in random order instead of feed order
    #[serde(default)]
    pub shuffle_listings: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1 // Current schema version
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_cell_width() -> f64 {
    DEFAULT_CELL_WIDTH
}

fn default_cell_height() -> f64 {
    DEFAULT_CELL_HEIGHT
}

fn default_minimum_spacing() -> f64 {
    DEFAULT_MINIMUM_SPACING
}

fn default_requested_spacing() -> f64 {
    DEFAULT_REQUESTED_SPACING
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_prefetch_workers() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            feed_url: default_feed_url(),
            preferred_cell_width: default_cell_width(),
            preferred_cell_height: default_cell_height(),
            minimum_spacing: default_minimum_spacing(),
            requested_spacing: default_requested_spacing(),
            fallback_spacing: default_minimum_spacing(),
            request_timeout_secs: default_request_timeout_secs(),
            prefetch_workers: default_prefetch_workers(),
            shuffle_listings: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, stamping older files with the current version
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;

        // Missing fields were filled from serde defaults; persist them
        if config.config_version < default_config_version() {
            let upgraded = config.upgraded();
            upgraded.save()?;
            info!(
                "Configuration upgraded to version {}",
                upgraded.config_version
            );
            return Ok(upgraded);
        }

        Ok(config)
    }

    fn upgraded(self) -> Self {
        Self {
            config_version: default_config_version(),
            ..self
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Sizing configuration for the grid layout
    pub fn layout_config(&self) -> LayoutConfig {
        let mut spacing_candidates = vec![self.minimum_spacing, self.requested_spacing];
        spacing_candidates.sort_by(f64::total_cmp);
        LayoutConfig {
            preferred_cell_width: self.preferred_cell_width,
            preferred_cell_height: self.preferred_cell_height,
            spacing_candidates,
            fallback_spacing: self.fallback_spacing,
        }
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
