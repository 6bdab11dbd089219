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

mod config;
mod feed_client;
mod grid_view;
mod listing;
mod photo_fetch;

use std::io::{self, Write};

use clap::Parser;
use env_logger::Env;
use grid_core::{LayoutSizer, ResourceCache};
use log::{info, warn};

use config::AppConfig;
use feed_client::FeedClient;
use grid_view::GridRenderer;
use listing::display_order;
use photo_fetch::HttpFetcher;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Browse a vehicle listing feed as an adaptive grid
#[derive(Parser, Debug)]
#[command(name = "listing-grid", version, about)]
struct Cli {
    /// Listing feed URL (overrides the configured one)
    #[arg(long)]
    feed_url: Option<String>,

    /// Viewport width in points; repeat to replay a sequence of resizes
    #[arg(short, long = "width", default_values_t = [800.0])]
    widths: Vec<f64>,

    /// Number of photo prefetch threads
    #[arg(long)]
    workers: Option<usize>,

    /// Show listings in random order
    #[arg(long)]
    shuffle: bool,

    /// Print the configuration file path and exit
    #[arg(long)]
    config_path: bool,

    /// Persist the effective configuration (including overrides)
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let env = Env::default().default_filter_or(default_filter);
    env_logger::Builder::from_env(env).init();

    if cli.config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    if let Some(url) = cli.feed_url {
        config.feed_url = url;
    }
    if let Some(workers) = cli.workers {
        config.prefetch_workers = workers;
    }
    if cli.shuffle {
        config.shuffle_listings = true;
    }
    if cli.save_config {
        config.save()?;
        info!(
            "Configuration saved to {}",
            AppConfig::get_config_path()?.display()
        );
    }

    let mut sizer = LayoutSizer::new(config.layout_config())?;

    let client = FeedClient::new(&config.feed_url, config.request_timeout())?;
    let listings = display_order(
        client.pull_listings()?.listings,
        config.shuffle_listings,
        &mut rand::thread_rng(),
    );

    let renderer = GridRenderer::new(
        ResourceCache::new(),
        HttpFetcher::new(config.request_timeout())?,
        config.prefetch_workers,
    );
    renderer.prefetch(&listings);

    let mut out = io::stdout().lock();
    for (pass, &width) in cli.widths.iter().enumerate() {
        if pass > 0 {
            writeln!(out)?;
        }
        let sizing = sizer.get_sizing(width);
        renderer.write_grid(&mut out, &listings, width, &sizing)?;
    }
    out.flush()?;

    let cache = renderer.cache();
    info!(
        "{} layout pass(es), {} sizing computation(s); {} photo(s) cached, {} unavailable",
        cli.widths.len(),
        sizer.computations(),
        cache.resolved_count(),
        cache.failed_count()
    );

    Ok(())
}
