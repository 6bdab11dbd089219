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

//! Text rendering of the listing grid.
//!
//! Lays listings out in rows using the geometry from the layout sizer, warms
//! the photo cache with a small pool of worker threads, and falls back to a
//! placeholder whenever a photo is missing or undecodable.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use grid_core::{Fetch, ResourceCache, SizingResult};
use log::debug;

use crate::listing::{navigation_title, with_thousands_separator, Listing};

/// Text shown in place of a missing photo
pub const PHOTO_PLACEHOLDER: &str = "Photo not available";

/// What a cell can show for its photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoStatus {
    Loaded { width: u32, height: u32, bytes: usize },
    Unavailable,
}

/// Decode cached photo bytes far enough to know what will be displayed
pub fn describe_photo(payload: Option<&[u8]>) -> PhotoStatus {
    let Some(bytes) = payload else {
        return PhotoStatus::Unavailable;
    };

    match image::load_from_memory(bytes) {
        Ok(image) => PhotoStatus::Loaded {
            width: image.width(),
            height: image.height(),
            bytes: bytes.len(),
        },
        Err(e) => {
            debug!("Cached photo could not be decoded: {}", e);
            PhotoStatus::Unavailable
        }
    }
}

/// Renders listings as a grid, pulling photos through a shared cache
#[derive(Debug)]
pub struct GridRenderer<F> {
    cache: ResourceCache,
    fetcher: F,
    workers: usize,
}

impl<F> GridRenderer<F>
where
    F: Fetch + Sync,
{
    pub fn new(cache: ResourceCache, fetcher: F, workers: usize) -> Self {
        Self {
            cache,
            fetcher,
            workers: workers.max(1),
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Fetch every distinct photo once, spread across the worker pool
    pub fn prefetch(&self, listings: &[Listing]) {
        let mut urls: Vec<&str> = listings.iter().map(Listing::photo_url).collect();
        urls.sort_unstable();
        urls.dedup();

        let workers = self.workers.min(urls.len());
        if workers == 0 {
            return;
        }
        debug!("Prefetching {} photos on {} workers", urls.len(), workers);

        let next = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| loop {
                    let Some(url) = urls.get(next.fetch_add(1, Ordering::Relaxed)) else {
                        break;
                    };
                    self.cache.get_with(url, &self.fetcher);
                });
            }
        });
    }

    /// Write the grid for one layout pass
    pub fn write_grid<W: Write>(
        &self,
        out: &mut W,
        listings: &[Listing],
        viewport_width: f64,
        sizing: &SizingResult,
    ) -> io::Result<()> {
        writeln!(out, "{}", navigation_title(listings.len()))?;

        let insets = sizing.section_insets();
        write!(out, "Viewport {viewport_width:.0} pt: ")?;
        if sizing.is_degraded() {
            writeln!(
                out,
                "too narrow for a full cell, one {:.1} x {:.1} cell per row, inset {:.1}",
                sizing.cell_size.width, sizing.cell_size.height, insets.left
            )?;
        } else {
            writeln!(
                out,
                "{} column(s) of {:.1} x {:.1}, spacing {:.1}, inset {:.1}",
                sizing.column_count,
                sizing.cell_size.width,
                sizing.cell_size.height,
                sizing.line_spacing(),
                insets.left
            )?;
        }
        writeln!(
            out,
            "Content height {:.1} pt over {} row(s)",
            sizing.content_height(listings.len()),
            sizing.row_count(listings.len())
        )?;

        let per_row = sizing.cells_per_row() as usize;
        for (row, cells) in listings.chunks(per_row).enumerate() {
            writeln!(out)?;
            writeln!(out, "Row {}", row + 1)?;
            for (column, listing) in cells.iter().enumerate() {
                self.write_cell(out, row * per_row + column + 1, listing)?;
            }
        }

        Ok(())
    }

    fn write_cell<W: Write>(&self, out: &mut W, index: usize, listing: &Listing) -> io::Result<()> {
        let title = listing.ymmt();
        let title = if title.is_empty() {
            "Unknown vehicle"
        } else {
            title.as_str()
        };
        writeln!(
            out,
            "  [{index}] {title} | {} | {}",
            listing.price_string(),
            listing.mileage_string()
        )?;

        let dealer = &listing.dealer;
        let location: Vec<String> = [
            dealer.name.clone(),
            dealer.address.clone(),
            dealer.city_state_zip(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
        if !location.is_empty() {
            writeln!(out, "      {}", location.join(", "))?;
        }

        let payload = self.cache.get_with(listing.photo_url(), &self.fetcher);
        match describe_photo(payload.as_deref()) {
            PhotoStatus::Loaded { width, height, bytes } => {
                let bytes = i64::try_from(bytes).unwrap_or(i64::MAX);
                writeln!(
                    out,
                    "      Photo: {width}x{height} ({} bytes)",
                    with_thousands_separator(bytes)
                )?;
            }
            PhotoStatus::Unavailable => writeln!(out, "      {PHOTO_PLACEHOLDER}")?,
        }

        match dealer.dialable_phone() {
            Some(phone) => writeln!(out, "      Call dealer: {phone}"),
            None => writeln!(out, "      Call dealer: unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::{FetchError, LayoutConfig, LayoutSizer};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct FakeFetcher {
        png: Vec<u8>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            let mut png = Vec::new();
            image::RgbImage::new(4, 3)
                .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                .unwrap();
            Self {
                png,
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    impl Fetch for FakeFetcher {
        fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
            let mut calls = self.calls.lock().unwrap();
            *calls.entry(locator.to_string()).or_default() += 1;
            if locator.contains("good") {
                Ok(self.png.clone())
            } else if locator.contains("garbage") {
                Ok(b"not an image".to_vec())
            } else {
                Err(FetchError::Status(404))
            }
        }
    }

    fn listing(make: &str, photo: &str) -> Listing {
        let mut listing = Listing {
            year: 2020,
            make: make.to_string(),
            current_price: 21_500,
            mileage: 12_000,
            ..Listing::default()
        };
        listing.images.first_photo.large = photo.to_string();
        listing.dealer.name = "Sample Motors".to_string();
        listing.dealer.phone = "555-0100".to_string();
        listing
    }

    fn render(renderer: &GridRenderer<FakeFetcher>, listings: &[Listing], width: f64) -> String {
        let mut sizer = LayoutSizer::new(LayoutConfig::default()).unwrap();
        let sizing = sizer.get_sizing(width);
        let mut out = Vec::new();
        renderer.write_grid(&mut out, listings, width, &sizing).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_describe_photo() {
        let fetcher = FakeFetcher::new();
        assert_eq!(
            describe_photo(Some(&fetcher.png)),
            PhotoStatus::Loaded {
                width: 4,
                height: 3,
                bytes: fetcher.png.len()
            }
        );
        assert_eq!(describe_photo(Some(b"nope")), PhotoStatus::Unavailable);
        assert_eq!(describe_photo(None), PhotoStatus::Unavailable);
    }

    #[test]
    fn test_prefetch_fetches_each_url_once() {
        let renderer = GridRenderer::new(ResourceCache::new(), FakeFetcher::new(), 4);
        let listings = vec![
            listing("Honda", "http://good/1.jpg"),
            listing("Toyota", "http://good/1.jpg"),
            listing("Ford", "http://bad/2.jpg"),
            listing("Kia", ""),
        ];

        renderer.prefetch(&listings);
        renderer.prefetch(&listings);
        render(&renderer, &listings, 800.0);

        assert_eq!(renderer.fetcher.calls_for("http://good/1.jpg"), 1);
        assert_eq!(renderer.fetcher.calls_for("http://bad/2.jpg"), 1);
        assert_eq!(renderer.fetcher.calls_for(""), 0);
        assert_eq!(renderer.cache().resolved_count(), 1);
        assert_eq!(renderer.cache().failed_count(), 2);
    }

    #[test]
    fn test_rows_follow_column_count() {
        let renderer = GridRenderer::new(ResourceCache::new(), FakeFetcher::new(), 2);
        let listings = vec![
            listing("Honda", "http://good/1.jpg"),
            listing("Toyota", "http://bad/2.jpg"),
            listing("Ford", "http://garbage/3.jpg"),
        ];

        let text = render(&renderer, &listings, 800.0);
        assert!(text.starts_with("3 Listings Near You\n"));
        assert!(text.contains("2 column(s) of 376.0 x 386.5, spacing 16.0, inset 16.0"));
        assert!(text.contains("Row 2\n  [3] 2020 Ford"));
        assert!(!text.contains("Row 3"));
        assert!(text.contains("Photo: 4x3"));
        assert_eq!(text.matches(PHOTO_PLACEHOLDER).count(), 2);
        assert!(text.contains("Call dealer: 5550100"));
    }

    #[test]
    fn test_degraded_layout_one_cell_per_row() {
        let renderer = GridRenderer::new(ResourceCache::new(), FakeFetcher::new(), 1);
        let listings = vec![
            listing("Honda", "http://good/1.jpg"),
            listing("Toyota", "http://good/2.jpg"),
        ];

        let text = render(&renderer, &listings, 100.0);
        assert!(text.contains("too narrow for a full cell, one 84.0 x 368.0 cell per row"));
        assert!(text.contains("Row 2\n  [2] 2020 Toyota"));
    }

    #[test]
    fn test_empty_listing_renders_placeholders() {
        let renderer = GridRenderer::new(ResourceCache::new(), FakeFetcher::new(), 1);
        let text = render(&renderer, &[Listing::default()], 800.0);
        assert!(text.starts_with("1 Listing Near You\n"));
        assert!(text.contains("[1] Unknown vehicle | $0 | 0 mi"));
        assert!(text.contains(PHOTO_PLACEHOLDER));
        assert!(text.contains("Call dealer: unavailable"));
    }
}
