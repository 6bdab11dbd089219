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

//! Building blocks for rendering a scrollable grid of remote listings.
//!
//! Two independent layers, usable on their own or together:
//!
//! - **Layout layer**: picks cell size, spacing and column count for a
//!   viewport width, memoizing the last answer
//! - **Cache layer**: fetches remote payloads (photos) at most once per
//!   locator and remembers failures as well as successes
//!
//! # Layout
//!
//! ```
//! use grid_core::{LayoutConfig, LayoutSizer};
//!
//! let mut sizer = LayoutSizer::new(LayoutConfig::default()).unwrap();
//! let sizing = sizer.get_sizing(800.0);
//! assert_eq!(sizing.column_count, 2);
//! assert_eq!(sizing.spacing, 16.0);
//! ```
//!
//! # Cache
//!
//! ```
//! use grid_core::{FetchError, ResourceCache};
//!
//! let cache = ResourceCache::new();
//! let photo = cache.get("https://example.com/car.jpg", |_| Ok(vec![0xFF, 0xD8, 0xFF]));
//! assert_eq!(photo.as_deref(), Some(&[0xFF, 0xD8, 0xFF][..]));
//!
//! let missing = cache.get("https://example.com/gone.jpg", |_| Err(FetchError::Status(404)));
//! assert!(missing.is_none());
//! ```

pub mod cache;
pub mod layout;

pub use cache::{EntryState, Fetch, FetchError, Payload, ResourceCache};
pub use layout::{
    compute_sizing, CellSize, EdgeInsets, LayoutConfig, LayoutSizer, SizingError, SizingRequest,
    SizingResult,
};
