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

//! Vehicle listing feed model and display formatting.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

/// Top-level feed document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingFeed {
    pub listings: Vec<Listing>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Listing {
    pub current_price: i64,
    pub dealer: DealerInfo,
    pub images: Images,
    pub make: String,
    pub mileage: i64,
    pub model: String,
    pub trim: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DealerInfo {
    pub address: String,
    pub city: String,
    pub name: String,
    pub phone: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Images {
    pub first_photo: FirstPhotos,
}

/// Photo URLs at three sizes; the grid uses `large`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirstPhotos {
    pub large: String,
    #[allow(
        dead_code,
        reason = "decoded for completeness; the grid shows the large photo"
    )]
    pub medium: String,
    #[allow(
        dead_code,
        reason = "decoded for completeness; the grid shows the large photo"
    )]
    pub small: String,
}

impl Listing {
    /// Year, make, model and trim, skipping whatever is missing
    pub fn ymmt(&self) -> String {
        let year = if self.year <= 0 {
            String::new()
        } else {
            self.year.to_string()
        };

        [
            year.as_str(),
            self.make.as_str(),
            self.model.as_str(),
            self.trim.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn price_string(&self) -> String {
        format!("${}", with_thousands_separator(self.current_price.max(0)))
    }

    pub fn mileage_string(&self) -> String {
        format!("{} mi", with_thousands_separator(self.mileage.max(0)))
    }

    pub fn photo_url(&self) -> &str {
        &self.images.first_photo.large
    }
}

impl DealerInfo {
    /// "City, ST 12345", or empty when any part is missing
    pub fn city_state_zip(&self) -> String {
        if self.city.is_empty() || self.state.is_empty() || self.zip.is_empty() {
            return String::new();
        }
        format!("{}, {} {}", self.city, self.state, self.zip)
    }

    /// Digits of the phone number, or `None` when there is nothing to dial
    /// (an empty phone, or one like "N/A" with no digits at all)
    pub fn dialable_phone(&self) -> Option<String> {
        let digits: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        (!digits.is_empty()).then_some(digits)
    }
}

/// Format an integer with a comma every three digits
pub fn with_thousands_separator(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}

/// Put listings in display order: feed order, or shuffled when asked
pub fn display_order<R>(mut listings: Vec<Listing>, shuffle: bool, rng: &mut R) -> Vec<Listing>
where
    R: Rng + ?Sized,
{
    if shuffle {
        listings.shuffle(rng);
    }
    listings
}

/// Heading shown above the grid
pub fn navigation_title(count: usize) -> String {
    match count {
        0 => "Listings Near You".to_string(),
        1 => "1 Listing Near You".to_string(),
        n => {
            let n = i64::try_from(n).unwrap_or(i64::MAX);
            format!("{} Listings Near You", with_thousands_separator(n))
        }
    }
}
