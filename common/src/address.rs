// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::position::PositionSample;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};
use url::form_urlencoded;

/// Query parameter that carries the latitude of the latest sample.
pub const LATITUDE_PARAM: &str = "lat";

/// Query parameter that carries the longitude of the latest sample.
pub const LONGITUDE_PARAM: &str = "lon";

/// Ordered list of query parameters of a page address.
///
/// Parsing and serialization follow the `application/x-www-form-urlencoded`
/// rules, so `+` decodes to a space and reserved characters are
/// percent-encoded when the query is rendered again. Duplicate names are
/// kept in their original order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        QueryParams::default()
    }

    /// Parses a query string. A leading `?` is ignored, empty segments are
    /// skipped.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        QueryParams {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect(),
        }
    }

    /// Returns the value of the first parameter with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(n, _)| n == name)
    }

    /// Sets the value of a parameter.
    ///
    /// The first parameter with the given name keeps its position and gets the
    /// new value, later parameters with the same name are removed. If the
    /// name is not present, the parameter is appended.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(n, _)| n == name) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut position = 0;
                self.pairs.retain(|(n, _)| {
                    let keep = position <= index || n != name;
                    position += 1;
                    keep
                });
            }
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.pairs.push((name.to_string(), value.into()));
    }

    /// Removes every parameter with the given name.
    pub fn remove(&mut self, name: &str) {
        self.pairs.retain(|(n, _)| n != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        f.write_str(&encoded)
    }
}

/// The address of the current page: path, query parameters and fragment.
///
/// Only the query is ever rewritten, path and fragment are carried through
/// unchanged.
///
/// # Example
///
/// ```rust
/// use common::address::PageAddress;
///
/// let address = PageAddress::parse("/track?foo=bar#map");
/// assert_eq!(address.path(), "/track");
/// assert_eq!(address.query().get("foo"), Some("bar"));
/// assert_eq!(address.to_string(), "/track?foo=bar#map");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAddress {
    path: String,
    query: QueryParams,
    fragment: Option<String>,
}

impl PageAddress {
    pub fn new(path: &str, query: QueryParams, fragment: Option<&str>) -> Self {
        PageAddress {
            path: if path.is_empty() { "/" } else { path }.to_string(),
            query,
            fragment: fragment.map(str::to_string),
        }
    }

    /// Splits a relative address of the form `path?query#fragment`.
    pub fn parse(address: &str) -> Self {
        let (rest, fragment) = match address.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (address, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, QueryParams::parse(query)),
            None => (rest, QueryParams::new()),
        };
        PageAddress::new(path, query, fragment)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryParams {
        &mut self.query
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Writes the coordinates of `sample` into the `lat` and `lon` parameters.
    pub fn set_position(&mut self, sample: &PositionSample) {
        self.query
            .set(LATITUDE_PARAM, format_coordinate(sample.latitude()));
        self.query
            .set(LONGITUDE_PARAM, format_coordinate(sample.longitude()));
    }
}

impl Default for PageAddress {
    fn default() -> Self {
        PageAddress::parse("/")
    }
}

impl FromStr for PageAddress {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PageAddress::parse(s))
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Renders a coordinate the way a browser stringifies a number.
///
/// Uses the shortest decimal representation that round-trips, switches to
/// exponent notation below `1e-6` and from `1e21` on, and prints negative
/// zero as `0`.
pub fn format_coordinate(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    value.to_string()
}
