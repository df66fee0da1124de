//! Request and response types for the FloodSync API.
//!
//! Decoding is strict: a response either yields a complete value or a
//! decode error naming what was wrong. Nothing is partially filled in.

use crate::RequestError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Layer type
// ============================================================================

/// Which flood layer the backend should compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// Recent flood extent from radar imagery.
    #[default]
    Current,
    /// Flood extent from a historical event.
    Historical,
    /// Predicted flood risk from rainfall.
    Risk,
}

impl LayerType {
    /// All layer types, in wire order.
    pub const ALL: [LayerType; 3] = [LayerType::Current, LayerType::Historical, LayerType::Risk];

    /// Returns the wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LayerType::Current => "current",
            LayerType::Historical => "historical",
            LayerType::Risk => "risk",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerType::ALL
            .into_iter()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid layer type '{}' (expected current, historical or risk)",
                    s
                )
            })
    }
}

// ============================================================================
// Request
// ============================================================================

/// Parameters for a flood map.
///
/// Dates left unset are sent as `null` and the backend picks its own
/// window (the most recent month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloodMapRequest {
    /// Country name as known to the backend.
    #[serde(rename = "country_name")]
    pub country: String,
    /// First day of the imagery window.
    pub start_date: Option<NaiveDate>,
    /// Last day of the imagery window.
    pub end_date: Option<NaiveDate>,
    /// Layer to compute.
    pub layer_type: LayerType,
}

impl FloodMapRequest {
    /// Create a request for the current layer with no date window.
    pub fn new(country: impl Into<String>) -> Result<Self, RequestError> {
        let country = country.into();
        if country.trim().is_empty() {
            return Err(RequestError::EmptyCountry);
        }
        Ok(Self {
            country,
            start_date: None,
            end_date: None,
            layer_type: LayerType::default(),
        })
    }

    /// Set the date window.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set the date window from `YYYY-MM-DD` strings.
    pub fn with_date_strings(
        self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, RequestError> {
        let start = start.map(|s| parse_date("start_date", s)).transpose()?;
        let end = end.map(|s| parse_date("end_date", s)).transpose()?;
        Ok(self.with_dates(start, end))
    }

    /// Set the layer type.
    pub fn with_layer(mut self, layer_type: LayerType) -> Self {
        self.layer_type = layer_type;
        self
    }

    /// Check the request before sending it.
    ///
    /// The client does not call this; callers that want to reject
    /// inverted windows locally should.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.country.trim().is_empty() {
            return Err(RequestError::EmptyCountry);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(RequestError::DateOrder { start, end });
            }
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| RequestError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

// ============================================================================
// Responses
// ============================================================================

/// Country names in the order the backend returned them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct CountryList(Vec<String>);

impl CountryList {
    /// Country names as a slice.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the backend returned no countries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `name` is in the list (exact match).
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    /// Iterate over the names.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Take ownership of the names.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for CountryList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl IntoIterator for CountryList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CountryList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A computed flood map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodMapResult {
    /// Flood extent as a GeoJSON FeatureCollection.
    pub geojson: serde_json::Value,
    /// Map tile URL template (`{z}/{x}/{y}` placeholders).
    pub tile_url: String,
    /// Flooded area in square kilometres.
    pub area_sqkm: f64,
    /// Layer the backend says it computed, if it echoed one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerType>,
}

impl FloodMapResult {
    /// Number of features in the GeoJSON collection.
    pub fn feature_count(&self) -> usize {
        self.geojson
            .get("features")
            .and_then(|f| f.as_array())
            .map_or(0, Vec::len)
    }
}

/// What a successful flood map response turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FloodMapOutcome {
    /// A complete map.
    Map(FloodMapResult),
    /// The backend reported an error in-band.
    Rejected,
}

// Wire shapes. Every field is optional here so that the decode functions
// can name exactly which one is missing.

#[derive(Deserialize)]
#[serde(untagged)]
enum CountriesBody {
    Bare(Vec<String>),
    Envelope { countries: Vec<String> },
}

#[derive(Deserialize)]
struct FloodMapBody {
    status: Option<String>,
    layer: Option<LayerType>,
    geojson: Option<serde_json::Value>,
    tile_url: Option<String>,
    area_sqkm: Option<f64>,
}

/// Decode a `/countries` body.
///
/// Accepts a bare JSON array of strings or `{"countries": [...]}`.
pub(crate) fn decode_countries(body: &[u8]) -> Result<CountryList, String> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {}", e))?;
    match serde_json::from_value::<CountriesBody>(value) {
        Ok(CountriesBody::Bare(names)) | Ok(CountriesBody::Envelope { countries: names }) => {
            Ok(CountryList(names))
        }
        Err(_) => Err("expected a JSON array of strings".to_string()),
    }
}

/// Decode a `/flood_map` body.
pub(crate) fn decode_flood_map(body: &[u8]) -> Result<FloodMapOutcome, String> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {}", e))?;
    // Derived structs also accept a positional array; only objects are valid here
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    let parsed: FloodMapBody =
        serde_json::from_value(value).map_err(|e| format!("invalid flood map body: {}", e))?;

    if parsed.status.as_deref() == Some("error") {
        return Ok(FloodMapOutcome::Rejected);
    }

    let geojson = parsed.geojson.ok_or("missing field 'geojson'")?;
    match geojson.get("type").and_then(|t| t.as_str()) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(format!(
                "'geojson' must be a FeatureCollection, got '{}'",
                other
            ))
        }
        None => return Err("'geojson' is not a GeoJSON object".to_string()),
    }

    let tile_url = parsed.tile_url.ok_or("missing field 'tile_url'")?;
    let area_sqkm = parsed.area_sqkm.ok_or("missing field 'area_sqkm'")?;
    if !area_sqkm.is_finite() || area_sqkm < 0.0 {
        return Err(format!("'area_sqkm' must be non-negative, got {}", area_sqkm));
    }

    Ok(FloodMapOutcome::Map(FloodMapResult {
        geojson,
        tile_url,
        area_sqkm,
        layer: parsed.layer,
    }))
}
