//! The [`Place`] record and the validating dataset parser.
//!
//! A city dataset is a JSON array of place objects. Rows are decoded one by
//! one so a single malformed entry costs only that entry: it is skipped with a
//! warning and the rest of the dataset still loads, in source order.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{DataError, PriceLevel, Result};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude (-90 to 90)
    pub lat: f64,
    /// Longitude (-180 to 180)
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the valid latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One point of interest in a city dataset.
///
/// Optional text, list, count and flag fields accept JSON `null` and read it as
/// their empty value. Fields the engine does not know about are kept in
/// [`Place::extra`] and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Unique within one city's dataset
    pub place_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_name: String,
    /// Used for category filtering; may be empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub neighborhood: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    pub location: Coordinates,
    /// Rating; missing means 0
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images_count: u64,
    /// Raw price band such as `"$$"`; see [`Place::price_level`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permanently_closed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temporarily_closed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_categories: Vec<String>,
    /// Pass-through metadata not interpreted by the engine (`openingHours`,
    /// `reserveTableUrl`, `additionalInfo`, ...), kept exactly as read
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Place {
    /// Either closed flag is set.
    pub const fn is_closed(&self) -> bool {
        self.permanently_closed || self.temporarily_closed
    }

    /// Parsed price band, `None` when missing or unparsable.
    pub fn price_level(&self) -> Option<PriceLevel> {
        self.price.as_deref().and_then(PriceLevel::parse)
    }

    /// Price band used for filtering: unknown prices count as [`PriceLevel::UNKNOWN_DEFAULT`].
    pub fn effective_price_level(&self) -> PriceLevel {
        self.price_level().unwrap_or(PriceLevel::UNKNOWN_DEFAULT)
    }

    /// Raw value of a pass-through field such as `"openingHours"`.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Error, Debug)]
enum InvalidRow {
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    #[error("empty placeId")]
    EmptyPlaceId,
    #[error("coordinates out of range: ({lat}, {lng})")]
    Coordinates { lat: f64, lng: f64 },
}

fn decode_row(row: Value) -> std::result::Result<Place, InvalidRow> {
    let place: Place = serde_json::from_value(row)?;
    if place.place_id.trim().is_empty() {
        return Err(InvalidRow::EmptyPlaceId);
    }
    if !place.location.is_valid() {
        return Err(InvalidRow::Coordinates {
            lat: place.location.lat,
            lng: place.location.lng,
        });
    }
    Ok(place)
}

/// Parses a dataset document into places, skipping rows that fail validation.
///
/// Fails only when the document is not JSON or its root is not an array.
pub fn parse_places(bytes: &[u8]) -> Result<Vec<Place>> {
    let document: Value = serde_json::from_slice(bytes)?;
    let Value::Array(rows) = document else {
        return Err(DataError::NotAnArray);
    };

    let total = rows.len();
    let places: Vec<Place> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            decode_row(row)
                .inspect_err(|reason| warn!(index, %reason, "Skipping malformed place"))
                .ok()
        })
        .collect();

    debug!(
        total,
        accepted = places.len(),
        skipped = total - places.len(),
        "Parsed dataset"
    );
    Ok(places)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_row(id: &str) -> Value {
        json!({
            "placeId": id,
            "location": { "lat": 41.3874, "lng": 2.1686 }
        })
    }

    #[test]
    fn test_minimal_row_uses_defaults() {
        let bytes = serde_json::to_vec(&json!([minimal_row("a")])).unwrap();
        let places = parse_places(&bytes).unwrap();

        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.place_id, "a");
        assert!(place.title.is_empty());
        assert!(place.categories.is_empty());
        assert_eq!(place.total_score, 0.0);
        assert!(!place.is_closed());
        assert_eq!(place.effective_price_level(), PriceLevel::Moderate);
    }

    #[test]
    fn test_nulls_read_as_empty_values() {
        let row = json!({
            "placeId": "n",
            "title": null,
            "categories": null,
            "totalScore": null,
            "reviewsCount": null,
            "permanentlyClosed": null,
            "neighborhood": null,
            "price": null,
            "location": { "lat": 0.0, "lng": 0.0 }
        });
        let bytes = serde_json::to_vec(&json!([row])).unwrap();
        let place = parse_places(&bytes).unwrap().remove(0);

        assert!(place.title.is_empty());
        assert!(place.categories.is_empty());
        assert_eq!(place.total_score, 0.0);
        assert_eq!(place.reviews_count, 0);
        assert!(!place.permanently_closed);
        assert!(place.neighborhood.is_empty());
        assert!(place.price.is_none());
    }

    #[test]
    fn test_malformed_rows_are_skipped_in_order() {
        let document = json!([
            minimal_row("first"),
            { "placeId": "no-location" },
            { "placeId": "bad-lat", "location": { "lat": 123.0, "lng": 0.0 } },
            { "placeId": "bad-type", "location": { "lat": "north", "lng": 0.0 } },
            { "placeId": "  ", "location": { "lat": 0.0, "lng": 0.0 } },
            { "location": { "lat": 0.0, "lng": 0.0 } },
            "not an object",
            minimal_row("last"),
        ]);
        let bytes = serde_json::to_vec(&document).unwrap();
        let ids: Vec<_> = parse_places(&bytes)
            .unwrap()
            .into_iter()
            .map(|p| p.place_id)
            .collect();

        assert_eq!(ids, vec!["first", "last"]);
    }

    #[test]
    fn test_non_array_document_is_rejected() {
        let result = parse_places(br#"{"placeId": "a"}"#);
        assert!(matches!(result, Err(DataError::NotAnArray)));

        let result = parse_places(b"not json");
        assert!(matches!(result, Err(DataError::Serde(_))));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let mut row = minimal_row("p");
        row["menuUrl"] = json!("https://example.com/menu");
        row["openingHours"] = json!([{ "day": "Monday", "hours": "9 AM to 5 PM" }]);
        let bytes = serde_json::to_vec(&json!([row])).unwrap();
        let place = parse_places(&bytes).unwrap().remove(0);

        assert_eq!(place.extra.get("menuUrl"), Some(&json!("https://example.com/menu")));
        assert!(place.metadata("openingHours").is_some_and(Value::is_array));

        let written = serde_json::to_value(&place).unwrap();
        assert_eq!(written["menuUrl"], json!("https://example.com/menu"));
        assert_eq!(written["placeId"], json!("p"));
    }

    #[test]
    fn test_null_metadata_survives_round_trip() {
        let mut row = minimal_row("p");
        row["openingHours"] = Value::Null;
        row["reserveTableUrl"] = Value::Null;
        row["googleFoodUrl"] = json!("https://food.google.com/p");
        let bytes = serde_json::to_vec(&json!([row])).unwrap();
        let place = parse_places(&bytes).unwrap().remove(0);

        assert_eq!(place.metadata("openingHours"), Some(&Value::Null));
        assert!(place.metadata("additionalInfo").is_none());

        let written = serde_json::to_value(&place).unwrap();
        let written = written.as_object().unwrap();
        assert_eq!(written.get("openingHours"), Some(&Value::Null));
        assert_eq!(written.get("reserveTableUrl"), Some(&Value::Null));
        assert_eq!(written["googleFoodUrl"], json!("https://food.google.com/p"));
        assert!(!written.contains_key("additionalInfo"));
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinates::new(90.0, 180.0).is_valid());
        assert!(Coordinates::new(-90.0, -180.0).is_valid());
        assert!(!Coordinates::new(90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
