//! Query parameters and result rows.

use masterset_data::{Coordinates, Place};

/// Parameters for [`LocationService::query_locations`](crate::LocationService::query_locations).
///
/// Every field is optional; unset fields take their value from
/// [`QueryDefaults`](crate::QueryDefaults) or skip their filter stage.
///
/// ```rust
/// use masterset::{Coordinates, QueryParams};
///
/// let params = QueryParams::new()
///     .city("barcelona")
///     .categories(["tapas"])
///     .min_rating(4.0)
///     .near(Coordinates::new(41.387, 2.170), 2.5)
///     .limit(10);
/// assert_eq!(params.limit, Some(10));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub city: Option<String>,
    pub categories: Option<Vec<String>>,
    pub min_rating: Option<f64>,
    /// Price band string such as `"$$"`
    pub max_price: Option<String>,
    pub neighborhood: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub near_location: Option<Coordinates>,
    pub radius_km: Option<f64>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    pub fn max_price(mut self, max_price: impl Into<String>) -> Self {
        self.max_price = Some(max_price.into());
        self
    }

    pub fn neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Restricts results to `radius_km` around `center`, nearest first.
    pub fn near(mut self, center: Coordinates, radius_km: f64) -> Self {
        self.near_location = Some(center);
        self.radius_km = Some(radius_km);
        self
    }

    /// Sets the reference point and leaves the radius at its default.
    pub fn near_location(mut self, center: Coordinates) -> Self {
        self.near_location = Some(center);
        self
    }
}

/// A result row: the place plus its distance from the query point, when one was given.
///
/// With the `serde` feature it serializes as the place's own fields with an
/// extra `"distance"` key.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlace {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub place: Place,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "distance", skip_serializing_if = "Option::is_none")
    )]
    pub distance_km: Option<f64>,
}

impl RankedPlace {
    pub fn into_place(self) -> Place {
        self.place
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use masterset_data::{
        parse_places,
        test_data::{barcelona_fixture, document},
    };
    use serde_json::json;

    #[test]
    fn test_params_from_camel_case_json() {
        let params: QueryParams = serde_json::from_value(json!({
            "city": "madrid",
            "categories": ["Bar"],
            "minRating": 4.2,
            "maxPrice": "$$",
            "nearLocation": { "lat": 40.4, "lng": -3.7 },
            "radiusKm": 3,
            "limit": 5
        }))
        .unwrap();

        assert_eq!(params.city.as_deref(), Some("madrid"));
        assert_eq!(params.min_rating, Some(4.2));
        assert_eq!(params.radius_km, Some(3.0));
        assert_eq!(params.near_location, Some(Coordinates::new(40.4, -3.7)));
        assert_eq!(params.offset, None);
    }

    #[test]
    fn test_ranked_place_flattens_with_distance() {
        let place = parse_places(&document(barcelona_fixture())).unwrap().remove(0);
        let ranked = RankedPlace {
            place,
            distance_km: Some(1.25),
        };
        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(value["placeId"], json!("A"));
        assert_eq!(value["distance"], json!(1.25));

        let unranked = RankedPlace {
            distance_km: None,
            ..ranked
        };
        let value = serde_json::to_value(&unranked).unwrap();
        assert!(value.get("distance").is_none());
    }
}
