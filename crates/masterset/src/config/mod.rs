use masterset_data::{BASELINE_CITY, city::find_city};

use crate::error::MastersetError;

/// Defaults applied by every [`LocationService`](crate::LocationService) operation
/// when the caller leaves a parameter unset.
///
/// Use [`QueryDefaultsBuilder`] to derive a validated variant.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefaults {
    /// City used when none is given
    pub city: String,
    /// Page size for `query_locations` and `nearby_locations`
    pub limit: usize,
    /// Page offset for `query_locations`
    pub offset: usize,
    /// Radius for `query_locations` when a reference point is given
    pub query_radius_km: f64,
    /// Radius for `nearby_locations`
    pub nearby_radius_km: f64,
    /// Result cap for `search_locations`
    pub search_limit: usize,
    /// Sample size for `random_locations`
    pub random_count: usize,
}

impl QueryDefaults {
    pub fn builder() -> QueryDefaultsBuilder {
        QueryDefaultsBuilder::default()
    }
}

impl Default for QueryDefaults {
    fn default() -> Self {
        let default_limit = 20;
        Self {
            city: BASELINE_CITY.to_string(),
            limit: default_limit,
            offset: 0,
            query_radius_km: 10.0,
            nearby_radius_km: 5.0,
            search_limit: default_limit,
            random_count: 10,
        }
    }
}

/// Builder for [`QueryDefaults`] with presets.
#[derive(Debug, Clone, Default)]
pub struct QueryDefaultsBuilder {
    defaults: QueryDefaults,
}

impl QueryDefaultsBuilder {
    pub fn new() -> Self {
        Self {
            defaults: QueryDefaults::default(),
        }
    }

    /// Small pages and a walking-distance nearby radius
    pub fn compact() -> Self {
        let mut builder = Self::new();
        builder.defaults.limit = 10;
        builder.defaults.search_limit = 10;
        builder.defaults.nearby_radius_km = 2.0;
        builder
    }

    /// Large pages and city-wide radii
    pub fn wide_area() -> Self {
        let mut builder = Self::new();
        builder.defaults.limit = 50;
        builder.defaults.search_limit = 50;
        builder.defaults.query_radius_km = 25.0;
        builder.defaults.nearby_radius_km = 15.0;
        builder
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.defaults.city = city.into();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.defaults.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.defaults.offset = offset;
        self
    }

    pub fn query_radius_km(mut self, radius_km: f64) -> Self {
        self.defaults.query_radius_km = radius_km;
        self
    }

    pub fn nearby_radius_km(mut self, radius_km: f64) -> Self {
        self.defaults.nearby_radius_km = radius_km;
        self
    }

    pub fn search_limit(mut self, limit: usize) -> Self {
        self.defaults.search_limit = limit;
        self
    }

    pub fn random_count(mut self, count: usize) -> Self {
        self.defaults.random_count = count;
        self
    }

    /// Validates and returns the defaults.
    pub fn build(self) -> Result<QueryDefaults, MastersetError> {
        let defaults = self.defaults;

        let Some(city) = find_city(&defaults.city) else {
            return Err(MastersetError::ConfigError(format!(
                "Default city '{}' is not a registered city",
                defaults.city
            )));
        };
        for (name, radius) in [
            ("query_radius_km", defaults.query_radius_km),
            ("nearby_radius_km", defaults.nearby_radius_km),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(MastersetError::ConfigError(format!(
                    "{name} must be a positive number of kilometres, got {radius}"
                )));
            }
        }
        for (name, value) in [
            ("limit", defaults.limit),
            ("search_limit", defaults.search_limit),
            ("random_count", defaults.random_count),
        ] {
            if value == 0 {
                return Err(MastersetError::ConfigError(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        Ok(QueryDefaults {
            city: city.id.to_string(),
            ..defaults
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = QueryDefaults::default();
        assert_eq!(defaults.city, "barcelona");
        assert_eq!(defaults.limit, 20);
        assert_eq!(defaults.offset, 0);
        assert_eq!(defaults.query_radius_km, 10.0);
        assert_eq!(defaults.nearby_radius_km, 5.0);
        assert_eq!(defaults.search_limit, 20);
        assert_eq!(defaults.random_count, 10);
    }

    #[test]
    fn test_default_builder_matches_default() {
        let built = QueryDefaultsBuilder::new().build().unwrap();
        assert_eq!(built, QueryDefaults::default());
    }

    #[test]
    fn test_presets() {
        let compact = QueryDefaultsBuilder::compact().build().unwrap();
        assert_eq!(compact.limit, 10);
        assert_eq!(compact.nearby_radius_km, 2.0);

        let wide = QueryDefaultsBuilder::wide_area().build().unwrap();
        assert_eq!(wide.limit, 50);
        assert_eq!(wide.query_radius_km, 25.0);
        assert_eq!(wide.nearby_radius_km, 15.0);
    }

    #[test]
    fn test_override_preset() {
        let defaults = QueryDefaultsBuilder::compact()
            .limit(5)
            .city("Lisbon")
            .build()
            .unwrap();
        assert_eq!(defaults.limit, 5);
        assert_eq!(defaults.nearby_radius_km, 2.0);
        // City ids are normalized to the registry spelling
        assert_eq!(defaults.city, "lisbon");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(QueryDefaults::builder().city("atlantis").build().is_err());
        assert!(QueryDefaults::builder().query_radius_km(0.0).build().is_err());
        assert!(QueryDefaults::builder().nearby_radius_km(-1.0).build().is_err());
        assert!(QueryDefaults::builder().nearby_radius_km(f64::NAN).build().is_err());
        assert!(QueryDefaults::builder().limit(0).build().is_err());
        assert!(QueryDefaults::builder().random_count(0).build().is_err());

        let err = QueryDefaults::builder().search_limit(0).build().unwrap_err();
        assert!(err.to_string().contains("search_limit"));
    }
}
