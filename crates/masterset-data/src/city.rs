//! Static registry of supported cities and the dataset resource backing each one.

use tracing::warn;

/// One supported city and the name of its dataset resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityEntry {
    /// Identifier used by callers and as the cache key (e.g. `"barcelona"`)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Resource file name, relative to the dataset base location
    pub resource: &'static str,
}

const CITIES: &[CityEntry] = &[
    CityEntry {
        id: "barcelona",
        name: "Barcelona",
        resource: "MasterSet_barcelona.json",
    },
    CityEntry {
        id: "madrid",
        name: "Madrid",
        resource: "MasterSet_madrid.json",
    },
    CityEntry {
        id: "valencia",
        name: "Valencia",
        resource: "MasterSet_valencia.json",
    },
    CityEntry {
        id: "seville",
        name: "Seville",
        resource: "MasterSet_seville.json",
    },
    CityEntry {
        id: "lisbon",
        name: "Lisbon",
        resource: "MasterSet_lisbon.json",
    },
    CityEntry {
        id: "paris",
        name: "Paris",
        resource: "MasterSet_paris.json",
    },
    CityEntry {
        id: "london",
        name: "London",
        resource: "MasterSet_london.json",
    },
    CityEntry {
        id: "rome",
        name: "Rome",
        resource: "MasterSet_rome.json",
    },
];

/// Identifier of the city unknown identifiers fall back to.
pub const BASELINE_CITY: &str = "barcelona";

/// All registered city identifiers, in registry order.
pub fn available_cities() -> Vec<&'static str> {
    CITIES.iter().map(|city| city.id).collect()
}

/// Exact (case-insensitive) registry lookup, without fallback.
pub fn find_city(id: &str) -> Option<&'static CityEntry> {
    let id = id.trim();
    CITIES.iter().find(|city| city.id.eq_ignore_ascii_case(id))
}

/// Resolves a city identifier, substituting the baseline city for unknown ones.
pub fn resolve_city(id: &str) -> &'static CityEntry {
    find_city(id).unwrap_or_else(|| {
        warn!(
            requested = id,
            fallback = BASELINE_CITY,
            "Unknown city, using baseline dataset"
        );
        baseline()
    })
}

fn baseline() -> &'static CityEntry {
    &CITIES[0]
}
