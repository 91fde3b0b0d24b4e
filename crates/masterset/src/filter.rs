//! The filter pipeline.
//!
//! Stages run in a fixed order, each over the output of the previous one:
//!
//! 1. closed-exclusion (always)
//! 2. category substring match
//! 3. minimum rating
//! 4. maximum price level
//! 5. neighborhood substring match
//! 6. proximity: attach distance, drop rows beyond the radius, sort by distance
//! 7. pagination
//!
//! Every stage except proximity keeps dataset order. Unset predicates skip
//! their stage. Places are borrowed throughout and only cloned for the page
//! that is actually returned.

use masterset_data::{Coordinates, Place, PriceLevel};

use crate::{geo::distance_between, query::RankedPlace};

/// Reference point and radius for the proximity stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub center: Coordinates,
    pub radius_km: f64,
}

/// Offset/limit window applied after filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// The `[offset, offset + limit)` slice of `rows`.
    pub fn apply<T>(self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        rows.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// A place that passed the pipeline, with its distance when proximity ran.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub place: &'a Place,
    pub distance_km: Option<f64>,
}

impl Match<'_> {
    pub fn to_ranked(&self) -> RankedPlace {
        RankedPlace {
            place: self.place.clone(),
            distance_km: self.distance_km,
        }
    }
}

/// Optional predicates; each unset one skips its stage.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    categories: Vec<String>,
    min_rating: Option<f64>,
    max_price: Option<PriceLevel>,
    neighborhood: Option<String>,
    proximity: Option<Proximity>,
}

impl PlaceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep places with any category containing any of `categories` (case-insensitive).
    ///
    /// An empty list disables the stage.
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = categories
            .into_iter()
            .map(|c| c.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    pub fn max_price(mut self, max_price: PriceLevel) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Keep places whose neighborhood contains `neighborhood` (case-insensitive).
    ///
    /// An empty string disables the stage.
    pub fn neighborhood(mut self, neighborhood: &str) -> Self {
        self.neighborhood = (!neighborhood.is_empty()).then(|| neighborhood.to_lowercase());
        self
    }

    pub fn near(mut self, center: Coordinates, radius_km: f64) -> Self {
        self.proximity = Some(Proximity { center, radius_km });
        self
    }

    pub const fn proximity(&self) -> Option<Proximity> {
        self.proximity
    }

    /// Runs stages 1–6 over `places`.
    pub fn apply<'a>(&self, places: &'a [Place]) -> Vec<Match<'a>> {
        let survivors = open_places(places)
            .filter(|place| self.matches_categories(place))
            .filter(|place| self.min_rating.is_none_or(|min| place.total_score >= min))
            .filter(|place| {
                self.max_price
                    .is_none_or(|max| place.effective_price_level() <= max)
            })
            .filter(|place| self.matches_neighborhood(place));

        match self.proximity {
            Some(proximity) => within_radius(survivors, proximity),
            None => survivors
                .map(|place| Match {
                    place,
                    distance_km: None,
                })
                .collect(),
        }
    }

    /// Runs the whole pipeline, pagination included, and clones the page out.
    pub fn apply_paged(&self, places: &[Place], page: Page) -> Vec<RankedPlace> {
        page.apply(self.apply(places))
            .iter()
            .map(Match::to_ranked)
            .collect()
    }

    fn matches_categories(&self, place: &Place) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        place.categories.iter().any(|category| {
            let category = category.to_lowercase();
            self.categories
                .iter()
                .any(|wanted| category.contains(wanted.as_str()))
        })
    }

    fn matches_neighborhood(&self, place: &Place) -> bool {
        self.neighborhood.as_deref().is_none_or(|wanted| {
            place.neighborhood.to_lowercase().contains(wanted)
        })
    }
}

/// Places with neither closed flag set, in dataset order.
pub fn open_places(places: &[Place]) -> impl Iterator<Item = &Place> {
    places.iter().filter(|place| !place.is_closed())
}

/// Attaches distances, keeps rows within the radius and sorts nearest first.
///
/// The sort is stable, so equidistant places keep dataset order.
pub fn within_radius<'a>(
    places: impl Iterator<Item = &'a Place>,
    proximity: Proximity,
) -> Vec<Match<'a>> {
    let mut matches: Vec<Match<'a>> = places
        .filter_map(|place| {
            let distance = distance_between(proximity.center, place.location);
            (distance <= proximity.radius_km).then_some(Match {
                place,
                distance_km: Some(distance),
            })
        })
        .collect();
    matches.sort_by(|a, b| {
        a.distance_km
            .unwrap_or_default()
            .total_cmp(&b.distance_km.unwrap_or_default())
    });
    matches
}

/// Case-insensitive substring match over title, description, category name and categories.
///
/// `query_lower` must already be lowercased.
pub fn matches_text(place: &Place, query_lower: &str) -> bool {
    place.title.to_lowercase().contains(query_lower)
        || place.description.to_lowercase().contains(query_lower)
        || place.category_name.to_lowercase().contains(query_lower)
        || place
            .categories
            .iter()
            .any(|category| category.to_lowercase().contains(query_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterset_data::{
        parse_places,
        test_data::{
            REFERENCE_POINT, TestPlace, barcelona_fixture, document, generated_places, offset_north,
        },
    };

    fn fixture() -> Vec<Place> {
        parse_places(&document(barcelona_fixture())).unwrap()
    }

    fn ids(matches: &[Match<'_>]) -> Vec<String> {
        matches.iter().map(|m| m.place.place_id.clone()).collect()
    }

    #[test]
    fn test_no_predicates_only_excludes_closed() {
        let places = fixture();
        let matches = PlaceFilter::new().apply(&places);
        assert_eq!(ids(&matches), vec!["A", "C"]);
        assert!(matches.iter().all(|m| m.distance_km.is_none()));
    }

    #[test]
    fn test_category_partial_case_insensitive() {
        let places = fixture();
        assert_eq!(ids(&PlaceFilter::new().categories(["bar"]).apply(&places)), vec!["A"]);
        assert_eq!(
            ids(&PlaceFilter::new().categories(["TAP"]).apply(&places)),
            vec!["A", "C"]
        );
        assert_eq!(
            ids(&PlaceFilter::new().categories(["sushi", "restaur"]).apply(&places)),
            vec!["C"]
        );
        // Empty request list is no filter at all
        assert_eq!(
            ids(&PlaceFilter::new().categories(Vec::<String>::new()).apply(&places)),
            vec!["A", "C"]
        );
    }

    #[test]
    fn test_place_without_categories_never_matches_category_filter() {
        let places = parse_places(&document([TestPlace::new("bare", REFERENCE_POINT)])).unwrap();
        assert!(PlaceFilter::new().categories(["a"]).apply(&places).is_empty());
    }

    #[test]
    fn test_min_rating_is_inclusive() {
        let places = fixture();
        assert_eq!(ids(&PlaceFilter::new().min_rating(4.0).apply(&places)), vec!["A"]);
        assert_eq!(ids(&PlaceFilter::new().min_rating(4.5).apply(&places)), vec!["A"]);
        assert_eq!(
            ids(&PlaceFilter::new().min_rating(3.0).apply(&places)),
            vec!["A", "C"]
        );
    }

    #[test]
    fn test_max_price_defaults_missing_prices_to_moderate() {
        let places = parse_places(&document([
            TestPlace::new("cheap", REFERENCE_POINT).price("$"),
            TestPlace::new("unknown", REFERENCE_POINT),
            TestPlace::new("range", REFERENCE_POINT).price("€10–20"),
            TestPlace::new("fancy", REFERENCE_POINT).price("€€€€"),
        ]))
        .unwrap();

        let budget = PlaceFilter::new().max_price(PriceLevel::Budget).apply(&places);
        assert_eq!(ids(&budget), vec!["cheap"]);

        let moderate = PlaceFilter::new().max_price(PriceLevel::Moderate).apply(&places);
        assert_eq!(ids(&moderate), vec!["cheap", "unknown", "range"]);

        let luxury = PlaceFilter::new().max_price(PriceLevel::Luxury).apply(&places);
        assert_eq!(luxury.len(), 4);
    }

    #[test]
    fn test_neighborhood_substring() {
        let places = fixture();
        assert_eq!(ids(&PlaceFilter::new().neighborhood("raval").apply(&places)), vec!["A"]);
        assert_eq!(ids(&PlaceFilter::new().neighborhood("GRÀ").apply(&places)), vec!["C"]);
        // B matches but is closed
        assert!(PlaceFilter::new().neighborhood("eixample").apply(&places).is_empty());
        assert_eq!(PlaceFilter::new().neighborhood("").apply(&places).len(), 2);
    }

    #[test]
    fn test_proximity_filters_and_sorts() {
        let places = parse_places(&document([
            TestPlace::new("far", offset_north(REFERENCE_POINT, 3.0)),
            TestPlace::new("near", offset_north(REFERENCE_POINT, 0.5)),
            TestPlace::new("outside", offset_north(REFERENCE_POINT, 7.0)),
            TestPlace::new("middle", offset_north(REFERENCE_POINT, 1.5)),
        ]))
        .unwrap();

        let matches = PlaceFilter::new().near(REFERENCE_POINT, 4.0).apply(&places);
        assert_eq!(ids(&matches), vec!["near", "middle", "far"]);
        for m in &matches {
            let distance = m.distance_km.unwrap();
            assert!(distance <= 4.0);
        }
        assert!((matches[0].distance_km.unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_proximity_ties_keep_dataset_order() {
        let places = parse_places(&document([
            TestPlace::new("first", offset_north(REFERENCE_POINT, 1.0)),
            TestPlace::new("second", offset_north(REFERENCE_POINT, 1.0)),
        ]))
        .unwrap();
        let matches = PlaceFilter::new().near(REFERENCE_POINT, 2.0).apply(&places);
        assert_eq!(ids(&matches), vec!["first", "second"]);
    }

    #[test]
    fn test_stages_combine() {
        let places = parse_places(&document(generated_places(300))).unwrap();
        let filter = PlaceFilter::new()
            .categories(["restaurant"])
            .min_rating(2.0)
            .max_price(PriceLevel::Expensive)
            .neighborhood("e")
            .near(REFERENCE_POINT, 8.0);

        let matches = filter.apply(&places);
        assert!(!matches.is_empty());
        for m in &matches {
            let place = m.place;
            assert!(!place.is_closed());
            assert!(place.categories.iter().any(|c| c.to_lowercase().contains("restaurant")));
            assert!(place.total_score >= 2.0);
            assert!(place.effective_price_level() <= PriceLevel::Expensive);
            assert!(place.neighborhood.to_lowercase().contains('e'));
            assert!(m.distance_km.unwrap() <= 8.0);
        }
        assert!(matches.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_page_slices() {
        let rows: Vec<u32> = (0..10).collect();
        assert_eq!(Page::new(0, 3).apply(rows.clone()), vec![0, 1, 2]);
        assert_eq!(Page::new(8, 5).apply(rows.clone()), vec![8, 9]);
        assert!(Page::new(20, 5).apply(rows.clone()).is_empty());
        assert!(Page::new(2, 0).apply(rows).is_empty());
    }

    #[test]
    fn test_apply_paged_matches_unpaged_slice() {
        let places = parse_places(&document(generated_places(200))).unwrap();
        let filter = PlaceFilter::new().near(REFERENCE_POINT, 10.0);

        let everything = filter.apply_paged(&places, Page::new(0, 25 + 10));
        let page = filter.apply_paged(&places, Page::new(25, 10));
        assert_eq!(page.len(), 10);
        assert_eq!(page, everything[25..35].to_vec());
    }

    #[test]
    fn test_text_match() {
        let places = fixture();
        let a = &places[0];
        assert!(matches_text(a, "tapas"));
        assert!(matches_text(a, "cañete"));
        assert!(matches_text(a, "tapas bar"));
        assert!(!matches_text(a, "sushi"));
        assert!(matches_text(a, ""));
    }
}
