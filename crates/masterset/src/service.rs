//! The query orchestrator.
//!
//! [`LocationService`] ties the dataset cache, the filter pipeline and the
//! defaults together into the public query operations. None of the query
//! operations fail: a dataset that cannot be loaded is logged and behaves as an
//! empty dataset, so every operation returns its empty result instead.

use std::{sync::Arc, time::Instant};

use itertools::Itertools;
use masterset_data::{
    CityEntry, Coordinates, DatasetSource, Place, PriceLevel, parse_places, resolve_city,
};
use rand::{Rng, seq::SliceRandom};
use tracing::{debug, error, info, instrument};

use crate::{
    cache::{Dataset, DatasetCache},
    config::QueryDefaults,
    error::Result,
    filter::{Match, Page, PlaceFilter, Proximity, matches_text, open_places, within_radius},
    query::{QueryParams, RankedPlace},
};

/// Loads, caches and queries per-city place datasets.
///
/// # Examples
///
/// ```rust
/// use masterset::{Coordinates, LocationService, MemorySource, QueryParams};
/// use masterset::data::test_data::{REFERENCE_POINT, barcelona_fixture, document};
///
/// # tokio_test_block(async {
/// let source = MemorySource::new()
///     .with_resource("MasterSet_barcelona.json", document(barcelona_fixture()));
/// let service = LocationService::new(source);
///
/// let nearby = service
///     .nearby_locations(REFERENCE_POINT, Some(4.0), None, Some("barcelona"))
///     .await;
/// assert_eq!(nearby.len(), 1);
///
/// let rated = service
///     .query_locations(&QueryParams::new().min_rating(4.0))
///     .await;
/// assert_eq!(rated[0].place.place_id, "A");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct LocationService<S> {
    source: S,
    cache: DatasetCache,
    defaults: QueryDefaults,
}

#[cfg(feature = "http")]
impl LocationService<masterset_data::HttpSource> {
    /// Service reading datasets over HTTP from `MASTERSET_DATA_URL`.
    pub fn from_env() -> Self {
        Self::new(masterset_data::HttpSource::from_env())
    }
}

impl<S: DatasetSource> LocationService<S> {
    pub fn new(source: S) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: S) -> LocationServiceBuilder<S> {
        LocationServiceBuilder {
            source,
            defaults: QueryDefaults::default(),
        }
    }

    pub const fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Id of the city whose dataset is currently cached.
    pub fn cached_city(&self) -> Option<String> {
        self.cache.cached_city()
    }

    fn city_entry(&self, city: Option<&str>) -> &'static CityEntry {
        resolve_city(city.unwrap_or(&self.defaults.city))
    }

    /// Returns the dataset for `city`, loading it on a cache miss.
    ///
    /// Failures are logged and yield an empty dataset; they are not cached, so
    /// the next call tries again.
    pub async fn load_locations(&self, city: &str) -> Dataset {
        match self.try_load_locations(city).await {
            Ok(places) => places,
            Err(e) => {
                error!(city, error = %e, "Failed to load dataset");
                Arc::from(Vec::new())
            }
        }
    }

    /// Like [`load_locations`](Self::load_locations) but reports the failure.
    #[instrument(name = "Load dataset", skip(self), level = "debug")]
    pub async fn try_load_locations(&self, city: &str) -> Result<Dataset> {
        let entry = resolve_city(city);
        if let Some(places) = self.cache.get(entry.id) {
            debug!(city = entry.id, rows = places.len(), "Dataset cache hit");
            return Ok(places);
        }

        debug!(city = entry.id, resource = entry.resource, "Dataset cache miss");
        let ticket = self.cache.begin_load();
        let t_load = Instant::now();

        let body = self.source.fetch(entry.resource).await?;
        let places: Dataset = parse_places(&body)?.into();

        info!(
            city = entry.id,
            rows = places.len(),
            elapsed = ?t_load.elapsed(),
            "Loaded dataset"
        );
        self.cache.complete_load(ticket, entry.id, Arc::clone(&places));
        Ok(places)
    }

    /// Evicts the cached dataset.
    pub fn clear_cache(&self) {
        info!("Clearing dataset cache");
        self.cache.clear();
    }

    async fn dataset(&self, city: Option<&str>) -> Dataset {
        self.load_locations(self.city_entry(city).id).await
    }

    /// Filtered, optionally distance-ranked, paginated query.
    #[instrument(name = "Query locations", skip_all, level = "debug", fields(city = ?params.city))]
    pub async fn query_locations(&self, params: &QueryParams) -> Vec<RankedPlace> {
        let places = self.dataset(params.city.as_deref()).await;

        let mut filter = PlaceFilter::new();
        if let Some(categories) = &params.categories {
            filter = filter.categories(categories);
        }
        if let Some(min_rating) = params.min_rating {
            filter = filter.min_rating(min_rating);
        }
        if let Some(raw) = params.max_price.as_deref() {
            match PriceLevel::parse(raw) {
                Some(max_price) => filter = filter.max_price(max_price),
                None => debug!(max_price = raw, "Ignoring unparsable max price"),
            }
        }
        if let Some(neighborhood) = params.neighborhood.as_deref() {
            filter = filter.neighborhood(neighborhood);
        }
        if let Some(center) = params.near_location {
            let radius_km = params.radius_km.unwrap_or(self.defaults.query_radius_km);
            filter = filter.near(center, radius_km);
        }

        let page = Page::new(
            params.offset.unwrap_or(self.defaults.offset),
            params.limit.unwrap_or(self.defaults.limit),
        );
        let results = filter.apply_paged(&places, page);
        debug!(returned = results.len(), "Query complete");
        results
    }

    /// Open places within `radius_km` of `center`, nearest first, each with its distance.
    #[instrument(name = "Nearby locations", skip(self), level = "debug")]
    pub async fn nearby_locations(
        &self,
        center: Coordinates,
        radius_km: Option<f64>,
        limit: Option<usize>,
        city: Option<&str>,
    ) -> Vec<RankedPlace> {
        let places = self.dataset(city).await;
        let radius_km = radius_km.unwrap_or(self.defaults.nearby_radius_km);
        let limit = limit.unwrap_or(self.defaults.limit);

        let proximity = Proximity { center, radius_km };
        within_radius(open_places(&places), proximity)
            .iter()
            .take(limit)
            .map(Match::to_ranked)
            .collect()
    }

    /// Open places whose title, description, category name or categories contain
    /// `query`, case-insensitively, in dataset order.
    #[instrument(name = "Search locations", skip(self), level = "debug")]
    pub async fn search_locations(
        &self,
        query: &str,
        limit: Option<usize>,
        city: Option<&str>,
    ) -> Vec<Place> {
        let places = self.dataset(city).await;
        let query = query.to_lowercase();
        let limit = limit.unwrap_or(self.defaults.search_limit);

        open_places(&places)
            .filter(|place| matches_text(place, &query))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Uniform random sample of `min(count, open places)` distinct open places.
    pub async fn random_locations(&self, count: Option<usize>, city: Option<&str>) -> Vec<Place> {
        let places = self.dataset(city).await;
        let count = count.unwrap_or(self.defaults.random_count);
        sample_open(&places, count, &mut rand::thread_rng())
    }

    /// [`random_locations`](Self::random_locations) drawing from the given generator.
    pub async fn random_locations_with_rng<R>(
        &self,
        count: Option<usize>,
        city: Option<&str>,
        rng: &mut R,
    ) -> Vec<Place>
    where
        R: Rng + Send + ?Sized,
    {
        let places = self.dataset(city).await;
        let count = count.unwrap_or(self.defaults.random_count);
        sample_open(&places, count, rng)
    }

    /// First place with `place_id`, closed places included.
    pub async fn location_by_id(&self, place_id: &str, city: Option<&str>) -> Option<Place> {
        let places = self.dataset(city).await;
        places
            .iter()
            .find(|place| place.place_id == place_id)
            .cloned()
    }

    /// Sorted distinct categories across the whole dataset, trimmed, blanks dropped.
    pub async fn categories(&self, city: Option<&str>) -> Vec<String> {
        let places = self.dataset(city).await;
        distinct_sorted(places.iter().flat_map(|place| place.categories.iter()))
    }

    /// Sorted distinct neighborhoods across the whole dataset, trimmed, blanks dropped.
    pub async fn neighborhoods(&self, city: Option<&str>) -> Vec<String> {
        let places = self.dataset(city).await;
        distinct_sorted(places.iter().map(|place| &place.neighborhood))
    }
}

fn sample_open<R: Rng + ?Sized>(places: &[Place], count: usize, rng: &mut R) -> Vec<Place> {
    let mut open: Vec<&Place> = open_places(places).collect();
    // Partial Fisher-Yates: every subset and order is equally likely.
    let (chosen, _) = open.partial_shuffle(rng, count);
    chosen.iter().map(|&place| place.clone()).collect()
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .sorted_unstable()
        .dedup()
        .map(str::to_string)
        .collect()
}

/// Assembles a [`LocationService`].
#[derive(Debug)]
pub struct LocationServiceBuilder<S> {
    source: S,
    defaults: QueryDefaults,
}

impl<S: DatasetSource> LocationServiceBuilder<S> {
    pub fn defaults(mut self, defaults: QueryDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn build(self) -> LocationService<S> {
        LocationService {
            source: self.source,
            cache: DatasetCache::new(),
            defaults: self.defaults,
        }
    }
}
