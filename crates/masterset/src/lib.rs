//! Masterset - In-memory point-of-interest queries
//!
//! Masterset loads a city's place dataset (restaurants, bars, cafés and other
//! points of interest) from a [`DatasetSource`], keeps the most recently used
//! city in memory and answers every query by scanning that snapshot.
//!
//! # Quick Start
//!
//! ```rust
//! use masterset::{LocationService, MemorySource, QueryParams};
//! use masterset::data::test_data::{REFERENCE_POINT, barcelona_fixture, document};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // `LocationService::from_env()` reads over HTTP from `MASTERSET_DATA_URL`
//! // when the `http` feature is on; here the dataset is served from memory.
//! let source = MemorySource::new()
//!     .with_resource("MasterSet_barcelona.json", document(barcelona_fixture()));
//! let service = LocationService::new(source);
//!
//! // Open tapas bars within 2 km, nearest first
//! let params = QueryParams::new()
//!     .city("barcelona")
//!     .categories(["tapas"])
//!     .near(REFERENCE_POINT, 2.0);
//! for row in service.query_locations(&params).await {
//!     println!("{} ({:.2} km)", row.place.title, row.distance_km.unwrap_or_default());
//! }
//!
//! // Free text search over title, description and categories
//! let tapas = service.search_locations("TAPAS", Some(5), None).await;
//! assert_eq!(tapas.len(), 2);
//! # });
//! ```
//!
//! # Operations
//!
//! - **Filtered queries**: category, rating, price, neighborhood and radius filters with pagination
//! - **Nearby**: open places within a radius, ranked by great-circle distance
//! - **Search**: case-insensitive substring search
//! - **Random picks**: uniform samples of open places
//! - **Lookups**: by place id, plus the distinct categories and neighborhoods of a city
//!
//! # Data
//!
//! Datasets are JSON arrays of place records, one resource per city
//! (`MasterSet_<city>.json`). Only one city is cached at a time; switching
//! cities or calling [`LocationService::clear_cache`] triggers a reload.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod cache;
mod config;
pub mod error;
mod filter;
pub mod geo;
mod query;
mod service;

pub use cache::{Dataset, DatasetCache, LoadTicket};
pub use config::{QueryDefaults, QueryDefaultsBuilder};
pub use error::MastersetError;
pub use filter::{Match, Page, PlaceFilter, Proximity};
pub use query::{QueryParams, RankedPlace};
pub use service::{LocationService, LocationServiceBuilder};

// Re-export the dataset layer
pub use masterset_data as data;
#[cfg(feature = "http")]
pub use masterset_data::HttpSource;
pub use masterset_data::{
    CityEntry, Coordinates, DataError, DatasetSource, DirectorySource, MemorySource, Place,
    PriceLevel, available_cities,
};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the library.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this more than
/// once is a no-op.
///
/// # Examples
///
/// ```rust
/// use masterset::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), masterset::error::MastersetError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), MastersetError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        // Another subscriber may already be installed by the host application.
        let _ = tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
        Ok(())
    })
}
