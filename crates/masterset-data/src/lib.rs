use once_cell::sync::Lazy;

pub mod city;
pub mod place;
pub mod price;
pub mod source;
pub mod test_data;

pub const DATA_URL_DEFAULT: &str = "http://localhost:3000/data";

/// Base URL the HTTP source resolves dataset resources against.
///
/// Read once from `MASTERSET_DATA_URL`, falling back to [`DATA_URL_DEFAULT`].
pub static DATA_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("MASTERSET_DATA_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DATA_URL_DEFAULT.to_string())
});

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum DataError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[cfg(feature = "http")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("Serialization error: {0}")]
        Serde(#[from] serde_json::Error),
        #[error("Dataset document is not a JSON array")]
        NotAnArray,
        #[error("Dataset resource not found: {0}")]
        ResourceNotFound(String),
    }

    pub type Result<T> = std::result::Result<T, DataError>;
}

pub use error::{DataError, Result};

pub use city::{BASELINE_CITY, CityEntry, available_cities, resolve_city};
pub use place::{Coordinates, Place, parse_places};
pub use price::PriceLevel;
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DatasetSource, DirectorySource, MemorySource};
