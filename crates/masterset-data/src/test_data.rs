use serde_json::{Map, Value, json};
use tracing::info;

use crate::Coordinates;

/// Kilometres per degree of latitude on a 6371 km sphere.
const KM_PER_DEGREE: f64 = 6371.0 * std::f64::consts::PI / 180.0;

/// Plaça de Catalunya, the reference point the fixtures are laid out around.
pub const REFERENCE_POINT: Coordinates = Coordinates {
    lat: 41.3870,
    lng: 2.1700,
};

/// Point `km` kilometres due north of `origin`.
pub fn offset_north(origin: Coordinates, km: f64) -> Coordinates {
    Coordinates::new(origin.lat + km / KM_PER_DEGREE, origin.lng)
}

/// Point roughly `km` kilometres due east of `origin`.
pub fn offset_east(origin: Coordinates, km: f64) -> Coordinates {
    let degrees = km / (KM_PER_DEGREE * origin.lat.to_radians().cos());
    Coordinates::new(origin.lat, origin.lng + degrees)
}

/// Builder for one place row in a dataset document.
#[derive(Debug, Clone)]
pub struct TestPlace {
    fields: Map<String, Value>,
}

impl TestPlace {
    pub fn new(place_id: &str, location: Coordinates) -> Self {
        let mut fields = Map::new();
        fields.insert("placeId".into(), json!(place_id));
        fields.insert("title".into(), json!(place_id));
        fields.insert(
            "location".into(),
            json!({ "lat": location.lat, "lng": location.lng }),
        );
        Self { fields }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.set("title", json!(title))
    }

    pub fn description(self, description: &str) -> Self {
        self.set("description", json!(description))
    }

    pub fn category_name(self, name: &str) -> Self {
        self.set("categoryName", json!(name))
    }

    pub fn categories(self, categories: &[&str]) -> Self {
        self.set("categories", json!(categories))
    }

    pub fn neighborhood(self, neighborhood: &str) -> Self {
        self.set("neighborhood", json!(neighborhood))
    }

    pub fn rating(self, score: f64) -> Self {
        self.set("totalScore", json!(score))
    }

    pub fn price(self, price: &str) -> Self {
        self.set("price", json!(price))
    }

    pub fn permanently_closed(self) -> Self {
        self.set("permanentlyClosed", json!(true))
    }

    pub fn temporarily_closed(self) -> Self {
        self.set("temporarilyClosed", json!(true))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Serializes rows into a dataset document.
pub fn document(places: impl IntoIterator<Item = TestPlace>) -> Vec<u8> {
    let rows: Vec<Value> = places.into_iter().map(TestPlace::into_value).collect();
    Value::Array(rows).to_string().into_bytes()
}

/// Three Barcelona places around [`REFERENCE_POINT`]:
///
/// - `A`: open, rating 4.5, 1.0 km away, categories `Bar`/`Tapas`
/// - `B`: temporarily closed, rating 4.9, 0.2 km away, categories `Restaurant`/`Tapas`
/// - `C`: open, rating 3.0, 5.0 km away, categories `Restaurant`/`Tapas`
pub fn barcelona_fixture() -> Vec<TestPlace> {
    vec![
        TestPlace::new("A", offset_north(REFERENCE_POINT, 1.0))
            .title("Bar Cañete")
            .description("Best Tapas in town")
            .category_name("Tapas bar")
            .categories(&["Bar", "Tapas"])
            .neighborhood("El Raval")
            .rating(4.5)
            .price("$$"),
        TestPlace::new("B", offset_north(REFERENCE_POINT, 0.2))
            .title("Cervecería Catalana")
            .description("Busy beer hall")
            .category_name("Restaurant")
            .categories(&["Restaurant", "Tapas"])
            .neighborhood("Eixample")
            .rating(4.9)
            .price("$$")
            .temporarily_closed(),
        TestPlace::new("C", offset_north(REFERENCE_POINT, 5.0))
            .title("La Pepita")
            .description("Creative small plates")
            .category_name("Restaurant")
            .categories(&["Restaurant", "Tapas"])
            .neighborhood("Gràcia")
            .rating(3.0)
            .price("$$$"),
    ]
}

const CATEGORY_CYCLE: &[&[&str]] = &[
    &["Restaurant", "Pizza restaurant"],
    &["Cafe", "Coffee shop"],
    &["Bar", "Cocktail bar"],
    &["Restaurant", "Tapas"],
    &["Bakery"],
    &[],
];

const NEIGHBORHOOD_CYCLE: &[&str] = &["El Born", "Gràcia", "Eixample", "Poble-sec", ""];

const PRICE_CYCLE: &[Option<&str>] = &[Some("$"), Some("$$"), Some("$$$"), Some("$$$$"), None];

/// Deterministic dataset of `count` places spread up to ~12 km around
/// [`REFERENCE_POINT`], with every seventh place closed.
pub fn generated_places(count: usize) -> Vec<TestPlace> {
    info!(count, "Generating test places");
    (0..count)
        .map(|i| {
            let north = ((i * 37) % 240) as f64 / 10.0 - 12.0;
            let east = ((i * 53) % 240) as f64 / 10.0 - 12.0;
            let location = offset_east(offset_north(REFERENCE_POINT, north), east);

            let mut place = TestPlace::new(&format!("gen-{i:04}"), location)
                .title(&format!("Place {i}"))
                .description(if i % 3 == 0 { "Homemade pasta" } else { "Local favourite" })
                .categories(CATEGORY_CYCLE[i % CATEGORY_CYCLE.len()])
                .neighborhood(NEIGHBORHOOD_CYCLE[i % NEIGHBORHOOD_CYCLE.len()])
                .rating((i % 11) as f64 * 0.5);
            if let Some(price) = PRICE_CYCLE[i % PRICE_CYCLE.len()] {
                place = place.price(price);
            }
            match i % 14 {
                0 => place.permanently_closed(),
                7 => place.temporarily_closed(),
                _ => place,
            }
        })
        .collect()
}
