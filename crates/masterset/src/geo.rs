//! Great-circle distance on a spherical Earth.

use masterset_data::Coordinates;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two latitude/longitude points.
///
/// Symmetric, zero for identical points and never negative. Antipodal points
/// come out at half the circumference (about 20015 km).
///
/// ```rust
/// use masterset::geo::distance_km;
///
/// let barcelona_madrid = distance_km(41.3874, 2.1686, 40.4168, -3.7038);
/// assert!((480.0..520.0).contains(&barcelona_madrid));
/// ```
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] near the antipode.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// [`distance_km`] between two coordinate pairs.
pub fn distance_between(from: Coordinates, to: Coordinates) -> f64 {
    distance_km(from.lat, from.lng, to.lat, to.lng)
}
