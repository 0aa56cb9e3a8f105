use std::f64::consts::PI;

/// Spherical radius used by Web Mercator (EPSG:3857), in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which the projection diverges; inputs are clamped here.
pub const MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

/// Geographic degrees to projected meters.
pub fn from_lon_lat(lon: f64, lat: f64) -> [f64; 2] {
    let lat = lat.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG);
    let x = lon.to_radians() * EARTH_RADIUS_M;
    let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS_M;
    [x, y]
}

/// Projected meters back to geographic degrees.
pub fn to_lon_lat(x: f64, y: f64) -> [f64; 2] {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    [lon, lat]
}
