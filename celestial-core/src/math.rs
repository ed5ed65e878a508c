use crate::angle::Angle;
use crate::constants::RAD_TO_DEG;

#[inline]
pub fn fmod(x: f64, y: f64) -> f64 {
    libm::fmod(x, y)
}

#[inline]
pub fn vincenty_angular_separation(
    sin_lat1: f64,
    cos_lat1: f64,
    sin_lat2: f64,
    cos_lat2: f64,
    delta_lon: f64,
) -> f64 {
    let (sin_delta_lon, cos_delta_lon) = libm::sincos(delta_lon);

    let num = libm::sqrt(
        (cos_lat2 * sin_delta_lon).powi(2)
            + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta_lon).powi(2),
    );
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta_lon;

    libm::atan2(num, den)
}

/// Great-circle distance between two (RA, Dec) positions, in degrees.
///
/// Uses the Vincenty formula, which stays accurate from sub-milliarcsecond
/// separations up to antipodal points (where the haversine and the plain
/// cosine formula both lose precision).
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let dec1 = Angle::from_degrees(dec1_deg);
    let dec2 = Angle::from_degrees(dec2_deg);
    let delta_lon = Angle::from_degrees(ra2_deg - ra1_deg).radians();

    let (d1_sin, d1_cos) = dec1.sin_cos();
    let (d2_sin, d2_cos) = dec2.sin_cos();

    vincenty_angular_separation(d1_sin, d1_cos, d2_sin, d2_cos, delta_lon) * RAD_TO_DEG
}
