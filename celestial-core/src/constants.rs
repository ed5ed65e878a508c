#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

#[allow(clippy::excessive_precision)]
pub const ARCSEC_TO_RAD: f64 = 4.848136811095359935899141e-6;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

pub const ARCMIN_PER_DEGREE: f64 = 60.0;

/// Square degrees in one steradian, `(180/π)²`.
#[allow(clippy::excessive_precision)]
pub const SQ_DEG_PER_STERADIAN: f64 = 3282.806350011743794781695;

/// Solid angle of the whole sphere in steradians.
pub const FULL_SPHERE_SR: f64 = 2.0 * TWOPI;
