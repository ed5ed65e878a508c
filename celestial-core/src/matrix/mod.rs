//! Cartesian vector math on the unit sphere.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Vector3`] | Direction vectors for sky positions and trixel vertices |

mod vector3;

pub use vector3::Vector3;
