//! Surface orientation for fixed racks and single-axis trackers.
//!
//! The tracker follows the true-tracking law with optional backtracking to
//! avoid row-to-row shading (Marion and Dobos, 2013; Lorenzo et al., 2011).

use serde::Deserialize;

use super::irradiance::aoi;
use super::solar::SolarPosition;

/// Orientation of a module plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOrientation {
    /// Tilt from horizontal (degrees).
    pub tilt: f64,
    /// Azimuth the surface faces (degrees clockwise from north).
    pub azimuth: f64,
}

impl SurfaceOrientation {
    /// Orientation from tilt and azimuth in degrees.
    pub fn new(tilt: f64, azimuth: f64) -> Self {
        Self { tilt, azimuth }
    }
}

/// Single-axis tracker geometry, shared across system types.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerParameters {
    /// Tilt of the rotation axis from horizontal (degrees).
    pub axis_tilt: f64,
    /// Compass direction the axis points to (degrees).
    pub axis_azimuth: f64,
    /// Maximum rotation from horizontal in either direction (degrees).
    pub max_angle: f64,
    /// Whether the tracker backtracks to avoid row shading.
    pub backtrack: bool,
    /// Ground coverage ratio (collector width / row pitch).
    pub gcr: f64,
}

impl Default for TrackerParameters {
    fn default() -> Self {
        Self {
            axis_tilt: 10.0,
            axis_azimuth: 180.0,
            max_angle: 90.0,
            backtrack: true,
            gcr: 2.0 / 7.0,
        }
    }
}

/// Tracker state for one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerOrientation {
    /// Rotation about the axis (degrees, positive = facing west of the axis).
    pub tracker_theta: f64,
    /// Resulting surface orientation.
    pub surface: SurfaceOrientation,
    /// Angle of incidence on the rotated surface (degrees).
    pub aoi: f64,
}

/// Mounting of the module plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mounting {
    /// Fixed rack.
    Fixed { tilt: f64, azimuth: f64 },
    /// Single-axis tracker described by the simulator's [`TrackerParameters`].
    SingleAxis,
}

impl Mounting {
    /// South-facing fixed rack at `tilt`.
    pub fn fixed_south(tilt: f64) -> Self {
        Self::Fixed {
            tilt,
            azimuth: 180.0,
        }
    }

    /// Resolves the surface orientation for one sun position.
    ///
    /// Fixed racks report a rotation of zero and their configured orientation
    /// unchanged.
    pub fn orient(&self, sun: &SolarPosition, tracker: &TrackerParameters) -> TrackerOrientation {
        match *self {
            Self::Fixed { tilt, azimuth } => {
                let surface = SurfaceOrientation::new(tilt, azimuth);
                TrackerOrientation {
                    tracker_theta: 0.0,
                    surface,
                    aoi: aoi(&surface, sun),
                }
            }
            Self::SingleAxis => single_axis(sun, tracker),
        }
    }
}

/// Computes the single-axis tracker orientation for one sun position.
///
/// With the sun at or below the horizon the tracker stows flat.
pub fn single_axis(sun: &SolarPosition, tracker: &TrackerParameters) -> TrackerOrientation {
    let theta = if sun.is_up() {
        tracking_angle(sun, tracker)
    } else {
        0.0
    };
    let surface = surface_from_rotation(theta, tracker.axis_tilt, tracker.axis_azimuth);
    TrackerOrientation {
        tracker_theta: theta,
        surface,
        aoi: aoi(&surface, sun),
    }
}

/// Sun vector in the tracker frame: x across the axis, y along it, z normal.
fn sun_in_tracker_frame(sun: &SolarPosition, tracker: &TrackerParameters) -> [f64; 3] {
    let elevation = sun.elevation().to_radians();
    let az = (sun.azimuth - 180.0).to_radians();
    // Horizontal frame with x towards west and y towards south.
    let x = elevation.cos() * az.sin();
    let y = elevation.cos() * az.cos();
    let z = elevation.sin();

    let (sa, ca) = (tracker.axis_azimuth - 180.0).to_radians().sin_cos();
    let (st, ct) = tracker.axis_tilt.to_radians().sin_cos();

    [
        x * ca - y * sa,
        x * ct * sa + y * ct * ca - z * st,
        x * st * sa + y * st * ca + z * ct,
    ]
}

fn tracking_angle(sun: &SolarPosition, tracker: &TrackerParameters) -> f64 {
    let [xp, _, zp] = sun_in_tracker_frame(sun, tracker);
    let ideal = xp.atan2(zp).to_degrees();

    let theta = if tracker.backtrack && tracker.gcr > 0.0 {
        let axes_distance = 1.0 / tracker.gcr;
        let shade = (axes_distance * ideal.to_radians().cos()).abs();
        if shade < 1.0 {
            ideal - ideal.signum() * shade.acos().to_degrees()
        } else {
            ideal
        }
    } else {
        ideal
    };

    theta.clamp(-tracker.max_angle, tracker.max_angle)
}

/// Surface tilt and azimuth of a tracker rotated by `theta` about its axis.
pub fn surface_from_rotation(theta: f64, axis_tilt: f64, axis_azimuth: f64) -> SurfaceOrientation {
    let (s_theta, c_theta) = theta.to_radians().sin_cos();
    let (sa, ca) = (axis_azimuth - 180.0).to_radians().sin_cos();
    let (st, ct) = axis_tilt.to_radians().sin_cos();

    // Panel normal (sin θ, 0, cos θ) rotated back to the west/south/up frame.
    let west = ca * s_theta + st * sa * c_theta;
    let south = -sa * s_theta + st * ca * c_theta;
    let up = ct * c_theta;

    let tilt = up.clamp(-1.0, 1.0).acos().to_degrees();
    let azimuth = if west.abs() < 1e-12 && south.abs() < 1e-12 {
        axis_azimuth
    } else {
        (-west).atan2(-south).to_degrees().rem_euclid(360.0)
    };
    SurfaceOrientation { tilt, azimuth }
}
