//! Plane-of-array irradiance: incidence geometry and sky diffuse models.
//!
//! References:
//! - Hay, J. E. and Davies, J. A. (1980). "Calculations of the solar
//!   radiation incident on an inclined surface"
//! - Klucher, T. M. (1979). "Evaluation of models to predict insolation on
//!   tilted surfaces"
//! - Reindl, D. T. et al. (1990). "Evaluation of hourly tilted surface
//!   radiation models"
//! - Perez, R. et al. (1990). "Modeling daylight availability and irradiance
//!   components from direct and global irradiance"

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::solar::SolarPosition;
use super::tracking::SurfaceOrientation;
use crate::error::ModelError;

/// Default ground albedo.
pub const DEFAULT_ALBEDO: f64 = 0.25;

/// Sky diffuse transposition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffuseModel {
    #[default]
    Isotropic,
    Klucher,
    HayDavies,
    Reindl,
    King,
    Perez,
}

impl DiffuseModel {
    /// Accepted names, in variant order.
    pub const NAMES: &[&str] = &["isotropic", "klucher", "haydavies", "reindl", "king", "perez"];

    /// Lowercase name, as parsed by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Isotropic => "isotropic",
            Self::Klucher => "klucher",
            Self::HayDavies => "haydavies",
            Self::Reindl => "reindl",
            Self::King => "king",
            Self::Perez => "perez",
        }
    }
}

impl fmt::Display for DiffuseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiffuseModel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "isotropic" => Ok(Self::Isotropic),
            "klucher" => Ok(Self::Klucher),
            "haydavies" => Ok(Self::HayDavies),
            "reindl" => Ok(Self::Reindl),
            "king" => Ok(Self::King),
            "perez" => Ok(Self::Perez),
            _ => Err(ModelError::UnknownDiffuseModel(s.to_string())),
        }
    }
}

/// Horizontal irradiance components and atmospheric state for one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyIrradiance {
    pub ghi: f64,
    pub dhi: f64,
    pub dni: f64,
    /// Extraterrestrial normal irradiance (W/m²).
    pub dni_extra: f64,
    /// Relative airmass, `None` with the sun below the horizon.
    pub airmass: Option<f64>,
    pub albedo: f64,
}

/// Plane-of-array irradiance decomposition (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoaIrradiance {
    pub global: f64,
    pub direct: f64,
    pub diffuse: f64,
    pub sky_diffuse: f64,
    pub ground_diffuse: f64,
}

/// Cosine of the angle of incidence, unclipped.
pub fn aoi_projection(surface: &SurfaceOrientation, sun: &SolarPosition) -> f64 {
    let (sz, cz) = sun.zenith.to_radians().sin_cos();
    let (st, ct) = surface.tilt.to_radians().sin_cos();
    let cos_aoi = cz * ct + sz * st * (sun.azimuth - surface.azimuth).to_radians().cos();
    cos_aoi.clamp(-1.0, 1.0)
}

/// Angle of incidence between the sun vector and the surface normal (degrees).
pub fn aoi(surface: &SurfaceOrientation, sun: &SolarPosition) -> f64 {
    aoi_projection(surface, sun).acos().to_degrees()
}

/// Direct beam irradiance on the surface, `max(dni * cos(aoi), 0)`.
pub fn beam_component(surface: &SurfaceOrientation, sun: &SolarPosition, dni: f64) -> f64 {
    (dni * aoi_projection(surface, sun)).max(0.0)
}

/// Ground-reflected irradiance for a uniform albedo.
pub fn ground_diffuse(tilt: f64, ghi: f64, albedo: f64) -> f64 {
    ghi * albedo * (1.0 - tilt.to_radians().cos()) * 0.5
}

/// Sky diffuse irradiance on the surface for the chosen model.
pub fn sky_diffuse(
    model: DiffuseModel,
    surface: &SurfaceOrientation,
    sun: &SolarPosition,
    sky: &SkyIrradiance,
) -> f64 {
    let tilt = surface.tilt.to_radians();
    let isotropic_view = 0.5 * (1.0 + tilt.cos());
    match model {
        DiffuseModel::Isotropic => sky.dhi * isotropic_view,
        DiffuseModel::Klucher => {
            let f = if sky.ghi > 0.0 {
                1.0 - (sky.dhi / sky.ghi).powi(2)
            } else {
                0.0
            };
            let cos_aoi = aoi_projection(surface, sun);
            let term2 = 1.0 + f * (0.5 * tilt).sin().powi(3);
            let term3 = 1.0 + f * cos_aoi.powi(2) * sun.zenith.to_radians().sin().powi(3);
            (sky.dhi * isotropic_view * term2 * term3).max(0.0)
        }
        DiffuseModel::HayDavies => {
            let ai = anisotropy_index(sky);
            let rb = beam_ratio(surface, sun);
            (sky.dhi * (ai * rb + (1.0 - ai) * isotropic_view)).max(0.0)
        }
        DiffuseModel::Reindl => {
            let ai = anisotropy_index(sky);
            let rb = beam_ratio(surface, sun);
            let hb = (sky.dni * sun.zenith.to_radians().cos()).max(0.0);
            let modulation = if sky.ghi > 0.0 {
                (hb / sky.ghi).sqrt()
            } else {
                0.0
            };
            let term3 = 1.0 + modulation * (0.5 * tilt).sin().powi(3);
            (sky.dhi * (ai * rb + (1.0 - ai) * isotropic_view * term3)).max(0.0)
        }
        DiffuseModel::King => {
            let horizon = sky.ghi * (0.012 * sun.zenith - 0.04) * (1.0 - tilt.cos()) * 0.5;
            (sky.dhi * isotropic_view + horizon).max(0.0)
        }
        DiffuseModel::Perez => perez(surface, sun, sky),
    }
}

/// Total plane-of-array irradiance with the given sky diffuse model.
pub fn total_irradiance(
    model: DiffuseModel,
    surface: &SurfaceOrientation,
    sun: &SolarPosition,
    sky: &SkyIrradiance,
) -> PoaIrradiance {
    let direct = beam_component(surface, sun, sky.dni);
    let sky_diffuse = sky_diffuse(model, surface, sun, sky);
    let ground_diffuse = ground_diffuse(surface.tilt, sky.ghi, sky.albedo);
    let diffuse = sky_diffuse + ground_diffuse;
    PoaIrradiance {
        global: direct + diffuse,
        direct,
        diffuse,
        sky_diffuse,
        ground_diffuse,
    }
}

/// Irradiance reaching the flat plate of a static CPV hybrid.
///
/// Inside the CPV acceptance (`aoi <= aoi_limit`) the beam is taken by the
/// concentrator and only the diffuse part reaches the flat plate; outside it
/// the flat plate sees the full global irradiance.
pub fn hybrid_flat_plate_irradiance(poa: &PoaIrradiance, aoi: f64, aoi_limit: f64) -> f64 {
    if aoi > aoi_limit {
        poa.global
    } else {
        poa.diffuse
    }
}

fn anisotropy_index(sky: &SkyIrradiance) -> f64 {
    if sky.dni_extra > 0.0 {
        sky.dni / sky.dni_extra
    } else {
        0.0
    }
}

/// Ratio of tilted to horizontal beam irradiance.
fn beam_ratio(surface: &SurfaceOrientation, sun: &SolarPosition) -> f64 {
    let cos_aoi = aoi_projection(surface, sun).max(0.0);
    let cos_zenith = sun.zenith.to_radians().cos().max(0.017_45);
    cos_aoi / cos_zenith
}

/// Sky clearness bin edges.
const PEREZ_EPSILON_BINS: [f64; 7] = [1.065, 1.23, 1.5, 1.95, 2.8, 4.5, 6.2];

/// All-sites composite 1990 coefficients, `[f11, f12, f13]` per clearness bin.
const PEREZ_F1: [[f64; 3]; 8] = [
    [-0.008_311_7, 0.587_728_5, -0.062_063_6],
    [0.129_945_7, 0.682_595_4, -0.151_375_2],
    [0.329_695_8, 0.486_873_5, -0.221_095_8],
    [0.568_205_3, 0.187_452_5, -0.295_129_0],
    [0.873_028_0, -0.392_040_3, -0.361_614_9],
    [1.132_607_7, -1.236_728_4, -0.411_849_4],
    [1.060_159_1, -1.599_913_7, -0.358_922_1],
    [0.677_747_0, -0.327_258_8, -0.250_428_6],
];

/// All-sites composite 1990 coefficients, `[f21, f22, f23]` per clearness bin.
const PEREZ_F2: [[f64; 3]; 8] = [
    [-0.059_601_2, 0.072_124_9, -0.022_021_6],
    [-0.018_932_5, 0.065_965_0, -0.028_874_8],
    [0.055_414_0, -0.063_958_8, -0.026_054_2],
    [0.108_863_1, -0.151_922_9, -0.013_975_4],
    [0.225_564_7, -0.462_044_2, 0.001_244_8],
    [0.287_781_3, -0.823_035_7, 0.055_865_1],
    [0.264_212_4, -1.127_234_0, 0.131_069_4],
    [0.156_131_3, -1.376_503_1, 0.250_621_2],
];

fn perez(surface: &SurfaceOrientation, sun: &SolarPosition, sky: &SkyIrradiance) -> f64 {
    if sky.dhi <= 0.0 {
        return 0.0;
    }
    const KAPPA: f64 = 1.041;
    let z = sun.zenith.to_radians();
    let delta = match sky.airmass {
        Some(am) if sky.dni_extra > 0.0 => sky.dhi * am / sky.dni_extra,
        _ => 0.0,
    };
    let kz3 = KAPPA * z.powi(3);
    let epsilon = ((sky.dhi + sky.dni) / sky.dhi + kz3) / (1.0 + kz3);
    let bin = PEREZ_EPSILON_BINS
        .iter()
        .take_while(|&&edge| epsilon >= edge)
        .count();

    let [f11, f12, f13] = PEREZ_F1[bin];
    let [f21, f22, f23] = PEREZ_F2[bin];
    let f1 = (f11 + f12 * delta + f13 * z).max(0.0);
    let f2 = f21 + f22 * delta + f23 * z;

    let tilt = surface.tilt.to_radians();
    let a = aoi_projection(surface, sun).max(0.0);
    let b = z.cos().max(85.0_f64.to_radians().cos());

    let term1 = 0.5 * (1.0 - f1) * (1.0 + tilt.cos());
    let term2 = f1 * a / b;
    let term3 = f2 * tilt.sin();
    (sky.dhi * (term1 + term2 + term3)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_sky() -> SkyIrradiance {
        SkyIrradiance {
            ghi: 900.0,
            dhi: 200.0,
            dni: 800.0,
            dni_extra: 1367.0,
            airmass: Some(1.15),
            albedo: DEFAULT_ALBEDO,
        }
    }

    fn south(tilt: f64) -> SurfaceOrientation {
        SurfaceOrientation::new(tilt, 180.0)
    }

    #[test]
    fn aoi_on_horizontal_surface_equals_zenith() {
        let sun = SolarPosition::new(37.0, 123.0);
        assert!((aoi(&south(0.0), &sun) - 37.0).abs() < 1e-9);
    }

    #[test]
    fn aoi_zero_when_surface_faces_sun() {
        let sun = SolarPosition::new(30.0, 180.0);
        assert!(aoi(&south(30.0), &sun) < 1e-4);
    }

    #[test]
    fn beam_component_never_negative() {
        let sun = SolarPosition::new(60.0, 0.0);
        assert_eq!(beam_component(&south(80.0), &sun, 800.0), 0.0);
    }

    #[test]
    fn ground_diffuse_zero_for_horizontal() {
        assert_eq!(ground_diffuse(0.0, 900.0, 0.25), 0.0);
        assert!((ground_diffuse(90.0, 900.0, 0.25) - 112.5).abs() < 1e-9);
    }

    #[test]
    fn all_models_agree_on_horizontal_surface() {
        let sun = SolarPosition::new(30.0, 180.0);
        let sky = clear_sky();
        for name in DiffuseModel::NAMES {
            let model: DiffuseModel = name.parse().unwrap();
            let d = sky_diffuse(model, &south(0.0), &sun, &sky);
            if model == DiffuseModel::Klucher {
                // Circumsolar term does not vanish for a horizontal plane.
                assert!(d > sky.dhi && d < 1.2 * sky.dhi, "{model}: {d}");
            } else {
                assert!((d - sky.dhi).abs() < 1e-6, "{model}: {d}");
            }
        }
    }

    #[test]
    fn anisotropic_models_exceed_isotropic_facing_sun() {
        let sun = SolarPosition::new(30.0, 180.0);
        let sky = clear_sky();
        let iso = sky_diffuse(DiffuseModel::Isotropic, &south(30.0), &sun, &sky);
        for model in [DiffuseModel::HayDavies, DiffuseModel::Reindl, DiffuseModel::Perez] {
            let d = sky_diffuse(model, &south(30.0), &sun, &sky);
            assert!(d > iso, "{model}: {d} <= {iso}");
        }
    }

    #[test]
    fn sky_diffuse_reference_values_facing_sun() {
        // Zenith 30°, south surface tilted 30° (normal incidence).
        let sun = SolarPosition::new(30.0, 180.0);
        let sky = clear_sky();
        let expected = [
            (DiffuseModel::Isotropic, 186.602_540),
            (DiffuseModel::Klucher, 212.216_913),
            // 200 * (ai * rb + (1 - ai) * iv), ai = 800/1367, rb = 1/cos 30°
            (DiffuseModel::HayDavies, 212.549_910),
            (DiffuseModel::Reindl, 213.727_271),
            (DiffuseModel::King, 205.894_882),
            // Clearness 4.48 falls in the sixth bin, brightness 0.168.
            (DiffuseModel::Perez, 235.888_164),
        ];
        for (model, value) in expected {
            let d = sky_diffuse(model, &south(30.0), &sun, &sky);
            assert!((d - value).abs() < 1e-5, "{model}: {d} vs {value}");
        }
    }

    #[test]
    fn total_irradiance_is_sum_of_components() {
        let sun = SolarPosition::new(30.0, 180.0);
        let poa = total_irradiance(DiffuseModel::HayDavies, &south(30.0), &sun, &clear_sky());
        assert!((poa.global - (poa.direct + poa.sky_diffuse + poa.ground_diffuse)).abs() < 1e-9);
        assert!((poa.direct - 800.0).abs() < 1e-6);
    }

    #[test]
    fn hybrid_selection_switches_at_aoi_limit() {
        let poa = PoaIrradiance {
            global: 1000.0,
            direct: 800.0,
            diffuse: 200.0,
            sky_diffuse: 180.0,
            ground_diffuse: 20.0,
        };
        assert_eq!(hybrid_flat_plate_irradiance(&poa, 10.0, 55.0), 200.0);
        assert_eq!(hybrid_flat_plate_irradiance(&poa, 55.0, 55.0), 200.0);
        assert_eq!(hybrid_flat_plate_irradiance(&poa, 60.0, 55.0), 1000.0);
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        let err = "bogus".parse::<DiffuseModel>().unwrap_err();
        assert_eq!(err, ModelError::UnknownDiffuseModel("bogus".into()));
    }

    #[test]
    fn perez_handles_night() {
        let sun = SolarPosition::new(100.0, 0.0);
        let sky = SkyIrradiance {
            ghi: 0.0,
            dhi: 0.0,
            dni: 0.0,
            airmass: None,
            ..clear_sky()
        };
        assert_eq!(sky_diffuse(DiffuseModel::Perez, &south(30.0), &sun, &sky), 0.0);
    }
}
