//! Incidence angle modifiers.

use serde::Deserialize;

use crate::error::{ModelError, ModelResult};

/// Default Martin-Ruiz angular losses coefficient.
pub const MARTIN_RUIZ_DEFAULT_AR: f64 = 0.16;

/// Angular loss model applied to usable irradiance.
#[derive(Debug, Clone, PartialEq)]
pub enum IamModel {
    /// Martin and Ruiz (2001) analytic model.
    MartinRuiz { a_r: f64 },
    /// Piecewise-linear table keyed by incidence angle.
    Table(IamTable),
}

impl IamModel {
    /// Martin-Ruiz model with the glass-covered module coefficient.
    pub fn martin_ruiz_default() -> Self {
        Self::MartinRuiz {
            a_r: MARTIN_RUIZ_DEFAULT_AR,
        }
    }

    /// Modifier for an incidence angle in degrees.
    pub fn modifier(&self, aoi: f64) -> f64 {
        match self {
            Self::MartinRuiz { a_r } => martin_ruiz(aoi, *a_r),
            Self::Table(table) => table.modifier(aoi),
        }
    }
}

/// Martin-Ruiz modifier; zero at or beyond grazing incidence.
pub fn martin_ruiz(aoi: f64, a_r: f64) -> f64 {
    if aoi.abs() >= 90.0 {
        return 0.0;
    }
    let cos_aoi = aoi.to_radians().cos();
    (1.0 - (-cos_aoi / a_r).exp()) / (1.0 - (-1.0 / a_r).exp())
}

/// Measured IAM curve, interpolated linearly and normalized to normal incidence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "IamTableSpec")]
pub struct IamTable {
    theta_ref: Vec<f64>,
    iam_ref: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IamTableSpec {
    theta_ref: Vec<f64>,
    iam_ref: Vec<f64>,
}

impl TryFrom<IamTableSpec> for IamTable {
    type Error = ModelError;

    fn try_from(spec: IamTableSpec) -> Result<Self, Self::Error> {
        Self::new(spec.theta_ref, spec.iam_ref)
    }
}

impl IamTable {
    /// Builds a table from reference angles (degrees) and modifiers.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidIamTable` if the vectors differ in length,
    /// hold fewer than two points, or the angles are not strictly increasing.
    pub fn new(theta_ref: Vec<f64>, iam_ref: Vec<f64>) -> ModelResult<Self> {
        if theta_ref.len() != iam_ref.len() {
            return Err(ModelError::InvalidIamTable(format!(
                "{} angles but {} modifiers",
                theta_ref.len(),
                iam_ref.len()
            )));
        }
        if theta_ref.len() < 2 {
            return Err(ModelError::InvalidIamTable(
                "at least two points are required".into(),
            ));
        }
        if theta_ref.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ModelError::InvalidIamTable(
                "angles must be strictly increasing".into(),
            ));
        }
        Ok(Self { theta_ref, iam_ref })
    }

    /// Coarse concentrator curve: flat to 30°, cut off at 75°.
    pub fn concentrator_coarse() -> Self {
        Self {
            theta_ref: vec![0.0, 30.0, 55.0, 75.0],
            iam_ref: vec![1.0, 1.0, 0.9, 0.0],
        }
    }

    /// Measured concentrator curve in 5° steps up to 60°.
    pub fn concentrator_measured() -> Self {
        Self {
            theta_ref: (0..=12).map(|i| f64::from(i) * 5.0).collect(),
            iam_ref: vec![
                1.000, 1.007, 0.998, 0.991, 0.971, 0.966, 0.938, 0.894, 0.830, 0.790, 0.740,
                0.649, 0.387,
            ],
        }
    }

    /// Measured incidence angles (degrees).
    pub fn theta_ref(&self) -> &[f64] {
        &self.theta_ref
    }

    /// Modifier measured at each of [`Self::theta_ref`].
    pub fn iam_ref(&self) -> &[f64] {
        &self.iam_ref
    }

    /// Linear interpolation with linear extrapolation at both ends.
    fn interpolate(&self, x: f64) -> f64 {
        let n = self.theta_ref.len();
        let i = match self.theta_ref.iter().position(|&t| t > x) {
            Some(0) => 0,
            Some(i) => i - 1,
            None => n - 2,
        };
        let (x0, x1) = (self.theta_ref[i], self.theta_ref[i + 1]);
        let (y0, y1) = (self.iam_ref[i], self.iam_ref[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Modifier for an incidence angle, clipped at zero.
    pub fn modifier(&self, aoi: f64) -> f64 {
        let norm = self.interpolate(0.0);
        let iam = self.interpolate(aoi.abs()).max(0.0);
        if norm > 0.0 { iam / norm } else { iam }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coarse_table() -> IamTable {
        IamTable::new(vec![0.0, 30.0, 55.0, 75.0], vec![1.0, 1.0, 0.9, 0.0]).unwrap()
    }

    #[test]
    fn martin_ruiz_is_one_at_normal_incidence() {
        assert!((martin_ruiz(0.0, 0.16) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn martin_ruiz_decreases_with_angle() {
        let a = martin_ruiz(30.0, 0.16);
        let b = martin_ruiz(60.0, 0.16);
        let c = martin_ruiz(85.0, 0.16);
        assert!(a > b && b > c && c > 0.0);
        assert!(a > 0.99);
    }

    #[test]
    fn martin_ruiz_zero_beyond_grazing() {
        assert_eq!(martin_ruiz(90.0, 0.16), 0.0);
        assert_eq!(martin_ruiz(120.0, 0.16), 0.0);
    }

    #[test]
    fn table_interpolates_between_points() {
        let t = coarse_table();
        assert!((t.modifier(15.0) - 1.0).abs() < 1e-12);
        assert!((t.modifier(42.5) - 0.95).abs() < 1e-12);
        assert!((t.modifier(65.0) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn table_extrapolates_and_clips_at_zero() {
        let t = coarse_table();
        assert_eq!(t.modifier(80.0), 0.0);
        assert_eq!(t.modifier(120.0), 0.0);
    }

    #[test]
    fn table_is_normalized_to_normal_incidence() {
        let t = IamTable::new(vec![0.0, 60.0], vec![0.8, 0.4]).unwrap();
        assert!((t.modifier(0.0) - 1.0).abs() < 1e-12);
        assert!((t.modifier(30.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn table_rejects_mismatched_lengths() {
        assert!(IamTable::new(vec![0.0, 10.0], vec![1.0]).is_err());
    }

    #[test]
    fn table_rejects_unsorted_angles() {
        assert!(IamTable::new(vec![0.0, 20.0, 10.0], vec![1.0, 0.9, 0.8]).is_err());
    }

    #[test]
    fn built_in_tables_are_valid() {
        for t in [IamTable::concentrator_coarse(), IamTable::concentrator_measured()] {
            let rebuilt = IamTable::new(t.theta_ref().to_vec(), t.iam_ref().to_vec()).unwrap();
            assert_eq!(rebuilt, t);
        }
        assert_eq!(IamTable::concentrator_coarse(), coarse_table());
    }

    #[test]
    fn measured_table_extrapolates_past_last_point() {
        let t = IamTable::concentrator_measured();
        // Slope between 55° and 60° is (0.387 - 0.649) / 5 per degree.
        let expected = 0.387 + (0.387 - 0.649) / 5.0 * 2.0;
        assert!((t.modifier(62.0) - expected).abs() < 1e-12);
        assert_eq!(t.modifier(80.0), 0.0);
    }

    #[test]
    fn model_dispatch() {
        let table = IamModel::Table(coarse_table());
        assert!((table.modifier(65.0) - 0.45).abs() < 1e-12);
        let mr = IamModel::martin_ruiz_default();
        assert!((mr.modifier(60.0) - martin_ruiz(60.0, MARTIN_RUIZ_DEFAULT_AR)).abs() < 1e-15);
    }
}
