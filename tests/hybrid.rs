//! Hybrid static CPV / flat-plate pipeline over a clear day.

mod common;

use common::{clear_day, simulator};
use cpv_sim::physics::irradiance::DiffuseModel;
use cpv_sim::physics::tracking::Mounting;
use cpv_sim::system::{FlatPlateOptions, IrradianceInput};

const SPILLAGE_FACTOR: f64 = 0.12;

#[test]
fn spillage_is_a_fraction_of_the_plane_beam() {
    let sim = simulator("dni_spillage");
    let (weather, solar) = clear_day(&sim);
    let hybrid = sim
        .hybrid_cpv(&weather, &solar, Mounting::SingleAxis, 1.0, SPILLAGE_FACTOR)
        .unwrap();
    let reference = sim
        .static_cpv(&weather, &solar, Mounting::SingleAxis, 1.0)
        .unwrap();

    assert_eq!(hybrid.spillage.len(), weather.len());
    for i in 0..weather.len() {
        assert!((hybrid.spillage[i] - reference.irradiance[i] * SPILLAGE_FACTOR).abs() < 1e-9);
        assert_eq!(hybrid.power[i], reference.power[i]);
    }
    for (i, sun) in solar.iter().enumerate() {
        if !sun.is_up() {
            assert_eq!(hybrid.spillage[i], 0.0);
        }
    }
    assert!(hybrid.spillage.iter().any(|&s| s > 0.0));
}

#[test]
fn spillage_raises_flat_plate_output() {
    let sim = simulator("dni_spillage");
    let (weather, solar) = clear_day(&sim);
    let options = FlatPlateOptions {
        mounting: Mounting::SingleAxis,
        ..FlatPlateOptions::default()
    };
    let cpv = sim
        .hybrid_cpv(&weather, &solar, options.mounting, 1.0, SPILLAGE_FACTOR)
        .unwrap();
    let dark = vec![0.0; weather.len()];

    let with = sim
        .hybrid_flat_plate(&weather, &solar, &options, &cpv.spillage)
        .unwrap();
    let without = sim
        .hybrid_flat_plate(&weather, &solar, &options, &dark)
        .unwrap();

    for (a, b) in with.power().iter().zip(without.power()) {
        assert!(*a >= b, "{a} < {b}");
    }
    let gain: f64 = with.power().iter().sum::<f64>() - without.power().iter().sum::<f64>();
    assert!(gain > 0.0);
}

#[test]
fn hybrid_flat_plate_matches_static_flat_plate() {
    let sim = simulator("dni_spillage");
    let (weather, solar) = clear_day(&sim);
    let options = FlatPlateOptions {
        diffuse_model: DiffuseModel::Perez,
        ..FlatPlateOptions::default()
    };
    let spillage = sim
        .hybrid_cpv(&weather, &solar, options.mounting, 1.0, SPILLAGE_FACTOR)
        .unwrap()
        .spillage;

    let hybrid = sim
        .hybrid_flat_plate(&weather, &solar, &options, &spillage)
        .unwrap();
    let reference = sim
        .static_flat_plate(&weather, &solar, &options, &spillage)
        .unwrap();

    assert_eq!(hybrid.power(), reference.power);
}

#[test]
fn hybrid_flat_plate_ignores_input_selector() {
    let sim = simulator("dni_spillage");
    let (weather, solar) = clear_day(&sim);
    let spillage = vec![5.0; weather.len()];
    let diffuse = FlatPlateOptions::default();
    let beam = FlatPlateOptions {
        input: IrradianceInput::Dni,
        ..diffuse
    };

    let a = sim
        .hybrid_flat_plate(&weather, &solar, &diffuse, &spillage)
        .unwrap();
    let b = sim
        .hybrid_flat_plate(&weather, &solar, &beam, &spillage)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn both_halves_see_the_same_incidence() {
    let sim = simulator("dni_spillage");
    let (weather, solar) = clear_day(&sim);
    let options = FlatPlateOptions {
        mounting: Mounting::fixed_south(35.0),
        ..FlatPlateOptions::default()
    };
    let cpv = sim
        .hybrid_cpv(&weather, &solar, options.mounting, 1.0, SPILLAGE_FACTOR)
        .unwrap();
    let flat = sim
        .hybrid_flat_plate(&weather, &solar, &options, &cpv.spillage)
        .unwrap();

    assert_eq!(cpv.aoi, flat.aoi);
    assert_eq!(flat.mpp.len(), weather.len());
}

#[test]
fn operating_points_are_consistent() {
    let sim = simulator("dni_spillage");
    let (weather, solar) = clear_day(&sim);
    let spillage = vec![0.0; weather.len()];
    let flat = sim
        .hybrid_flat_plate(&weather, &solar, &FlatPlateOptions::default(), &spillage)
        .unwrap();

    for mpp in flat.mpp.iter().filter(|m| m.p_mp > 0.0) {
        assert!(mpp.i_mp <= mpp.i_sc + 1e-9);
        assert!(mpp.v_mp <= mpp.v_oc + 1e-9);
        assert!((mpp.p_mp - mpp.i_mp * mpp.v_mp).abs() < 1e-6 * mpp.p_mp.max(1.0));
    }
}
