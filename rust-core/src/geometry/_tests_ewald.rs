#[cfg(test)]
mod _tests_ewald {
    use super::super::beam::Beam;
    use super::super::crystal::Crystal;
    use super::super::detector::{Detector, Panel};
    use super::super::ewald::*;
    use super::super::partiality::PartialityModel;
    use super::super::reflection::MillerIndex;
    use crate::cell::{Centering, UnitCell};
    use crate::interfaces::{DetectorModel, SymmetryOperations};
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector2, Vector3};

    const LAMBDA: f64 = 1.3e-10;
    const PR: f64 = 1e8;

    fn cubic_cell(a: f64) -> UnitCell {
        let right = 90f64.to_radians();
        let cell = UnitCell::from_parameters(a, a, a, right, right, right)
            .unwrap()
            .classified();
        // Off-axis orientation so that no row of points lies along the beam
        let quat = UnitQuaternion::from_euler_angles(0.31, 0.17, 0.05);
        cell.rotated(&quat).unwrap()
    }

    fn crystal() -> Crystal {
        Crystal::new(cubic_cell(20e-10), 1e-3, PR)
    }

    fn detector() -> Detector {
        Detector::new(vec![Panel::new(
            "q0",
            (0.0, 1023.0),
            (0.0, 1023.0),
            Vector2::new(-512.0, -512.0),
            0.1,
            1e4,
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        )
        .unwrap()])
    }

    struct NothingAllowed;

    impl SymmetryOperations for NothingAllowed {
        fn is_forbidden_reflection(&self, _cell: &UnitCell, _h: i32, _k: i32, _l: i32) -> bool {
            true
        }
    }

    #[test]
    fn test_beam_wavenumbers() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        assert_relative_eq!(beam.k(), 1.0 / LAMBDA);
        assert!(beam.k_low() > beam.k());
        assert!(beam.k_high() < beam.k());
        assert_relative_eq!(beam.k_low(), 1.0 / (LAMBDA * 0.995), max_relative = 1e-12);

        assert!(Beam::new(-1.0, 0.0, 0.0).is_err());
        assert!(Beam::new(LAMBDA, -0.1, 0.0).is_err());
        assert!(Beam::new(LAMBDA, 0.0, -1e-3).is_err());
    }

    #[test]
    fn test_unity_monochromatic_prediction() {
        let beam = Beam::monochromatic(LAMBDA).unwrap();
        let crystal = Crystal::new(cubic_cell(20e-10), 0.0, PR);

        let list = find_intersections(&crystal, &beam, None, PartialityModel::Unity).unwrap();
        assert!(!list.is_empty());
        assert!(list.find(0, 0, 0).is_none());
        for refl in list.iter() {
            assert_eq!(refl.partiality, 1.0);
            assert_eq!(refl.redundancy, 1);
            assert_eq!(refl.lorentz, 1.0);
            assert_eq!(refl.symmetric_indices, refl.indices());
            assert!(refl.detector_position.is_none());
            assert_eq!(refl.r_low, refl.r_high);
        }
    }

    #[test]
    fn test_predicted_reflections_are_excited() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        let crystal = crystal();
        let list = find_intersections(&crystal, &beam, None, PartialityModel::Sphere).unwrap();
        assert!(!list.is_empty());

        for refl in list.iter() {
            assert!(refl.r_low >= refl.r_high);
            let outside_low = refl.r_low.abs() > PR && refl.r_high.abs() > PR;
            assert!(!(outside_low && refl.r_low.signum() == refl.r_high.signum()));
            assert!(refl.partiality > 0.0 && refl.partiality <= 1.0 + 1e-12);

            // Not backscattering
            let hkl = refl.indices();
            let q = crystal.cell.reciprocal_position(hkl.h, hkl.k, hkl.l);
            assert!(q.z >= -beam.k_high() / 2.0);
        }
    }

    #[test]
    fn test_wider_bandwidth_excites_more() {
        let crystal = crystal();
        let narrow = Beam::new(LAMBDA, 0.001, 0.0).unwrap();
        let wide = Beam::new(LAMBDA, 0.05, 0.0).unwrap();

        let n_narrow = find_intersections(&crystal, &narrow, None, PartialityModel::Sphere)
            .unwrap()
            .len();
        let n_wide = find_intersections(&crystal, &wide, None, PartialityModel::Sphere)
            .unwrap()
            .len();
        assert!(n_wide > n_narrow);
    }

    #[test]
    fn test_check_reflection_directly() {
        let beam = Beam::new(LAMBDA, 0.01, 0.0).unwrap();
        let crystal = Crystal::new(cubic_cell(20e-10), 0.0, PR);
        let k = beam.k();

        // A point exactly on the central Ewald sphere, 20° off the beam
        let tt = 20f64.to_radians();
        let q = Vector3::new(k * tt.sin(), 0.0, k * (tt.cos() - 1.0));
        let refl = check_reflection(
            &crystal,
            &beam,
            None,
            PartialityModel::Sphere,
            MillerIndex::new(1, 2, 3),
            &q,
        )
        .unwrap();
        assert!(refl.r_low > 0.0 && refl.r_high < 0.0);
        assert_eq!(refl.indices(), MillerIndex::new(1, 2, 3));

        // Origin is never predicted
        let origin = check_reflection(
            &crystal,
            &beam,
            None,
            PartialityModel::Unity,
            MillerIndex::new(0, 0, 0),
            &Vector3::zeros(),
        );
        assert!(origin.is_none());

        // Backscattering
        let back = Vector3::new(0.0, 0.0, -0.9 * k);
        assert!(check_reflection(
            &crystal,
            &beam,
            None,
            PartialityModel::Unity,
            MillerIndex::new(1, 0, 0),
            &back
        )
        .is_none());

        // Well outside the sphere
        let inside = Vector3::new(0.5 * k, 0.0, 0.0);
        assert!(check_reflection(
            &crystal,
            &beam,
            None,
            PartialityModel::Unity,
            MillerIndex::new(1, 0, 0),
            &inside
        )
        .is_none());
    }

    #[test]
    fn test_centering_absences_respected() {
        let beam = Beam::new(LAMBDA, 0.02, 1e-3).unwrap();
        let cell = cubic_cell(20e-10).with_centering(Centering::BodyCentered);
        let crystal = Crystal::new(cell, 1e-3, PR);

        let list = find_intersections(&crystal, &beam, None, PartialityModel::Sphere).unwrap();
        assert!(!list.is_empty());
        for refl in list.iter() {
            let hkl = refl.indices();
            assert_eq!((hkl.h + hkl.k + hkl.l).rem_euclid(2), 0);
        }

        let none = find_intersections_with_symmetry(
            &crystal,
            &beam,
            None,
            PartialityModel::Sphere,
            &NothingAllowed,
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_index_box_clipped_for_long_axis() {
        // a spans ~10000 orders at the default resolution, b and c only one
        let right = 90f64.to_radians();
        let cell = UnitCell::from_parameters(1e-6, 1.5e-10, 1.5e-10, right, right, right)
            .unwrap()
            .classified();
        let crystal = Crystal::new(cell, 0.0, PR);
        let beam = Beam::monochromatic(LAMBDA).unwrap();

        let list = find_intersections(&crystal, &beam, None, PartialityModel::Unity).unwrap();
        assert!(!list.is_empty());

        let mut max_h = 0;
        for refl in list.iter() {
            let hkl = refl.indices();
            assert!(hkl.h.abs() <= 511);
            assert!(hkl.k.abs() <= 1);
            assert!(hkl.l.abs() <= 1);
            max_h = max_h.max(hkl.h.abs());
        }

        // Low-order rows along a* sit on the sphere, so the clip itself is reached
        assert_eq!(max_h, 511);
        assert!(list.contains(511, 0, 0));
        assert!(list.contains(-511, 0, 0));
        assert!(!list.contains(512, 0, 0));
    }

    #[test]
    fn test_detector_projection() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        let crystal = crystal();
        let det = detector();

        let with_det =
            find_intersections(&crystal, &beam, Some(&det), PartialityModel::Sphere).unwrap();
        let without =
            find_intersections(&crystal, &beam, None, PartialityModel::Sphere).unwrap();
        assert!(!with_det.is_empty());
        assert!(with_det.len() <= without.len());

        let mres = det.largest_q(LAMBDA);
        for refl in with_det.iter() {
            let pos = refl.detector_position.unwrap();
            assert_eq!(pos.panel, 0);
            assert!((0.0..=1023.0).contains(&pos.fs));
            assert!((0.0..=1023.0).contains(&pos.ss));

            let hkl = refl.indices();
            assert!(crystal.cell.reciprocal_position(hkl.h, hkl.k, hkl.l).norm() <= mres * 1.05);
        }
    }

    #[test]
    fn test_update_unperturbed() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        let mut crystal = crystal();
        let list = find_intersections(&crystal, &beam, None, PartialityModel::Sphere).unwrap();
        crystal.reflections = list.clone();

        let stats = update_partialities(&mut crystal, &beam, None, PartialityModel::Sphere);
        assert_eq!(stats.n_gained, 0);
        assert_eq!(stats.n_lost, 0);
        assert_relative_eq!(stats.mean_change, 0.0, epsilon = 1e-12);
        assert_eq!(crystal.reflections, list);
    }

    #[test]
    fn test_update_after_rotation() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        let original = crystal();
        let list = find_intersections(&original, &beam, None, PartialityModel::Sphere).unwrap();
        let n_predicted = list.len();

        let quat = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 5f64.to_radians());
        let mut turned = original.clone().with_reflections(list);
        turned.cell = original.cell.rotated(&quat).unwrap();

        let stats = update_partialities(&mut turned, &beam, None, PartialityModel::Sphere);
        assert_eq!(stats.n_gained, 0);
        assert!(stats.n_lost > 0);
        assert_eq!(turned.reflections.len(), n_predicted);
        for refl in turned.reflections.iter().filter(|r| r.redundancy == 0) {
            assert_eq!(refl.partiality, 0.0);
        }

        // Turning back recovers everything that was lost
        turned.cell = original.cell.clone();
        let back = update_partialities(&mut turned, &beam, None, PartialityModel::Sphere);
        assert_eq!(back.n_gained, stats.n_lost);
        assert_eq!(back.n_lost, 0);
        assert!(turned.reflections.iter().all(|r| r.redundancy == 1));
    }

    #[test]
    fn test_update_unity_shortcut() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        let mut crystal = crystal();
        crystal.reflections = find_intersections(&crystal, &beam, None, PartialityModel::Sphere).unwrap();
        crystal.reflections.add(50, 50, 50).partiality = 0.1;

        let stats = update_partialities(&mut crystal, &beam, None, PartialityModel::Unity);
        assert_eq!(stats, PartialityUpdate::default());
        assert!(crystal
            .reflections
            .iter()
            .all(|r| r.partiality == 1.0 && r.lorentz == 1.0));
    }

    #[test]
    fn test_update_empty_list() {
        let beam = Beam::new(LAMBDA, 0.01, 1e-3).unwrap();
        let mut crystal = crystal();
        let stats = update_partialities(&mut crystal, &beam, None, PartialityModel::Gaussian);
        assert_eq!(stats.mean_change, 0.0);
    }
}
