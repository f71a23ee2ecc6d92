#[cfg(test)]
mod _tests_polarisation {
    use super::super::beam::Beam;
    use super::super::polarisation::*;
    use super::super::reflection::ReflectionList;
    use crate::cell::UnitCell;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const LAMBDA: f64 = 1.3e-10;

    fn cell() -> UnitCell {
        let right = 90f64.to_radians();
        UnitCell::from_parameters(15e-10, 25e-10, 35e-10, right, right, right).unwrap()
    }

    #[test]
    fn test_factor_in_polarisation_plane() {
        let k = 1.0 / LAMBDA;
        // φ = 0: the factor reduces to cos²(2θ)
        let q = Vector3::new(0.2 * k, 0.0, -0.02 * k);
        let cos_tt = (q.z + k) / q.x.hypot(q.z + k);
        assert_relative_eq!(polarisation_factor(&q, LAMBDA), cos_tt * cos_tt, epsilon = 1e-12);
    }

    #[test]
    fn test_factor_perpendicular_plane() {
        let k = 1.0 / LAMBDA;
        // φ = 90°: 1 - 2 cos²(2θ) + 1 + cos²(2θ)
        let q = Vector3::new(0.0, 0.2 * k, -0.02 * k);
        let cos_tt = (q.z + k) / q.y.hypot(q.z + k);
        let expected = 2.0 - cos_tt * cos_tt;
        assert_relative_eq!(polarisation_factor(&q, LAMBDA), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_correction_round_trip() {
        let cell = cell();
        let beam = Beam::new(LAMBDA, 0.01, 0.0).unwrap();

        let mut list = ReflectionList::new();
        for (h, k, l) in [(1, 0, 0), (0, 3, -1), (2, -2, 1), (-1, 1, 4)] {
            list.add(h, k, l).intensity = 1000.0 + h as f64;
        }
        let original = list.clone();

        polarisation_correction(&mut list, &cell, &beam);

        for refl in list.iter() {
            let hkl = refl.indices();
            let q = cell.reciprocal_position(hkl.h, hkl.k, hkl.l);
            let restored = refl.intensity * polarisation_factor(&q, LAMBDA);
            let before = original.find(hkl.h, hkl.k, hkl.l).unwrap().intensity;
            assert_relative_eq!(restored, before, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_correction_only_touches_intensity() {
        let cell = cell();
        let beam = Beam::monochromatic(LAMBDA).unwrap();

        let mut list = ReflectionList::new();
        let refl = list.add(1, 1, 0);
        refl.intensity = 50.0;
        refl.esd = 3.0;
        refl.partiality = 0.4;

        polarisation_correction(&mut list, &cell, &beam);
        let refl = list.find(1, 1, 0).unwrap();
        assert_eq!(refl.esd, 3.0);
        assert_eq!(refl.partiality, 0.4);
        assert!(refl.intensity != 50.0);
    }
}
