#[cfg(test)]
mod _tests_detector {
    use super::super::detector::*;
    use crate::error::CellError;
    use crate::interfaces::DetectorModel;
    use approx::assert_relative_eq;
    use nalgebra::{Vector2, Vector3};

    const LAMBDA: f64 = 1.3e-10;

    // 1024 x 1024 pixels of 100 µm, beam in the middle, 10 cm away
    fn square_panel(name: &str, corner: Vector2<f64>) -> Panel {
        Panel::new(
            name,
            (0.0, 1023.0),
            (0.0, 1023.0),
            corner,
            0.1,
            1e4,
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        )
        .unwrap()
    }

    fn single_panel() -> Detector {
        Detector::new(vec![square_panel("q0", Vector2::new(-512.0, -512.0))])
    }

    #[test]
    fn test_panel_validation() {
        let parallel = Panel::new(
            "bad",
            (0.0, 10.0),
            (0.0, 10.0),
            Vector2::zeros(),
            0.1,
            1e4,
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0),
        );
        assert!(matches!(parallel, Err(CellError::InvalidCellGeometry(_))));

        let no_distance = Panel::new(
            "bad",
            (0.0, 10.0),
            (0.0, 10.0),
            Vector2::zeros(),
            0.0,
            1e4,
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        );
        assert!(no_distance.is_err());
    }

    #[test]
    fn test_pixel_lab_round_trip() {
        let panel = square_panel("q0", Vector2::new(-512.0, -512.0));
        let lab = panel.pixel_to_lab(612.0, 412.0);
        assert_relative_eq!(lab.x, 0.01, epsilon = 1e-15);
        assert_relative_eq!(lab.y, -0.01, epsilon = 1e-15);
        assert_relative_eq!(lab.z, 0.1);

        let (fs, ss) = panel.lab_to_pixel(lab.x * panel.res, lab.y * panel.res);
        assert_relative_eq!(fs, 612.0, epsilon = 1e-9);
        assert_relative_eq!(ss, 412.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotated_panel_axes() {
        // Fast scan along -y, slow scan along +x
        let panel = Panel::new(
            "rot",
            (0.0, 99.0),
            (0.0, 99.0),
            Vector2::new(10.0, 50.0),
            0.1,
            1e4,
            Vector2::new(0.0, -1.0),
            Vector2::new(1.0, 0.0),
        )
        .unwrap();
        let (fs, ss) = panel.lab_to_pixel(30.0, 45.0);
        assert_relative_eq!(fs, 5.0, epsilon = 1e-12);
        assert_relative_eq!(ss, 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scattering_vector_on_ewald_sphere() {
        let k = 1.0 / LAMBDA;
        let q = scattering_vector(&Vector3::new(0.03, -0.02, 0.1), k);
        // |q + k z| = k
        assert_relative_eq!((q + Vector3::new(0.0, 0.0, k)).norm(), k, max_relative = 1e-12);
        assert_relative_eq!(scattering_vector(&Vector3::new(0.0, 0.0, 0.1), k).norm(), 0.0);
    }

    #[test]
    fn test_locate_peak_round_trip() {
        let det = single_panel();
        let k = 1.0 / LAMBDA;

        let panel = &det.panels[0];
        let q = scattering_vector(&panel.pixel_to_lab(100.5, 700.25), k);
        let pos = det.locate_peak(&q, k).unwrap();
        assert_eq!(pos.panel, 0);
        assert_relative_eq!(pos.fs, 100.5, epsilon = 1e-6);
        assert_relative_eq!(pos.ss, 700.25, epsilon = 1e-6);
    }

    #[test]
    fn test_locate_peak_misses() {
        let det = single_panel();
        let k = 1.0 / LAMBDA;

        // Beyond the panel edge
        let lab = Vector3::new(0.06, 0.0, 0.1);
        assert!(det.locate_peak(&scattering_vector(&lab, k), k).is_none());
    }

    #[test]
    fn test_overlapping_panels_are_ambiguous() {
        let det = Detector::new(vec![
            square_panel("left", Vector2::new(-1000.0, -512.0)),
            square_panel("right", Vector2::new(-100.0, -512.0)),
        ]);
        let k = 1.0 / LAMBDA;

        // Only the left panel covers x = -500 px
        let only_left = scattering_vector(&Vector3::new(-0.05, 0.0, 0.1), k);
        assert_eq!(det.locate_peak(&only_left, k).unwrap().panel, 0);

        // x = 0 lies on both
        let both = scattering_vector(&Vector3::new(0.0, 0.001, 0.1), k);
        assert!(det.locate_peak(&both, k).is_none());
    }

    #[test]
    fn test_largest_q() {
        let det = single_panel();
        let k = 1.0 / LAMBDA;

        let corner = Vector3::new(-0.0512, -0.0512, 0.1);
        let expected = scattering_vector(&corner, k).norm();
        let far = det.panels[0].pixel_to_lab(1023.0, 1023.0);
        let expected = expected.max(scattering_vector(&far, k).norm());

        assert_relative_eq!(det.largest_q(LAMBDA), expected, max_relative = 1e-12);

        // 2 sin θ / λ
        let twotheta = (0.0512f64 * 2f64.sqrt()).atan2(0.1);
        assert_relative_eq!(
            det.largest_q(LAMBDA),
            2.0 * (twotheta / 2.0).sin() / LAMBDA,
            max_relative = 1e-9
        );

        assert_eq!(Detector::default().largest_q(LAMBDA), 0.0);
    }
}
