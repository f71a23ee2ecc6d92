/// Example walking through the geometry core
///
/// A lysozyme-like tetragonal cell is read from a CRYST1 record, reduced to primitive form,
/// matched against a rotated copy, and used to predict reflections on a single-panel
/// detector.
use diffraction_core::cell::{cell_from_cryst1, match_cell, uncenter_cell, CandidateMode, MatchTolerances};
use diffraction_core::geometry::{
    find_intersections, polarisation_correction, resolution_limits, update_partialities, Beam,
    Crystal, Detector, Panel, PartialityModel,
};
use nalgebra::{UnitQuaternion, Vector2};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Diffraction geometry walkthrough ===\n");

    // 1. Cell from a PDB record
    println!("1. Reading a CRYST1 record:");
    let record = "CRYST1   79.100   79.100   38.000  90.00  90.00  90.00 P 43 21 2     8";
    let cell = cell_from_cryst1(record)?;
    print!("{}", cell);
    println!("   Volume: {:.1} nm^3\n", cell.volume() * 1e27);

    // 2. A body-centred variant reduced to primitive form
    println!("2. Uncentering an I-centred copy:");
    let centred = cell.clone().with_centering(diffraction_core::cell::Centering::BodyCentered);
    let primitive = uncenter_cell(&centred)?;
    println!(
        "   {} {} -> {} {}, volume ratio {:.3}\n",
        centred.lattice_type(),
        centred.centering(),
        primitive.lattice_type(),
        primitive.centering(),
        primitive.volume() / centred.volume()
    );

    // 3. Matching an arbitrarily oriented indexing result back to the reference
    println!("3. Matching a rotated cell:");
    let orientation = UnitQuaternion::from_euler_angles(0.8, -0.3, 1.9);
    let indexed = cell.rotated(&orientation)?;
    let result = match_cell(
        &indexed,
        &cell,
        &MatchTolerances::new(2.0, 1.0),
        CandidateMode::Direct,
    )?;
    let (a, b, c) = result.cell.lattice_parameters();
    println!(
        "   a={:.2} b={:.2} c={:.2} Å, figure of merit {:.2e}\n",
        a * 1e10,
        b * 1e10,
        c * 1e10,
        result.figure_of_merit
    );

    // 4. Prediction on a 1024 x 1024 detector 10 cm from the crystal
    println!("4. Predicting reflections:");
    let panel = Panel::new(
        "q0",
        (0.0, 1023.0),
        (0.0, 1023.0),
        Vector2::new(-512.0, -512.0),
        0.1,
        1e4,
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 1.0),
    )?;
    let detector = Detector::new(vec![panel]);
    let beam = Beam::new(1.3e-10, 0.01, 1e-3)?;
    let mut crystal = Crystal::new(indexed, 2e-3, 1e8);

    let mut reflections =
        find_intersections(&crystal, &beam, Some(&detector), PartialityModel::Sphere)?;
    println!("   {} reflections on the detector", reflections.len());
    if let Some((min, max)) = resolution_limits(&reflections, &crystal.cell) {
        println!("   Resolution {:.2} - {:.2} Å", 1e10 / min, 1e10 / max);
    }
    for refl in reflections.iter().take(5) {
        if let Some(pos) = refl.detector_position {
            println!(
                "   {}  partiality {:.3}  at fs={:.1} ss={:.1}",
                refl.indices(),
                refl.partiality,
                pos.fs,
                pos.ss
            );
        }
    }

    // 5. Refinement nudges the orientation; re-evaluate the same reflections
    println!("\n5. Updating partialities after a 0.2 degree rotation:");
    for refl in reflections.iter_mut() {
        refl.intensity = 1000.0 * refl.partiality;
    }
    polarisation_correction(&mut reflections, &crystal.cell, &beam);
    crystal.reflections = reflections;
    let nudge = UnitQuaternion::from_euler_angles(0.2f64.to_radians(), 0.0, 0.0);
    crystal.cell = crystal.cell.rotated(&nudge)?;

    let stats = update_partialities(&mut crystal, &beam, Some(&detector), PartialityModel::Sphere);
    println!(
        "   gained {}, lost {}, mean |change| {:.4}",
        stats.n_gained, stats.n_lost, stats.mean_change
    );

    Ok(())
}
