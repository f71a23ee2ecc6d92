use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{info, warn};

use diffraction_core::cell::{
    cell_from_pdb_text, log_cell, match_cell, match_cell_ab, uncenter_cell, validate_cell,
    CandidateMode, Centering, MatchTolerances, UnitCell,
};
use diffraction_core::geometry::{
    find_intersections, polarisation_correction, resolution_limits, Beam, Crystal,
    PartialityModel,
};

#[derive(Parser)]
#[command(name = "diffraction-core")]
#[command(about = "Unit cell reduction, cell matching and reflection prediction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a cell and print its diagnostic dump
    Classify {
        #[command(flatten)]
        cell: CellArgs,
    },
    /// Reduce a centred cell to a primitive one
    Uncenter {
        #[command(flatten)]
        cell: CellArgs,
    },
    /// Match an indexed cell against a reference cell
    Match {
        #[command(flatten)]
        cell: CellArgs,

        /// Reference cell as a,b,c,alpha,beta,gamma (Å, degrees)
        #[arg(long, value_delimiter = ',', num_args = 6, required = true)]
        reference: Vec<f64>,

        /// Centering letter of the reference cell
        #[arg(long, default_value = "P")]
        reference_centering: char,

        /// Reciprocal axis length tolerance in percent
        #[arg(long, default_value = "5.0")]
        length_tolerance: f64,

        /// Reciprocal angle tolerance in degrees
        #[arg(long, default_value = "1.5")]
        angle_tolerance: f64,

        /// Also try sub- and super-lattice combinations
        #[arg(long)]
        reduce: bool,

        /// Only match the a and b axis lengths
        #[arg(long, conflicts_with = "reduce")]
        ab_only: bool,
    },
    /// Predict the reflections excited for a cell and beam
    Predict {
        #[command(flatten)]
        cell: CellArgs,

        /// Wavelength in Å
        #[arg(long, default_value = "1.3")]
        wavelength: f64,

        /// Fractional bandwidth
        #[arg(long, default_value = "0.01")]
        bandwidth: f64,

        /// Beam divergence in mrad
        #[arg(long, default_value = "0.0")]
        divergence: f64,

        /// Mosaic spread in mrad
        #[arg(long, default_value = "1.0")]
        mosaicity: f64,

        /// Reflection profile radius in nm^-1
        #[arg(long, default_value = "0.1")]
        profile_radius: f64,

        #[arg(long, value_enum, default_value = "sphere")]
        model: ModelArg,

        /// Divide intensities by the polarisation factor
        #[arg(long)]
        polarisation: bool,

        /// Write the reflections as JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A cell given either by parameters or by a PDB file.
#[derive(Args)]
struct CellArgs {
    /// Cell as a,b,c,alpha,beta,gamma (Å, degrees)
    #[arg(long, value_delimiter = ',', num_args = 6, required_unless_present = "pdb")]
    cell: Vec<f64>,

    /// Centering letter (P, A, B, C, I, F, H, R)
    #[arg(long, default_value = "P")]
    centering: char,

    /// Read the cell from the CRYST1 record of a PDB file instead
    #[arg(long, conflicts_with = "cell")]
    pdb: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Unity,
    Sphere,
    Gaussian,
}

impl From<ModelArg> for PartialityModel {
    fn from(model: ModelArg) -> Self {
        match model {
            ModelArg::Unity => PartialityModel::Unity,
            ModelArg::Sphere => PartialityModel::Sphere,
            ModelArg::Gaussian => PartialityModel::Gaussian,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("Starting diffraction-core v{}", diffraction_core::VERSION);

    match cli.command {
        Commands::Classify { cell } => {
            let cell = load_cell(&cell)?;
            if !validate_cell(&cell) {
                warn!("Cell failed validation");
            }
            print!("{}", cell);
            Ok(())
        }
        Commands::Uncenter { cell } => {
            let cell = load_cell(&cell)?;
            let primitive = uncenter_cell(&cell)?;
            print!("{}", primitive);
            Ok(())
        }
        Commands::Match {
            cell,
            reference,
            reference_centering,
            length_tolerance,
            angle_tolerance,
            reduce,
            ab_only,
        } => {
            let indexed = load_cell(&cell)?;
            let reference = cell_from_args(&reference, reference_centering)?;

            if ab_only {
                let matched = match_cell_ab(&indexed, &reference)?;
                print!("{}", matched.classified());
                return Ok(());
            }

            let tolerances = MatchTolerances::new(length_tolerance, angle_tolerance);
            let mode = if reduce {
                CandidateMode::Reduction
            } else {
                CandidateMode::Direct
            };
            let result = match_cell(&indexed, &reference, &tolerances, mode)?;
            info!("Figure of merit: {:e}", result.figure_of_merit);
            print!("{}", result.cell.classified());
            Ok(())
        }
        Commands::Predict {
            cell,
            wavelength,
            bandwidth,
            divergence,
            mosaicity,
            profile_radius,
            model,
            polarisation,
            output,
        } => {
            let cell = load_cell(&cell)?;
            let beam = Beam::new(wavelength * 1e-10, bandwidth, divergence * 1e-3)?;
            let crystal = Crystal::new(cell, mosaicity * 1e-3, profile_radius * 1e9);

            let mut reflections = find_intersections(&crystal, &beam, None, model.into())?;
            if polarisation {
                polarisation_correction(&mut reflections, &crystal.cell, &beam);
            }

            info!("Predicted {} reflections", reflections.len());
            if let Some((min, max)) = resolution_limits(&reflections, &crystal.cell) {
                info!("d ranges from {:.2} to {:.2} Å", 1e10 / max, 1e10 / min);
            }

            let json = serde_json::to_string_pretty(&reflections)?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(())
        }
    }
}

fn load_cell(args: &CellArgs) -> Result<UnitCell> {
    let cell = match &args.pdb {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            cell_from_pdb_text(&text)?
        }
        None => cell_from_args(&args.cell, args.centering)?,
    };
    log_cell(&cell);
    Ok(cell)
}

fn cell_from_args(values: &[f64], centering: char) -> Result<UnitCell> {
    let &[a, b, c, al, be, ga] = values else {
        bail!("A cell needs six values, got {}", values.len());
    };
    let centering = Centering::from_char(centering)
        .ok_or_else(|| anyhow!("Unknown centering '{}'", centering))?;

    let cell = UnitCell::from_parameters(
        a * 1e-10,
        b * 1e-10,
        c * 1e-10,
        al.to_radians(),
        be.to_radians(),
        ga.to_radians(),
    )?
    .classified()
    .with_centering(centering);
    Ok(cell)
}
