use crate::cli::EvaluateArgs;
use crate::config::FileBiasConfig;
use crate::error::{CliError, Result};
use crate::structure::Structure;
use biaspot::core::bias::term::BiasEnergy;
use biaspot::engine::BiasPotentialSet;
use nalgebra::{Point3, Vector3};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info, warn};

/// Reference points handed to `apply` on every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub box_min: Point3<f64>,
    pub box_max: Point3<f64>,
    pub center: Point3<f64>,
}

impl Frame {
    fn resolve(args: &EvaluateArgs, structure: &Structure) -> Self {
        let (min, max) = structure.bounding_box();
        Self {
            box_min: args.box_min.unwrap_or(min),
            box_max: args.box_max.unwrap_or(max),
            center: args.center.unwrap_or_else(|| structure.centroid()),
        }
    }
}

pub fn run(args: EvaluateArgs) -> Result<()> {
    let config = FileBiasConfig::from_file(&args.config)?.into_core()?;
    let mut set = BiasPotentialSet::new(config).map_err(|e| CliError::Config(e.to_string()))?;
    if set.is_empty() {
        warn!("No bias potentials are defined in {:?}.", &args.config);
    }

    info!("Loading input structure from {:?}", &args.structure);
    let structure = Structure::from_file(&args.structure)?;
    let frame = Frame::resolve(&args, &structure);
    debug!(?frame, "Resolved reference frame.");

    let trace = match &args.trace {
        Some(path) => {
            info!("Appending umbrella coordinates to {:?}", path);
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let gradients = simulate(&mut set, &structure.positions, &frame, args.steps, trace)?;

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &structure, set.energy(), &gradients)?;
    Ok(())
}

/// Runs `steps` evaluations on fixed positions and returns the gradient of the
/// last one. Each step writes `step value...` to `trace` when any umbrella
/// coordinate was recorded.
pub fn simulate<W: Write>(
    set: &mut BiasPotentialSet,
    positions: &[Point3<f64>],
    frame: &Frame,
    steps: u64,
    mut trace: Option<W>,
) -> Result<Vec<Vector3<f64>>> {
    let mut gradients = vec![Vector3::zeros(); positions.len()];
    for step in 1..=steps {
        gradients.fill(Vector3::zeros());
        let energy = set.apply(
            positions,
            &mut gradients,
            &frame.box_max,
            &frame.box_min,
            &frame.center,
        )?;

        let mut values = Vec::new();
        set.apply_umbrella(positions, &mut gradients, &mut values, None)?;
        info!(step, energy, umbrella = values.len(), "Step evaluated.");

        if let Some(writer) = trace.as_mut() {
            if !values.is_empty() {
                write!(writer, "{}", step)?;
                for value in &values {
                    write!(writer, " {:.6}", value)?;
                }
                writeln!(writer)?;
            }
        }
    }
    if let Some(mut writer) = trace {
        writer.flush()?;
    }
    Ok(gradients)
}

pub fn write_report<W: Write>(
    out: &mut W,
    structure: &Structure,
    energy: &BiasEnergy,
    gradients: &[Vector3<f64>],
) -> io::Result<()> {
    if !structure.title.is_empty() {
        writeln!(out, "{}", structure.title)?;
        writeln!(out)?;
    }
    writeln!(out, "Bias energy")?;
    for (label, value) in [
        ("distance", energy.distance),
        ("angle", energy.angle),
        ("dihedral", energy.dihedral),
        ("spherical", energy.spherical),
        ("cubic", energy.cubic),
        ("threshold", energy.threshold),
        ("combined", energy.combined),
    ] {
        writeln!(out, "  {:<10} {:>16.6}", label, value)?;
    }
    writeln!(out, "  {:<10} {:>16.6}", "total", energy.total())?;

    writeln!(out)?;
    writeln!(out, "Bias gradient")?;
    for (index, (element, gradient)) in structure.elements.iter().zip(gradients).enumerate() {
        writeln!(
            out,
            "  {:>5} {:<3} {:>14.6} {:>14.6} {:>14.6}",
            index, element, gradient.x, gradient.y, gradient.z
        )?;
    }
    Ok(())
}
