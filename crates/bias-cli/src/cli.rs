use clap::{Args, Parser, Subcommand};
use nalgebra::Point3;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "biaspot - evaluate restraint, confinement and umbrella bias potentials on a molecular structure.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the bias potentials of a restraint file to an XYZ structure.
    Evaluate(EvaluateArgs),
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to the restraint definitions in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path to the input structure in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Number of evaluation steps; the combined force constants ramp once per step.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub steps: u64,

    /// Append one line of umbrella coordinates per step to this file.
    #[arg(short, long, value_name = "PATH")]
    pub trace: Option<PathBuf>,

    /// Center of the spherical and cubic walls. Defaults to the centroid.
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_point, allow_hyphen_values = true)]
    pub center: Option<Point3<f64>>,

    /// Lower box corner for the bottom threshold walls. Defaults to the bounding box.
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_point, allow_hyphen_values = true)]
    pub box_min: Option<Point3<f64>>,

    /// Upper box corner for the top threshold walls. Defaults to the bounding box.
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_point, allow_hyphen_values = true)]
    pub box_max: Option<Point3<f64>>,
}

fn parse_point(s: &str) -> Result<Point3<f64>, String> {
    let parts: Vec<_> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(format!("expected three comma-separated values, got '{}'", s));
    };
    let coord = |v: &str| {
        v.parse::<f64>()
            .map_err(|_| format!("invalid coordinate '{}' in '{}'", v, s))
    };
    Ok(Point3::new(coord(x)?, coord(y)?, coord(z)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> EvaluateArgs {
        let cli = Cli::parse_from(args.iter().copied());
        match cli.command {
            Commands::Evaluate(args) => args,
        }
    }

    #[test]
    fn parse_point_accepts_three_coordinates() {
        assert_eq!(parse_point("1, -2.5,3").unwrap(), Point3::new(1.0, -2.5, 3.0));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,three").is_err());
    }

    #[test]
    fn evaluate_defaults_to_a_single_step_without_overrides() {
        let args = parse(&["biaspot", "evaluate", "-c", "bias.toml", "-s", "in.xyz"]);
        assert_eq!(args.steps, 1);
        assert!(args.trace.is_none());
        assert!(args.center.is_none());
        assert!(args.box_min.is_none());
    }

    #[test]
    fn evaluate_accepts_box_and_center_overrides() {
        let args = parse(&[
            "biaspot",
            "evaluate",
            "-c",
            "bias.toml",
            "-s",
            "in.xyz",
            "-n",
            "5",
            "--box-min",
            "-5,-5,-5",
            "--box-max",
            "5,5,5",
            "--center",
            "0,0,1",
        ]);
        assert_eq!(args.steps, 5);
        assert_eq!(args.box_min, Some(Point3::new(-5.0, -5.0, -5.0)));
        assert_eq!(args.box_max, Some(Point3::new(5.0, 5.0, 5.0)));
        assert_eq!(args.center, Some(Point3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn center_accepts_negative_coordinates() {
        let args = parse(&[
            "biaspot", "evaluate", "-c", "bias.toml", "-s", "in.xyz", "--center", "-1,0,0",
        ]);
        assert_eq!(args.center, Some(Point3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn zero_steps_are_rejected() {
        let result = Cli::try_parse_from([
            "biaspot", "evaluate", "-c", "bias.toml", "-s", "in.xyz", "-n", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from([
            "biaspot", "-q", "-v", "evaluate", "-c", "bias.toml", "-s", "in.xyz",
        ]);
        assert!(result.is_err());
    }
}
