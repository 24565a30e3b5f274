use crate::error::{CliError, Result};
use biaspot::core::models::restraint::{
    AngleRestraint, Axis, CombinedDistanceRestraint, CubicConfinement, DihedralRestraint,
    DistanceRestraint, SphericalConfinement, ThresholdConfinement, UmbrellaAngle,
    UmbrellaDihedral, UmbrellaDistance,
};
use biaspot::engine::config::{BiasConfig, BiasConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Restraint file as written by the user.
///
/// Top-level keys carry the set-wide settings; every restraint family is an
/// array of tables (`[[distance]]`, `[[umbrella-dihedral]]`, ...).
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBiasConfig {
    threshold_axis: Option<Axis>,
    use_combined: Option<bool>,
    equilibration_steps: Option<usize>,

    #[serde(default)]
    distance: Vec<DistanceRestraint>,
    #[serde(default)]
    angle: Vec<AngleRestraint>,
    #[serde(default)]
    dihedral: Vec<DihedralRestraint>,
    #[serde(default)]
    spherical: Vec<SphericalConfinement>,
    #[serde(default)]
    cubic: Vec<CubicConfinement>,
    #[serde(default)]
    threshold: Vec<ThresholdConfinement>,
    #[serde(default)]
    threshold_bottom: Vec<ThresholdConfinement>,
    #[serde(default)]
    umbrella_distance: Vec<UmbrellaDistance>,
    #[serde(default)]
    umbrella_angle: Vec<UmbrellaAngle>,
    #[serde(default)]
    umbrella_dihedral: Vec<UmbrellaDihedral>,
    #[serde(default)]
    combined: Vec<CombinedDistanceRestraint>,
}

impl FileBiasConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading restraint definitions from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn into_core(self) -> Result<BiasConfig> {
        let mut builder = BiasConfigBuilder::new()
            .threshold_axis(self.threshold_axis.unwrap_or_default())
            .use_combined(self.use_combined.unwrap_or(false));
        if let Some(steps) = self.equilibration_steps {
            builder = builder.equilibration_steps(steps);
        }

        let builder = self.distance.into_iter().fold(builder, BiasConfigBuilder::distance);
        let builder = self.angle.into_iter().fold(builder, BiasConfigBuilder::angle);
        let builder = self.dihedral.into_iter().fold(builder, BiasConfigBuilder::dihedral);
        let builder = self.spherical.into_iter().fold(builder, BiasConfigBuilder::spherical);
        let builder = self.cubic.into_iter().fold(builder, BiasConfigBuilder::cubic);
        let builder = self.threshold.into_iter().fold(builder, BiasConfigBuilder::threshold);
        let builder = self
            .threshold_bottom
            .into_iter()
            .fold(builder, BiasConfigBuilder::threshold_bottom);
        let builder = self
            .umbrella_distance
            .into_iter()
            .fold(builder, BiasConfigBuilder::umbrella_distance);
        let builder = self
            .umbrella_angle
            .into_iter()
            .fold(builder, BiasConfigBuilder::umbrella_angle);
        let builder = self
            .umbrella_dihedral
            .into_iter()
            .fold(builder, BiasConfigBuilder::umbrella_dihedral);
        let builder = self.combined.into_iter().fold(builder, BiasConfigBuilder::combined);

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}
