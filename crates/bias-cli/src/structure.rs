use crate::error::{CliError, Result};
use anyhow::{Context, anyhow, bail};
use nalgebra::Point3;
use std::path::Path;
use tracing::debug;

/// Atoms of an XYZ file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub title: String,
    pub elements: Vec<String>,
    pub positions: Vec<Point3<f64>>,
}

impl Structure {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let structure = Self::parse(&content).map_err(|source| CliError::FileParsing {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            atoms = structure.positions.len(),
            "Read structure from {:?}", path
        );
        Ok(structure)
    }

    /// Parses the first frame of an XYZ file: atom count, title line, then
    /// one `element x y z` line per atom.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut lines = content.lines();
        let count_line = lines.next().ok_or_else(|| anyhow!("file is empty"))?;
        let count: usize = count_line
            .trim()
            .parse()
            .with_context(|| format!("invalid atom count '{}'", count_line.trim()))?;
        let title = lines.next().unwrap_or_default().trim().to_string();

        let mut elements = Vec::with_capacity(count);
        let mut positions = Vec::with_capacity(count);
        for atom in 0..count {
            let line_number = atom + 3;
            let line = lines
                .next()
                .ok_or_else(|| anyhow!("expected {} atoms, found {}", count, atom))?;
            let mut fields = line.split_whitespace();
            let element = fields
                .next()
                .ok_or_else(|| anyhow!("line {}: missing element symbol", line_number))?;
            let mut coords = [0.0; 3];
            for (axis, value) in coords.iter_mut().enumerate() {
                let field = fields.next().ok_or_else(|| {
                    anyhow!("line {}: missing coordinate {}", line_number, axis + 1)
                })?;
                *value = field
                    .parse()
                    .with_context(|| format!("line {}: invalid coordinate '{}'", line_number, field))?;
            }
            elements.push(element.to_string());
            positions.push(Point3::from(coords));
        }

        if count == 0 {
            bail!("structure contains no atoms");
        }

        Ok(Self {
            title,
            elements,
            positions,
        })
    }

    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .positions
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.positions.len() as f64)
    }

    /// Component-wise `(min, max)` over all atoms.
    pub fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let first = self.positions[0];
        self.positions
            .iter()
            .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)))
    }
}
