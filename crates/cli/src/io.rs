//! JSON input and output for the command-line runner.

use anyhow::{Context, Result};
use polyfit_core::{FitConfig, FitMatrix, FitSummary, ValidationReport};
use polyfit_d2::{PlacedFit, Polygon2D};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// One polygon record as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonInput {
    pub id: String,
    pub polygon: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Option<Vec<Vec<[f64; 2]>>>,
}

impl From<PolygonInput> for Polygon2D {
    fn from(input: PolygonInput) -> Self {
        let ring = |points: Vec<[f64; 2]>| -> Vec<(f64, f64)> {
            points.into_iter().map(|[x, y]| (x, y)).collect()
        };
        let mut polygon = Polygon2D::new(input.id).with_polygon(ring(input.polygon));
        for hole in input.holes.unwrap_or_default() {
            polygon = polygon.with_hole(ring(hole));
        }
        polygon
    }
}

/// Matrix file written by `polyfit run`.
#[derive(Debug, Serialize)]
pub struct MatrixOutput<'a> {
    pub matrix: &'a FitMatrix,
    pub summary: &'a FitSummary,
    pub validation: &'a ValidationReport,
}

/// One part of a placed geometry, in the same ring layout as the input.
#[derive(Debug, Serialize)]
pub struct RingsOutput {
    pub polygon: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl From<&geo::Polygon<f64>> for RingsOutput {
    fn from(polygon: &geo::Polygon<f64>) -> Self {
        let ring = |line: &geo::LineString<f64>| -> Vec<[f64; 2]> {
            line.coords().map(|c| [c.x, c.y]).collect()
        };
        Self {
            polygon: ring(polygon.exterior()),
            holes: polygon.interiors().iter().map(ring).collect(),
        }
    }
}

/// One sampled placement.
#[derive(Debug, Serialize)]
pub struct PlacedOutput {
    pub host_id: String,
    pub tenant_id: String,
    pub polygons: Vec<RingsOutput>,
}

impl From<&PlacedFit> for PlacedOutput {
    fn from(fit: &PlacedFit) -> Self {
        Self {
            host_id: fit.host_id.clone(),
            tenant_id: fit.tenant_id.clone(),
            polygons: fit.geometry.0.iter().map(RingsOutput::from).collect(),
        }
    }
}

/// Parses a polygon collection from a JSON string.
pub fn parse_polygons(json: &str) -> Result<Vec<Polygon2D>> {
    let inputs: Vec<PolygonInput> = serde_json::from_str(json).context("invalid polygon JSON")?;
    Ok(inputs.into_iter().map(Polygon2D::from).collect())
}

/// Loads a polygon collection from a JSON file.
pub fn load_polygons(path: &Path) -> Result<Vec<Polygon2D>> {
    let json =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    parse_polygons(&json).with_context(|| format!("cannot parse {}", path.display()))
}

/// Loads a run configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<FitConfig> {
    let json =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid config in {}", path.display()))
}

/// Writes pretty JSON to a file, or to stdout when no path is given.
pub fn write_json<T: Serialize + ?Sized>(path: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}
