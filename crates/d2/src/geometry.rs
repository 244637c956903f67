//! Planar polygon records.

use geo::{Area, Centroid, Coord, LineString, Polygon as GeoPolygon};
use polyfit_core::geometry::{Record, RecordId};
use polyfit_core::{Error, Result};

use crate::validate::polygon_defect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of a host or tenant collection: an id and a simple polygon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon2D {
    /// Unique identifier within its collection.
    id: RecordId,

    /// Outer boundary of the polygon.
    exterior: Vec<(f64, f64)>,

    /// Interior holes (if any).
    #[cfg_attr(feature = "serde", serde(default))]
    holes: Vec<Vec<(f64, f64)>>,
}

impl Polygon2D {
    /// Creates an empty polygon record with the given ID.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            exterior: Vec::new(),
            holes: Vec::new(),
        }
    }

    /// Sets the polygon from a list of (x, y) vertices.
    pub fn with_polygon(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.exterior = vertices;
        self
    }

    /// Adds an interior hole.
    pub fn with_hole(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.holes.push(vertices);
        self
    }

    /// Creates an axis-aligned rectangle with its minimum corner at the origin.
    pub fn rectangle(id: impl Into<RecordId>, width: f64, height: f64) -> Self {
        Self::new(id).with_polygon(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, height),
            (0.0, height),
        ])
    }

    /// Creates an axis-aligned square with its minimum corner at the origin.
    pub fn square(id: impl Into<RecordId>, side: f64) -> Self {
        Self::rectangle(id, side, side)
    }

    /// Creates a rectangle centred on `center` whose `width` side runs at
    /// `angle_deg` degrees counter-clockwise from +x.
    pub fn rotated_rectangle(
        id: impl Into<RecordId>,
        center: (f64, f64),
        width: f64,
        height: f64,
        angle_deg: f64,
    ) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (hw, hh) = (width / 2.0, height / 2.0);
        let vertices = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
            .iter()
            .map(|&(x, y)| (center.0 + x * cos - y * sin, center.1 + x * sin + y * cos))
            .collect();
        Self::new(id).with_polygon(vertices)
    }

    /// Creates an L-shaped polygon.
    pub fn l_shape(
        id: impl Into<RecordId>,
        width: f64,
        height: f64,
        notch_width: f64,
        notch_height: f64,
    ) -> Self {
        Self::new(id).with_polygon(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, notch_height),
            (notch_width, notch_height),
            (notch_width, height),
            (0.0, height),
        ])
    }

    /// Returns a copy moved by (dx, dy).
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift = |ring: &[(f64, f64)]| -> Vec<(f64, f64)> {
            ring.iter().map(|&(x, y)| (x + dx, y + dy)).collect()
        };
        Self {
            id: self.id.clone(),
            exterior: shift(&self.exterior),
            holes: self.holes.iter().map(|h| shift(h)).collect(),
        }
    }

    /// Returns a copy scaled by `factor` about the origin.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ring: &[(f64, f64)]| -> Vec<(f64, f64)> {
            ring.iter().map(|&(x, y)| (x * factor, y * factor)).collect()
        };
        Self {
            id: self.id.clone(),
            exterior: scale(&self.exterior),
            holes: self.holes.iter().map(|h| scale(h)).collect(),
        }
    }

    /// Returns the exterior vertices.
    pub fn exterior(&self) -> &[(f64, f64)] {
        &self.exterior
    }

    /// Returns the interior holes.
    pub fn holes(&self) -> &[Vec<(f64, f64)>] {
        &self.holes
    }

    /// Converts to a geo crate Polygon.
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        let ring = |vertices: &[(f64, f64)]| {
            LineString::from(
                vertices
                    .iter()
                    .map(|&(x, y)| Coord { x, y })
                    .collect::<Vec<_>>(),
            )
        };

        GeoPolygon::new(
            ring(&self.exterior),
            self.holes.iter().map(|h| ring(h)).collect(),
        )
    }

    /// Returns the centroid, or `None` for an empty polygon.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.to_geo_polygon().centroid().map(|c| (c.x(), c.y()))
    }
}

impl Record for Polygon2D {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn area(&self) -> f64 {
        self.to_geo_polygon().unsigned_area()
    }

    fn validate(&self) -> Result<()> {
        match polygon_defect(self) {
            None => Ok(()),
            Some(reason) => Err(Error::InvalidGeometry(format!(
                "polygon '{}': {}",
                self.id, reason
            ))),
        }
    }
}
