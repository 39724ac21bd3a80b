//! # Scene shaping
//!
//! Turns [`TrussGeometry`] into what the 3D view draws:
//!
//! - a **point trace**: one marker per node, labelled `N1`, `N2`, …
//! - a **line trace**: `start, end, gap` slots per element, so consecutive
//!   members never join into one polyline
//! - a **layout**: title plus axis ranges padded by one unit on every side
//!
//! Elements that reference a node outside `nodes` are skipped and counted.

use std::fmt;

use crate::api::{Point3, TrussGeometry};

/// Padding added on each side of every axis range.
pub const AXIS_PADDING: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub labels: Vec<String>,
}

impl PointTrace {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Markers with their labels, in node order.
    pub fn markers(&self) -> impl Iterator<Item = (Point3, &str)> {
        (0..self.len()).map(move |i| {
            (
                Point3::new(self.x[i], self.y[i], self.z[i]),
                self.labels[i].as_str(),
            )
        })
    }
}

/// Coordinate slots for all segments. `None` marks the gap after each segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineTrace {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub z: Vec<Option<f64>>,
}

impl LineTrace {
    fn push_segment(&mut self, a: Point3, b: Point3) {
        self.x.extend([Some(a.x), Some(b.x), None]);
        self.y.extend([Some(a.y), Some(b.y), None]);
        self.z.extend([Some(a.z), Some(b.z), None]);
    }

    /// Number of coordinate slots (gaps included).
    pub fn slot_count(&self) -> usize {
        self.x.len()
    }

    pub fn gap_count(&self) -> usize {
        self.x.iter().filter(|v| v.is_none()).count()
    }

    /// Consecutive non-gap slot pairs as segment endpoints.
    pub fn segments(&self) -> Vec<(Point3, Point3)> {
        let point_at = |i: usize| -> Option<Point3> {
            Some(Point3::new(self.x[i]?, self.y[i]?, self.z[i]?))
        };
        (0..self.slot_count().saturating_sub(1))
            .filter_map(|i| Some((point_at(i)?, point_at(i + 1)?)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    fn padded(min: f64, max: f64) -> Self {
        Self {
            min: min - AXIS_PADDING,
            max: max + AXIS_PADDING,
        }
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    fn is_bounded(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.extent().is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub title: String,
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

/// Everything needed to draw one truss.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub points: PointTrace,
    pub lines: LineTrace,
    pub layout: SceneLayout,
    /// Elements dropped because an index was out of range.
    pub skipped_elements: usize,
    pub material: Option<String>,
    pub support_count: usize,
    pub load_count: usize,
}

impl Scene {
    pub fn segment_count(&self) -> usize {
        self.lines.gap_count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    /// No nodes to draw.
    Empty,
    /// A node coordinate is NaN or infinite.
    NonFinite { node: usize },
    /// Coordinates are finite but their range overflows on this axis.
    Unbounded { axis: char },
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::Empty => write!(f, "geometry has no nodes"),
            PlotError::NonFinite { node } => {
                write!(f, "node N{} has a non-finite coordinate", node + 1)
            }
            PlotError::Unbounded { axis } => {
                write!(f, "coordinate range on the {axis} axis is too large to draw")
            }
        }
    }
}

impl std::error::Error for PlotError {}

/// Title shown above the 3D view.
pub fn scene_title(span: f64, height: f64) -> String {
    format!("Truss (span: {span} m, height: {height} m)")
}

fn node_at(nodes: &[Point3], index: i64) -> Option<Point3> {
    usize::try_from(index).ok().and_then(|i| nodes.get(i)).copied()
}

/// Build the point trace, line trace and layout for a geometry.
pub fn build_scene(geometry: &TrussGeometry) -> Result<Scene, PlotError> {
    if geometry.nodes.is_empty() {
        return Err(PlotError::Empty);
    }
    if let Some(node) = geometry.nodes.iter().position(|p| !p.is_finite()) {
        return Err(PlotError::NonFinite { node });
    }

    let mut points = PointTrace::default();
    for (i, node) in geometry.nodes.iter().enumerate() {
        points.x.push(node.x);
        points.y.push(node.y);
        points.z.push(node.z);
        points.labels.push(format!("N{}", i + 1));
    }

    let mut lines = LineTrace::default();
    let mut skipped_elements = 0;
    for element in &geometry.elements {
        match (
            node_at(&geometry.nodes, element.start),
            node_at(&geometry.nodes, element.end),
        ) {
            (Some(a), Some(b)) => lines.push_segment(a, b),
            _ => skipped_elements += 1,
        }
    }

    let range = |values: &[f64]| {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        AxisRange::padded(min, max)
    };

    let layout = SceneLayout {
        title: scene_title(geometry.span, geometry.height),
        x: range(&points.x),
        y: range(&points.y),
        z: range(&points.z),
    };
    for (axis, bounds) in [('x', layout.x), ('y', layout.y), ('z', layout.z)] {
        if !bounds.is_bounded() {
            return Err(PlotError::Unbounded { axis });
        }
    }
    // Any view of the axis box spans at most the sum of the three extents
    if !(layout.x.extent() + layout.y.extent() + layout.z.extent()).is_finite() {
        return Err(PlotError::Unbounded { axis: 'x' });
    }

    Ok(Scene {
        points,
        lines,
        layout,
        skipped_elements,
        material: geometry.material.clone(),
        support_count: geometry.supports.len(),
        load_count: geometry.loads.len(),
    })
}
