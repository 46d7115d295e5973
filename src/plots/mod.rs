//! Plot renderers.
//!
//! Every plot family implements [`Plot`]: it reports the value ranges its
//! axes must cover, renders one pass into a [`Renderer`] through a
//! [`ChartMap`](crate::chart_map::ChartMap) built for the pass, and answers
//! hit tests. A plot with no valid series renders nothing; a plot whose
//! chart map is invalid aborts its pass without drawing.
//!
//! Families are looked up in an explicit [`PlotFamilyRegistry`] that the
//! caller builds and passes around.

mod barcol;
mod histogram;
mod pie;
mod radar;

pub use barcol::{BarColPlot, BarColType, BarRect};
pub use histogram::{bin_samples, BinStrategy, HistogramBin, HistogramPlot, MAX_BINS};
pub use pie::{PiePlot, ShowNegatives, Wedge, RING_HOLE};
pub use radar::RadarPlot;

use crate::axis::{Axis, AxisKind, PlotBounds};
use crate::chart_map::AxisSet;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::render::Renderer;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Element found by a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPoint {
    /// Series index within the plot.
    pub series: usize,
    /// Element index within the series.
    pub index: usize,
}

/// A plot family view.
pub trait Plot: fmt::Debug {
    /// Family name, as registered in a [`PlotFamilyRegistry`].
    fn family(&self) -> &'static str;

    /// Axis configuration the plot draws into.
    fn axis_set(&self) -> AxisSet;

    /// Range the axis of `kind` must cover, `None` if the plot does not use it.
    fn axis_bounds(&self, kind: AxisKind) -> Option<PlotBounds>;

    /// Draw one pass into `area`. `axes` are in chart order (X or circular
    /// first, then Y or radial).
    fn render(&self, renderer: &mut dyn Renderer, area: &Rect, axes: &[Axis], config: &RenderConfig);

    /// Element under device point `(x, y)`, the front-most one when several
    /// overlap.
    fn data_at_point(&self, area: &Rect, axes: &[Axis], x: f64, y: f64) -> Option<DataPoint>;

    /// Whether the plot is drawn before the chart's other plots.
    fn before_grid(&self) -> bool {
        false
    }
}

/// A registered plot family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotFamily {
    /// Family name.
    pub name: String,
    /// Axis configuration the family needs.
    pub axis_set: AxisSet,
}

/// Explicit registry of plot families.
#[derive(Debug, Clone, Default)]
pub struct PlotFamilyRegistry {
    families: BTreeMap<String, PlotFamily>,
}

impl PlotFamilyRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the families this crate implements.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, axis_set) in [
            (barcol::FAMILY, AxisSet::XY),
            (pie::PIE_FAMILY, AxisSet::None),
            (pie::RING_FAMILY, AxisSet::None),
            (radar::RADAR_FAMILY, AxisSet::Radar),
            (radar::POLAR_FAMILY, AxisSet::Radar),
            (histogram::FAMILY, AxisSet::XY),
            (histogram::DOUBLE_FAMILY, AxisSet::XY),
        ] {
            registry.register(name, axis_set);
        }
        registry
    }

    /// Add or replace a family.
    pub fn register(&mut self, name: &str, axis_set: AxisSet) -> Option<PlotFamily> {
        debug!(family = name, ?axis_set, "registering plot family");
        self.families.insert(
            name.to_string(),
            PlotFamily {
                name: name.to_string(),
                axis_set,
            },
        )
    }

    /// Look up a family.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PlotFamily> {
        self.families.get(name)
    }

    /// Look up a family that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownId`] if `name` is not registered.
    pub fn require(&self, name: &str) -> Result<&PlotFamily> {
        self.get(name).ok_or_else(|| Error::UnknownId {
            kind: "plot family",
            id: name.to_string(),
        })
    }

    /// Families in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PlotFamily> {
        self.families.values()
    }

    /// Number of families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// No families.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Rectangle path for a device rectangle given by two corners.
pub(crate) fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> crate::path::Path {
    let mut path = crate::path::Path::new();
    path.rectangle(&Rect::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_families() {
        let registry = PlotFamilyRegistry::with_builtins();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.require("barcol").unwrap().axis_set, AxisSet::XY);
        assert_eq!(registry.require("pie").unwrap().axis_set, AxisSet::None);
        assert_eq!(registry.require("radar").unwrap().axis_set, AxisSet::Radar);
        assert!(matches!(
            registry.require("bubble"),
            Err(Error::UnknownId { kind: "plot family", .. })
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = PlotFamilyRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register("dropbar", AxisSet::XY).is_none());
        let old = registry.register("dropbar", AxisSet::X).unwrap();
        assert_eq!(old.axis_set, AxisSet::XY);
        assert_eq!(registry.get("dropbar").unwrap().axis_set, AxisSet::X);
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn test_rect_path_normalizes_corners() {
        let path = rect_path(10.0, 20.0, 0.0, 5.0);
        let b = path.bounds().unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (0.0, 5.0, 10.0, 15.0));
    }
}
