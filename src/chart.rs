//! Charts: axes plus the plots drawn against them.
//!
//! A [`Chart`] owns its axes and plots. [`Chart::update_bounds`] lets every
//! axis auto-bound from what the plots report, and [`Chart::render`] runs one
//! pass per plot, with plots asking to be drawn before the grid going first.

use crate::axis::{Axis, AxisKind, PlotBounds};
use crate::chart_map::AxisSet;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::plots::{DataPoint, Plot, PlotFamilyRegistry};
use crate::render::Renderer;
use tracing::{debug, warn};

#[derive(Debug)]
struct PlotEntry {
    /// Axis set registered for the plot's family.
    axis_set: AxisSet,
    plot: Box<dyn Plot>,
}

/// A chart with its axes and plots.
#[derive(Debug)]
pub struct Chart {
    axis_set: AxisSet,
    axes: Vec<Axis>,
    plots: Vec<PlotEntry>,
    config: RenderConfig,
}

/// Default axes of an axis set, in chart-map order.
fn default_axes(axis_set: AxisSet) -> Vec<Axis> {
    match axis_set {
        AxisSet::None => Vec::new(),
        AxisSet::X => vec![Axis::new(AxisKind::X)],
        AxisSet::XY => vec![Axis::new(AxisKind::X), Axis::new(AxisKind::Y)],
        AxisSet::Radar => vec![Axis::new(AxisKind::Circular), Axis::new(AxisKind::Radial)],
    }
}

impl Chart {
    /// Chart with the default axes of `axis_set` and no plots.
    #[must_use]
    pub fn new(axis_set: AxisSet) -> Self {
        Self {
            axis_set,
            axes: default_axes(axis_set),
            plots: Vec::new(),
            config: RenderConfig::default(),
        }
    }

    /// Set the render configuration.
    #[must_use]
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the axes (X or circular first, then Y or radial).
    #[must_use]
    pub fn with_axes(mut self, axes: Vec<Axis>) -> Self {
        self.axes = axes;
        self
    }

    /// Axis configuration of the chart.
    #[must_use]
    pub fn axis_set(&self) -> AxisSet {
        self.axis_set
    }

    /// Axes in chart-map order.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Mutable access to the axes.
    pub fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    /// Render configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of plots.
    #[must_use]
    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    /// Plot at `index`.
    #[must_use]
    pub fn plot(&self, index: usize) -> Option<&dyn Plot> {
        self.plots.get(index).map(|e| e.plot.as_ref())
    }

    /// Attach a plot whose family is registered in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownId`](crate::Error::UnknownId) if the plot's
    /// family is not registered.
    pub fn add_plot(&mut self, registry: &PlotFamilyRegistry, plot: impl Plot + 'static) -> Result<()> {
        let family = registry.require(plot.family())?;
        debug!(family = %family.name, axis_set = ?family.axis_set, "plot added");
        self.plots.push(PlotEntry {
            axis_set: family.axis_set,
            plot: Box::new(plot),
        });
        Ok(())
    }

    fn drawable(&self) -> impl Iterator<Item = &PlotEntry> + '_ {
        self.plots.iter().filter(move |e| e.axis_set == self.axis_set)
    }

    /// Auto-bound every axis from the ranges its plots report.
    pub fn update_bounds(&mut self) {
        for i in 0..self.axes.len() {
            let kind = self.axes[i].kind();
            let reported: Vec<PlotBounds> = self.drawable().filter_map(|e| e.plot.axis_bounds(kind)).collect();
            self.axes[i].auto_bound(&reported);
        }
    }

    /// Render every plot into `area`.
    ///
    /// Plots drawn before the grid go first; the others follow in insertion
    /// order. A plot whose family needs another axis set is skipped.
    pub fn render(&self, renderer: &mut dyn Renderer, area: &Rect) {
        for before_grid in [true, false] {
            for entry in self.plots.iter().filter(|e| e.plot.before_grid() == before_grid) {
                if entry.axis_set != self.axis_set {
                    warn!(
                        family = entry.plot.family(),
                        plot_axis_set = ?entry.axis_set,
                        chart_axis_set = ?self.axis_set,
                        "plot skipped, axis set mismatch"
                    );
                    continue;
                }
                entry.plot.render(renderer, area, &self.axes, &self.config);
            }
        }
    }

    /// Plot index and element under device point `(x, y)`, front-most first.
    #[must_use]
    pub fn data_at_point(&self, area: &Rect, x: f64, y: f64) -> Option<(usize, DataPoint)> {
        let mut order: Vec<usize> = (0..self.plots.len()).collect();
        order.sort_by_key(|&i| !self.plots[i].plot.before_grid());
        order
            .into_iter()
            .rev()
            .filter(|&i| self.plots[i].axis_set == self.axis_set)
            .find_map(|i| Some((i, self.plots[i].plot.data_at_point(area, &self.axes, x, y)?)))
    }
}
