//! Bar chart: one bar per record, or grouped / stacked bars per key column.

use super::Chart;
use crate::config::{Axis, ChartConfig, ChartKind, ChartSettings};
use crate::error::Result;
use crate::scale::ScaleKind;

/// Builder for bar charts.
///
/// ```rust,ignore
/// let chart = BarChart::new()
///     .x("region")
///     .y("total")
///     .stack_by(Axis::X, &["men", "women"])
///     .build()?;
/// let mut surface = chart.surface();
/// chart.render(&records, &mut surface)?;
/// ```
#[derive(Debug, Clone)]
pub struct BarChart {
    config: ChartConfig,
}

impl Default for BarChart {
    fn default() -> Self {
        Self::new()
    }
}

impl BarChart {
    /// Create a new bar chart builder.
    #[must_use]
    pub fn new() -> Self {
        Self { config: ChartConfig::new(ChartKind::Bars) }
    }

    /// Apply declarative settings to a fresh builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the format specifier is invalid.
    pub fn from_settings(settings: &ChartSettings) -> Result<Self> {
        Ok(Self { config: settings.to_config(ChartKind::Bars)? })
    }

    /// Column on the x axis.
    #[must_use]
    pub fn x(mut self, column: &str) -> Self {
        self.config.x = Some(column.to_string());
        self
    }

    /// Column on the y axis.
    #[must_use]
    pub fn y(mut self, column: &str) -> Self {
        self.config.y = Some(column.to_string());
        self
    }

    /// Scale kind of the x column in a plain layout (band by default).
    #[must_use]
    pub fn x_scale(mut self, kind: ScaleKind) -> Self {
        self.config.x_scale = kind;
        self
    }

    /// Scale kind of the y column in a plain layout (linear by default).
    #[must_use]
    pub fn y_scale(mut self, kind: ScaleKind) -> Self {
        self.config.y_scale = kind;
        self
    }

    /// Column driving the fill.
    #[must_use]
    pub fn color(mut self, column: &str) -> Self {
        self.config.color = Some(column.to_string());
        self
    }

    /// Side-by-side sub-bars, one per key column, along `axis`.
    #[must_use]
    pub fn group_by(mut self, axis: Axis, keys: &[&str]) -> Self {
        self.config.request_group_by(axis, keys.iter().map(|k| (*k).to_string()).collect());
        self
    }

    /// Stacked segments, one per key column, along `axis`.
    #[must_use]
    pub fn stack_by(mut self, axis: Axis, keys: &[&str]) -> Self {
        self.config.request_stack_by(axis, keys.iter().map(|k| (*k).to_string()).collect());
        self
    }

    /// Set the output dimensions.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.config.frame.width = width;
        self.config.frame.height = height;
        self
    }

    /// Build and validate the chart.
    ///
    /// # Errors
    ///
    /// Returns an error if required columns are missing, group-by and
    /// stack-by were both requested, or the quantile settings are invalid.
    pub fn build(self) -> Result<Self> {
        self.config.validate()?;
        Ok(self)
    }
}

impl Chart for BarChart {
    fn config(&self) -> &ChartConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ChartConfig {
        &mut self.config
    }
}

impl batuta_common::display::WithDimensions for BarChart {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.config.frame.width = width;
        self.config.frame.height = height;
    }
}
