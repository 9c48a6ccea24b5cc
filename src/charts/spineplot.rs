//! Spine plot: columns whose width is proportional to `value`, laid out
//! back to back over the grand total, optionally split into proportional
//! stacks.

use super::Chart;
use crate::config::{Axis, ChartConfig, ChartKind, ChartSettings, LayoutMode, Orientation};
use crate::error::Result;

/// Builder for spine plots.
#[derive(Debug, Clone)]
pub struct Spineplot {
    config: ChartConfig,
}

impl Default for Spineplot {
    fn default() -> Self {
        Self::new()
    }
}

impl Spineplot {
    /// Create a new spine plot builder.
    #[must_use]
    pub fn new() -> Self {
        Self { config: ChartConfig::new(ChartKind::Spineplot) }
    }

    /// Apply declarative settings to a fresh builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the format specifier is invalid.
    pub fn from_settings(settings: &ChartSettings) -> Result<Self> {
        Ok(Self { config: settings.to_config(ChartKind::Spineplot)? })
    }

    /// Category column; one column per record, labelled with this value.
    #[must_use]
    pub fn category(mut self, column: &str) -> Self {
        self.config.category = Some(column.to_string());
        self
    }

    /// Value column; sets each column's width.
    #[must_use]
    pub fn value(mut self, column: &str) -> Self {
        self.config.value = Some(column.to_string());
        self
    }

    /// Column driving the fill.
    #[must_use]
    pub fn fill(mut self, column: &str) -> Self {
        self.config.color = Some(column.to_string());
        self
    }

    /// Column used for mark ids (`spineplot-<value>`).
    #[must_use]
    pub fn id(mut self, column: &str) -> Self {
        self.config.id = Some(column.to_string());
        self
    }

    /// Lay columns out horizontally (default) or vertically.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        if let LayoutMode::Spine { stack, .. } = &self.config.layout {
            self.config.layout = LayoutMode::Spine { orientation, stack: stack.clone() };
        }
        self
    }

    /// Split every column into proportional segments, one per key column.
    #[must_use]
    pub fn stack_by(mut self, keys: &[&str]) -> Self {
        let axis = match &self.config.layout {
            LayoutMode::Spine { orientation: Orientation::Vertical, .. } => Axis::Y,
            _ => Axis::X,
        };
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
    /// Returns an error if `category` or `value` is missing or the quantile
    /// settings are invalid.
    pub fn build(self) -> Result<Self> {
        self.config.validate()?;
        Ok(self)
    }
}

impl Chart for Spineplot {
    fn config(&self) -> &ChartConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ChartConfig {
        &mut self.config
    }
}

impl batuta_common::display::WithDimensions for Spineplot {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.config.frame.width = width;
        self.config.frame.height = height;
    }
}
