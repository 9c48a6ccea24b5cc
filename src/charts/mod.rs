//! Chart components.
//!
//! - [`BarChart`]: plain, grouped and stacked bars
//! - [`Spineplot`]: variable-width columns, optionally stacked

mod bars;
mod legend;
mod marks;
mod pipeline;
mod spineplot;

pub use bars::BarChart;
pub use legend::legend_entries;
pub use marks::{Bounds, Mark, MARK_OPACITY, SEGMENT_LABEL_MIN};
pub use pipeline::{Drawn, Loaded, Scaled};
pub use spineplot::Spineplot;

use crate::color::Rgba;
use crate::config::{ChartConfig, Margin, Order, SortKey};
use crate::data::Record;
use crate::error::Result;
use crate::format::Formatter;
use crate::output::Surface;
use crate::quantile::QuantileConfig;
use crate::scale::OrdinalScale;
use crate::tooltip::TipTarget;
use std::rc::Rc;

/// Behaviour shared by every chart component: the common builder options
/// and the entry point into the pipeline.
pub trait Chart: Sized {
    /// The chart's configuration.
    fn config(&self) -> &ChartConfig;

    /// Mutable access for builder methods.
    fn config_mut(&mut self) -> &mut ChartConfig;

    /// Add a sort directive; earlier directives take precedence.
    #[must_use]
    fn sort_by(mut self, column: &str, order: Order) -> Self {
        self.config_mut().sort_by.push(SortKey { column: column.to_string(), order });
        self
    }

    /// Use a d3-style format specifier such as `",.1f"`.
    #[must_use]
    fn format(mut self, spec: &str) -> Self {
        self.config_mut().set_format(spec);
        self
    }

    /// Use a formatter.
    #[must_use]
    fn formatter(mut self, formatter: Formatter) -> Self {
        self.config_mut().formatter = formatter;
        self
    }

    /// Replace the default tooltip content.
    #[must_use]
    fn tip(mut self, render: impl Fn(&TipTarget<'_>) -> String + 'static) -> Self {
        self.config_mut().tip = Some(Rc::new(render));
        self
    }

    /// Draw a legend.
    #[must_use]
    fn legend(mut self, enabled: bool) -> Self {
        self.config_mut().legend = enabled;
        self
    }

    /// Keep only records for which `keep` returns true.
    #[must_use]
    fn filter(mut self, keep: impl Fn(&Record) -> bool + 'static) -> Self {
        self.config_mut().filter = Some(Rc::new(keep));
        self
    }

    /// Hook called when the pointer enters a mark.
    #[must_use]
    fn on_mouse_over(mut self, hook: impl Fn(&Record, usize) + 'static) -> Self {
        self.config_mut().hooks.on_mouse_over = Some(Rc::new(hook));
        self
    }

    /// Hook called when the pointer leaves a mark.
    #[must_use]
    fn on_mouse_out(mut self, hook: impl Fn(&Record, usize) + 'static) -> Self {
        self.config_mut().hooks.on_mouse_out = Some(Rc::new(hook));
        self
    }

    /// Hook called when a mark is clicked.
    #[must_use]
    fn on_click(mut self, hook: impl Fn(&Record, usize) + 'static) -> Self {
        self.config_mut().hooks.on_click = Some(Rc::new(hook));
        self
    }

    /// Color marks by quantile bucket instead of the ordinal scale.
    #[must_use]
    fn quantiles(mut self, quantiles: QuantileConfig) -> Self {
        self.config_mut().quantiles = Some(quantiles);
        self
    }

    /// Explicit `[min, max]`; values outside get the out-of-range color.
    #[must_use]
    fn range(mut self, min: f64, max: f64) -> Self {
        self.config_mut().range = Some((min, max));
        self
    }

    /// Ordinal color range.
    #[must_use]
    fn colors(mut self, colors: &[Rgba]) -> Self {
        self.config_mut().colors = Some(colors.to_vec());
        self
    }

    /// Preconfigured ordinal color scale.
    #[must_use]
    fn color_scale(mut self, scale: OrdinalScale) -> Self {
        self.config_mut().color_scale = Some(scale);
        self
    }

    /// Margins around the plot area.
    #[must_use]
    fn margin(mut self, margin: Margin) -> Self {
        self.config_mut().frame.margin = margin;
        self
    }

    /// A blank surface of the chart's size.
    #[must_use]
    fn surface(&self) -> Surface {
        let frame = self.config().frame;
        Surface::new(frame.width, frame.height)
    }

    /// Load data: validate, filter, coerce, sort and classify.
    ///
    /// # Errors
    ///
    /// Returns configuration errors or data errors from preparation.
    fn load(&self, records: &[Record]) -> Result<Loaded<'_>> {
        Loaded::new(self.config(), records)
    }

    /// Load, scale and draw in one step.
    ///
    /// # Errors
    ///
    /// See [`Chart::load`] and [`Loaded::scale`].
    fn render(&self, records: &[Record], surface: &mut Surface) -> Result<Drawn<'_>> {
        Ok(self.load(records)?.scale()?.draw(surface))
    }
}
