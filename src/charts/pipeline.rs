//! Pipeline stages: data loaded, scaled and drawn.
//!
//! Each stage consumes the previous one, so a chart can only move forward:
//! `BarChart`/`Spineplot` → [`Loaded`] → [`Scaled`] → [`Drawn`].

use super::legend::draw_legend;
use super::marks::{draw_marks, Mark};
use crate::config::ChartConfig;
use crate::data::Record;
use crate::error::{Error, Result};
use crate::layout::{select_scales, ScaleSet};
use crate::output::Surface;
use crate::prepare::{prepare, Prepared};
use crate::tooltip::{tip_content, TipTarget, Tooltip};

/// Chart with prepared data.
#[derive(Debug)]
pub struct Loaded<'c> {
    config: &'c ChartConfig,
    prepared: Prepared,
}

impl<'c> Loaded<'c> {
    pub(crate) fn new(config: &'c ChartConfig, records: &[Record]) -> Result<Self> {
        config.validate()?;
        let prepared = prepare(config, records)?;
        log::debug!(
            target: "trueno_bars::pipeline",
            "{} loaded {} of {} records",
            config.kind.name(),
            prepared.len(),
            records.len()
        );
        Ok(Self { config, prepared })
    }

    /// The prepared data.
    #[must_use]
    pub fn prepared(&self) -> &Prepared {
        &self.prepared
    }

    /// Select scales for the chart's layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a scale domain cannot be built.
    pub fn scale(self) -> Result<Scaled<'c>> {
        let frame = self.config.frame;
        let scales = select_scales(self.config, &self.prepared, frame.inner_width(), frame.inner_height())?;
        Ok(Scaled { config: self.config, prepared: self.prepared, scales })
    }
}

/// Chart with prepared data and scales.
#[derive(Debug)]
pub struct Scaled<'c> {
    config: &'c ChartConfig,
    prepared: Prepared,
    scales: ScaleSet,
}

impl<'c> Scaled<'c> {
    /// The prepared data.
    #[must_use]
    pub fn prepared(&self) -> &Prepared {
        &self.prepared
    }

    /// The selected scales.
    #[must_use]
    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Append the chart's marks (and legend, if enabled) to `surface`.
    ///
    /// Drawing onto a surface that already holds a chart appends a second set
    /// of marks.
    pub fn draw(self, surface: &mut Surface) -> Drawn<'c> {
        let marks = draw_marks(self.config, &self.prepared, &self.scales, surface);
        if self.config.legend {
            draw_legend(self.config, &self.prepared, &self.scales, surface);
        }
        let tooltip = Tooltip::new(&format!("tip-{}", self.config.kind.name()));
        Drawn { config: self.config, prepared: self.prepared, scales: self.scales, marks, tooltip }
    }
}

/// A drawn chart: marks on a surface plus the interaction state.
#[derive(Debug)]
pub struct Drawn<'c> {
    config: &'c ChartConfig,
    prepared: Prepared,
    scales: ScaleSet,
    marks: Vec<Mark>,
    tooltip: Tooltip,
}

impl Drawn<'_> {
    /// Drawn marks, in drawing order.
    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// The prepared data.
    #[must_use]
    pub fn prepared(&self) -> &Prepared {
        &self.prepared
    }

    /// The scales the marks were drawn with.
    #[must_use]
    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Tooltip state.
    #[must_use]
    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    fn target(&self, index: usize) -> Result<(&Mark, &Record)> {
        let mark = self.marks.get(index).ok_or(Error::MarkNotFound(index))?;
        let record = self.prepared.records().get(mark.row).ok_or(Error::MarkNotFound(index))?;
        Ok((mark, record))
    }

    /// Pointer entered mark `index`: switch to the hover fill when one is
    /// configured, show the tooltip, then call the mouse-over hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarkNotFound`] for an unknown mark.
    pub fn mouse_over(&mut self, surface: &mut Surface, index: usize) -> Result<()> {
        let (mark, record) = self.target(index)?;
        if let Some(hover) = mark.hover_fill {
            surface.set_fill(mark.element, hover)?;
        }
        let target =
            TipTarget { record, row: mark.row, key: mark.key.as_deref(), value: mark.value, total: mark.total };
        let html = tip_content(self.config, &target);
        let (anchor, row) = (mark.bounds.top_center(), mark.row);
        if let Some(hook) = &self.config.hooks.on_mouse_over {
            hook(record, row);
        }
        self.tooltip.show(html, anchor, index);
        Ok(())
    }

    /// Pointer left mark `index`: restore the fill, hide the tooltip, then
    /// call the mouse-out hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarkNotFound`] for an unknown mark.
    pub fn mouse_out(&mut self, surface: &mut Surface, index: usize) -> Result<()> {
        let (mark, record) = self.target(index)?;
        if mark.hover_fill.is_some() {
            surface.set_fill(mark.element, mark.fill)?;
        }
        if let Some(hook) = &self.config.hooks.on_mouse_out {
            hook(record, mark.row);
        }
        self.tooltip.hide();
        Ok(())
    }

    /// Mark `index` was clicked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarkNotFound`] for an unknown mark.
    pub fn click(&self, index: usize) -> Result<()> {
        let (mark, record) = self.target(index)?;
        if let Some(hook) = &self.config.hooks.on_click {
            hook(record, mark.row);
        }
        Ok(())
    }
}
