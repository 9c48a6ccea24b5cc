//! Legend: one swatch per ordinal key or quantile bucket, laid out in a row
//! inside the top margin.

use crate::color::Rgba;
use crate::config::ChartConfig;
use crate::layout::{ColorMode, ScaleSet};
use crate::output::{Surface, SvgElement, TextAnchor};
use crate::prepare::Prepared;
use crate::scale::Scale;

const SWATCH: f64 = 10.0;
const ENTRY_WIDTH: f64 = 110.0;

/// Legend entries in display order.
#[must_use]
pub fn legend_entries(config: &ChartConfig, prepared: &Prepared, scales: &ScaleSet) -> Vec<(Rgba, String)> {
    match &scales.color {
        ColorMode::Ordinal(scale) => scale
            .domain()
            .into_iter()
            .filter(|key| !key.is_empty())
            .map(|key| (scale.scale(key.as_str()), key))
            .collect(),
        ColorMode::Quantile => {
            let Some(classifier) = prepared.classifier() else {
                return Vec::new();
            };
            classifier
                .breakpoints()
                .bucket_bounds()
                .into_iter()
                .zip(classifier.colors())
                .map(|((lo, hi), color)| {
                    (*color, format!("{} - {}", config.formatter.format(lo), config.formatter.format(hi)))
                })
                .collect()
        }
    }
}

pub(crate) fn draw_legend(config: &ChartConfig, prepared: &Prepared, scales: &ScaleSet, surface: &mut Surface) {
    let entries = legend_entries(config, prepared, scales);
    let left = config.frame.margin.left;
    let top = (config.frame.margin.top / 2.0 - SWATCH / 2.0).max(0.0);

    for (i, (color, label)) in entries.iter().enumerate() {
        let x = left + ENTRY_WIDTH * i as f64;
        surface.add_element(SvgElement::rect(x, top, SWATCH, SWATCH, *color).with_class("legend"));
        surface.add_element(
            SvgElement::text(x + SWATCH + 4.0, top + SWATCH - 1.0, label, 11.0, TextAnchor::Start)
                .with_class("legend"),
        );
    }
}
