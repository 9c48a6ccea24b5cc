//! Scale selection per layout.
//!
//! Every [`LayoutMode`] maps to one pair of positional scales, an optional
//! inner band scale for grouped bars and a color scale.
//!
//! | layout            | x                         | y                         |
//! |-------------------|---------------------------|---------------------------|
//! | plain             | x column, `[0, w]`        | y column, `[h, 0]`        |
//! | group-by-x        | band over x               | linear over key values    |
//! | group-by-y        | linear over key values    | band over y               |
//! | stack-by-x        | band over x               | `[0, max total]`          |
//! | stack-by-y        | `[0, max total]`          | band over y               |
//! | spine             | `[0, grand total]`        | value, `[h, 0]`           |
//! | spine, horizontal | `[0, grand total]`        | `[0, 1]`, `[h, 0]`        |
//! | spine, vertical   | `[0, 1]`, `[0, w]`        | `[0, grand total]`, `[0, h]` |

use crate::color::{Rgba, CATEGORY10, CATEGORY20C};
use crate::config::{Axis, ChartConfig, ChartKind, LayoutMode, Orientation};
use crate::data;
use crate::error::{Error, Result};
use crate::prepare::Prepared;
use crate::scale::{generate_scale, linear_over, BandScale, OrdinalScale, PositionScale, ScaleSpec};

/// Inner padding between grouped sub-bars.
pub const GROUP_PADDING: f64 = 0.05;

/// How marks are colored.
#[derive(Debug, Clone)]
pub enum ColorMode {
    /// Ordinal scale over keys or the color column.
    Ordinal(OrdinalScale),
    /// Quantile classification; the classifier lives on the prepared data.
    Quantile,
}

/// Scales for one draw.
#[derive(Debug, Clone)]
pub struct ScaleSet {
    /// Horizontal scale.
    pub x: PositionScale,
    /// Vertical scale.
    pub y: PositionScale,
    /// Sub-band scale over group keys, group-by layouts only.
    pub group: Option<BandScale>,
    /// Fill scale.
    pub color: ColorMode,
}

/// Select the scales for `prepared` in a `width` x `height` plot area.
///
/// # Errors
///
/// Returns [`Error::MissingConfig`] if a required column is absent or
/// [`Error::ScaleDomain`] if a column has no usable values.
pub fn select_scales(config: &ChartConfig, prepared: &Prepared, width: f64, height: f64) -> Result<ScaleSet> {
    let records = prepared.records();
    let horizontal = (0.0, width);
    let vertical = (height, 0.0);

    let (x, y, group) = match &config.layout {
        LayoutMode::Plain => {
            let x = column(&config.x, "x")?;
            let y = column(&config.y, "y")?;
            let x_spec = ScaleSpec { kind: config.x_scale, ..ScaleSpec::linear(x, horizontal) };
            let y_spec = ScaleSpec { kind: config.y_scale, ..ScaleSpec::linear(y, vertical) };
            (generate_scale(records, &x_spec)?, generate_scale(records, &y_spec)?, None)
        }
        LayoutMode::GroupBy { axis, keys } => {
            let extent = prepared
                .union_extent(keys)
                .ok_or_else(|| Error::ScaleDomain("group keys have no numeric values".to_string()))?;
            match axis {
                Axis::X => {
                    let x = band(records, column(&config.x, "x")?, horizontal)?;
                    let group = inner_band(keys, &x)?;
                    let y = linear_over(extent, vertical, true)?;
                    (x, PositionScale::Linear(y), Some(group))
                }
                Axis::Y => {
                    let y = band(records, column(&config.y, "y")?, (0.0, height))?;
                    let group = inner_band(keys, &y)?;
                    let x = linear_over(extent, horizontal, true)?;
                    (PositionScale::Linear(x), y, Some(group))
                }
            }
        }
        LayoutMode::StackBy { axis, .. } => {
            let totals = (0.0, prepared.max_total());
            match axis {
                Axis::X => {
                    let x = band(records, column(&config.x, "x")?, horizontal)?;
                    (x, PositionScale::Linear(linear_over(totals, vertical, true)?), None)
                }
                Axis::Y => {
                    let y = band(records, column(&config.y, "y")?, (0.0, height))?;
                    (PositionScale::Linear(linear_over(totals, horizontal, true)?), y, None)
                }
            }
        }
        LayoutMode::Spine { orientation, stack } => {
            let total = (0.0, prepared.spine_total());
            let unit = (0.0, 1.0);
            match (stack, orientation) {
                (None, _) => {
                    let value = column(&config.value, "value")?;
                    let extent = data::extent(records, value).ok_or_else(|| {
                        Error::ScaleDomain(format!("column '{value}' has no numeric values"))
                    })?;
                    (
                        PositionScale::Linear(linear_over(total, horizontal, true)?),
                        PositionScale::Linear(linear_over(extent, vertical, true)?),
                        None,
                    )
                }
                (Some(_), Orientation::Horizontal) => (
                    PositionScale::Linear(linear_over(total, horizontal, true)?),
                    PositionScale::Linear(linear_over(unit, vertical, true)?),
                    None,
                ),
                (Some(_), Orientation::Vertical) => (
                    PositionScale::Linear(linear_over(unit, horizontal, true)?),
                    PositionScale::Linear(linear_over(total, (0.0, height), true)?),
                    None,
                ),
            }
        }
    };

    let color = color_mode(config, prepared)?;
    log::debug!(target: "trueno_bars::layout", "selected scales for {}", config.layout.name());
    Ok(ScaleSet { x, y, group, color })
}

fn column<'a>(column: &'a Option<String>, role: &'static str) -> Result<&'a str> {
    column.as_deref().ok_or(Error::MissingConfig(role))
}

fn band(records: &[data::Record], column: &str, range: (f64, f64)) -> Result<PositionScale> {
    generate_scale(records, &ScaleSpec::band(column, range))
}

fn inner_band(keys: &[String], outer: &PositionScale) -> Result<BandScale> {
    let width = outer.bandwidth().unwrap_or(0.0);
    BandScale::with_padding(keys.to_vec(), (0.0, width), GROUP_PADDING, 0.0)
}

/// Default palette for a component.
#[must_use]
pub fn default_palette(kind: ChartKind) -> &'static [Rgba] {
    match kind {
        ChartKind::Bars => &CATEGORY20C,
        ChartKind::Spineplot => &CATEGORY10,
    }
}

fn color_mode(config: &ChartConfig, prepared: &Prepared) -> Result<ColorMode> {
    if config.quantiles.is_some() {
        if config.colors.is_some() || config.color_scale.is_some() {
            log::warn!(
                target: "trueno_bars::layout",
                "ordinal colors ignored: quantile classification drives the fill"
            );
        }
        return Ok(ColorMode::Quantile);
    }
    let scale = match (&config.color_scale, &config.colors) {
        (Some(scale), _) => scale.clone(),
        (None, Some(colors)) => OrdinalScale::new(colors)?,
        (None, None) => OrdinalScale::new(default_palette(config.kind))?,
    };
    let keys = config.layout.keys();
    let seeded = if !keys.is_empty() {
        scale.with_domain(keys)
    } else if let Some(color) = config.color_column() {
        scale.with_domain(&data::distinct_labels(prepared.records(), color))
    } else {
        scale
    };
    Ok(ColorMode::Ordinal(seeded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use crate::prepare::prepare;
    use crate::quantile::QuantileConfig;
    use crate::scale::{Scale, ScaleKind};
    use approx::assert_abs_diff_eq;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("region", "a").with("total", 10.0).with("m", 4.0).with("f", 6.0),
            Record::new().with("region", "b").with("total", 30.0).with("m", 12.0).with("f", 18.0),
        ]
    }

    fn bars() -> ChartConfig {
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.x = Some("region".to_string());
        config.y = Some("total".to_string());
        config
    }

    fn select(config: &ChartConfig) -> ScaleSet {
        let prepared = prepare(config, &records()).unwrap();
        select_scales(config, &prepared, 200.0, 100.0).unwrap()
    }

    #[test]
    fn test_plain_band_and_linear() {
        let scales = select(&bars());
        assert!(!scales.x.is_linear());
        assert_abs_diff_eq!(scales.y.at(0.0).unwrap(), 100.0);
        assert_abs_diff_eq!(scales.y.at(30.0).unwrap(), 0.0);
        assert!(scales.group.is_none());
    }

    #[test]
    fn test_plain_linear_x() {
        let mut config = bars();
        config.x = Some("m".to_string());
        config.x_scale = ScaleKind::Linear;
        let scales = select(&config);
        assert!(scales.x.is_linear());
        assert_abs_diff_eq!(scales.x.at(12.0).unwrap(), 200.0);
    }

    #[test]
    fn test_group_by_x_scales() {
        let mut config = bars();
        config.request_group_by(Axis::X, vec!["m".to_string(), "f".to_string()]);
        let scales = select(&config);
        let group = scales.group.unwrap();
        let outer = scales.x.bandwidth().unwrap();
        assert_eq!(group.domain(), ["m".to_string(), "f".to_string()]);
        assert!(group.bandwidth() * 2.0 <= outer);
        // Union of key values is [4, 18], stretched to zero.
        assert_abs_diff_eq!(scales.y.at(18.0).unwrap(), 0.0);
        assert_abs_diff_eq!(scales.y.at(0.0).unwrap(), 100.0);
    }

    #[test]
    fn test_group_by_y_transposes() {
        let mut config = bars();
        config.request_group_by(Axis::Y, vec!["m".to_string(), "f".to_string()]);
        let scales = select(&config);
        assert!(scales.x.is_linear());
        assert!(!scales.y.is_linear());
        assert_abs_diff_eq!(scales.x.at(18.0).unwrap(), 200.0);
    }

    #[test]
    fn test_stack_by_uses_max_total() {
        let mut config = bars();
        config.request_stack_by(Axis::X, vec!["m".to_string(), "f".to_string()]);
        let scales = select(&config);
        assert_abs_diff_eq!(scales.y.at(30.0).unwrap(), 0.0);

        let mut config = bars();
        config.request_stack_by(Axis::Y, vec!["m".to_string(), "f".to_string()]);
        let scales = select(&config);
        assert_abs_diff_eq!(scales.x.at(30.0).unwrap(), 200.0);
    }

    fn spine() -> ChartConfig {
        let mut config = ChartConfig::new(ChartKind::Spineplot);
        config.category = Some("region".to_string());
        config.value = Some("total".to_string());
        config
    }

    #[test]
    fn test_spine_scales() {
        let scales = select(&spine());
        assert_abs_diff_eq!(scales.x.at(40.0).unwrap(), 200.0);
        assert_abs_diff_eq!(scales.y.at(30.0).unwrap(), 0.0);

        let mut config = spine();
        config.request_stack_by(Axis::X, vec!["m".to_string(), "f".to_string()]);
        let scales = select(&config);
        assert_abs_diff_eq!(scales.y.at(1.0).unwrap(), 0.0);
        assert_abs_diff_eq!(scales.y.at(0.0).unwrap(), 100.0);

        let mut config = spine();
        config.request_stack_by(Axis::Y, vec!["m".to_string(), "f".to_string()]);
        let scales = select(&config);
        assert_abs_diff_eq!(scales.x.at(1.0).unwrap(), 200.0);
        assert_abs_diff_eq!(scales.y.at(40.0).unwrap(), 100.0);
    }

    #[test]
    fn test_color_disabled_under_quantiles() {
        let mut config = bars();
        config.color = Some("total".to_string());
        config.quantiles = Some(QuantileConfig::new().buckets(2));
        assert!(matches!(select(&config).color, ColorMode::Quantile));
    }

    #[test]
    fn test_ordinal_seeded_with_keys() {
        let mut config = bars();
        config.request_stack_by(Axis::X, vec!["m".to_string(), "f".to_string()]);
        match select(&config).color {
            ColorMode::Ordinal(scale) => {
                assert_eq!(scale.domain(), vec!["m".to_string(), "f".to_string()]);
                assert_eq!(scale.scale("f"), CATEGORY20C[1]);
            }
            ColorMode::Quantile => panic!("expected ordinal colors"),
        }
    }

    #[test]
    fn test_spine_default_palette() {
        let mut config = spine();
        config.color = Some("region".to_string());
        match select(&config).color {
            ColorMode::Ordinal(scale) => assert_eq!(scale.scale("a"), CATEGORY10[0]),
            ColorMode::Quantile => panic!("expected ordinal colors"),
        }
    }
}
