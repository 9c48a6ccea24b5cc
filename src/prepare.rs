//! Data preparation: filtering, coercion, ordering, spine spans, stacks and
//! quantile fitting.
//!
//! The caller's records are never modified; every step works on copies.

use crate::config::{ChartConfig, LayoutMode, Order};
use crate::data::{self, Record};
use crate::error::{Error, Result};
use crate::quantile::QuantileClassifier;
use crate::scale::ScaleKind;
use std::cmp::Ordering;

/// Horizontal (or vertical) extent of one spine column, in value units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Running total before this column.
    pub start: f64,
    /// Running total including this column.
    pub end: f64,
}

impl Span {
    /// Width of the column.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// One stacked segment of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Column the segment comes from.
    pub key: String,
    /// Cumulative value below the segment.
    pub start: f64,
    /// Cumulative value at the top of the segment.
    pub end: f64,
}

impl Segment {
    /// Value of the segment itself.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.end - self.start
    }
}

/// Layout-specific data attached to a prepared record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowLayout {
    /// Index of the record in the caller's input.
    pub source_index: usize,
    /// Spine span, spine plots only.
    pub span: Option<Span>,
    /// Stacked segments, stack layouts only.
    pub segments: Vec<Segment>,
    /// Sum of the segments.
    pub total: f64,
}

/// Prepared chart data.
#[derive(Debug, Clone)]
pub struct Prepared {
    records: Vec<Record>,
    rows: Vec<RowLayout>,
    classifier: Option<QuantileClassifier>,
}

impl Prepared {
    /// Prepared records, in drawing order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Layout data, parallel to [`Prepared::records`].
    #[must_use]
    pub fn rows(&self) -> &[RowLayout] {
        &self.rows
    }

    /// Quantile classifier, when quantiles are configured.
    #[must_use]
    pub fn classifier(&self) -> Option<&QuantileClassifier> {
        self.classifier.as_ref()
    }

    /// Number of prepared records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record and layout pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Record, &RowLayout)> {
        self.records.iter().zip(self.rows.iter())
    }

    /// Grand total of a spine plot (end of the last span).
    #[must_use]
    pub fn spine_total(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.span).map(|s| s.end).fold(0.0, f64::max)
    }

    /// Largest stack total.
    #[must_use]
    pub fn max_total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).fold(0.0, f64::max)
    }

    /// `(min, max)` over every numeric value of the given columns.
    #[must_use]
    pub fn union_extent(&self, columns: &[String]) -> Option<(f64, f64)> {
        columns
            .iter()
            .filter_map(|c| data::extent(&self.records, c))
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

/// Prepare `records` for drawing.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] when no record survives filtering,
/// [`Error::NonNumeric`] when a spine value is not a number, or any error of
/// the quantile computation.
pub fn prepare(config: &ChartConfig, records: &[Record]) -> Result<Prepared> {
    let columns = numeric_columns(config);

    let mut indexed: Vec<(usize, Record)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut copy = r.clone();
            for column in &columns {
                copy.coerce(column);
            }
            (i, copy)
        })
        .filter(|(_, r)| config.filter.as_ref().map_or(true, |keep| keep(r)))
        .collect();

    if indexed.is_empty() {
        return Err(Error::EmptyData);
    }

    sort_records(config, &mut indexed);

    let mut rows: Vec<RowLayout> =
        indexed.iter().map(|(i, _)| RowLayout { source_index: *i, ..RowLayout::default() }).collect();

    if let (LayoutMode::Spine { .. }, Some(value)) = (&config.layout, &config.value) {
        let mut running = 0.0;
        for (row, (source, record)) in rows.iter_mut().zip(&indexed) {
            let v = record
                .number(value)
                .ok_or_else(|| Error::NonNumeric { column: value.clone(), row: *source })?;
            row.span = Some(Span { start: running, end: running + v });
            running += v;
        }
    }

    let stack_keys = match &config.layout {
        LayoutMode::StackBy { keys, .. } => Some(keys),
        LayoutMode::Spine { stack: Some(keys), .. } => Some(keys),
        _ => None,
    };
    if let Some(keys) = stack_keys {
        for (row, (_, record)) in rows.iter_mut().zip(&indexed) {
            let mut running = 0.0;
            row.segments = keys
                .iter()
                .map(|key| {
                    let v = record.number(key).unwrap_or(0.0);
                    let segment = Segment { key: key.clone(), start: running, end: running + v };
                    running += v;
                    segment
                })
                .collect();
            row.total = running;
        }
    }

    let records: Vec<Record> = indexed.into_iter().map(|(_, r)| r).collect();

    let classifier = match &config.quantiles {
        Some(quantiles) => {
            let values = quantile_values(config, &records, &rows);
            log::debug!(
                target: "trueno_bars::quantile",
                "fitting {} buckets over {} values",
                quantiles.buckets,
                values.len()
            );
            Some(QuantileClassifier::fit(&values, quantiles, config.range)?)
        }
        None => None,
    };

    Ok(Prepared { records, rows, classifier })
}

/// Columns whose numeric-looking text is converted to numbers.
fn numeric_columns(config: &ChartConfig) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let role_columns = match config.layout {
        LayoutMode::Spine { .. } => vec![&config.value, &config.color],
        _ => {
            let mut v = vec![&config.color];
            if config.x_scale == ScaleKind::Linear {
                v.push(&config.x);
            }
            if config.y_scale == ScaleKind::Linear {
                v.push(&config.y);
            }
            v
        }
    };
    columns.extend(role_columns.into_iter().flatten().cloned());
    columns.extend(config.layout.keys().iter().cloned());
    columns
}

fn sort_records(config: &ChartConfig, indexed: &mut [(usize, Record)]) {
    if config.sort_by.is_empty() {
        if let (LayoutMode::Spine { .. }, Some(category)) = (&config.layout, &config.category) {
            indexed.sort_by(|(_, a), (_, b)| compare_column(a, b, category, Order::Asc));
        }
        return;
    }
    indexed.sort_by(|(_, a), (_, b)| {
        config
            .sort_by
            .iter()
            .map(|key| compare_column(a, b, &key.column, key.order))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn compare_column(a: &Record, b: &Record, column: &str, order: Order) -> Ordering {
    let null = data::Value::Null;
    let av = a.get(column).unwrap_or(&null);
    let bv = b.get(column).unwrap_or(&null);
    match order {
        Order::Asc => data::ascending(av, bv),
        Order::Desc => data::descending(av, bv),
    }
}

/// Values the quantile classifier is fitted on: the color column, or the
/// segment values when the layout splits records into keys.
fn quantile_values(config: &ChartConfig, records: &[Record], rows: &[RowLayout]) -> Vec<f64> {
    if let Some(color) = config.color_column() {
        return data::numeric_column(records, color);
    }
    match &config.layout {
        LayoutMode::GroupBy { keys, .. } => {
            keys.iter().flat_map(|k| data::numeric_column(records, k)).collect()
        }
        _ => rows.iter().flat_map(|r| r.segments.iter().map(Segment::value)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Axis, ChartKind, SortKey};
    use crate::quantile::QuantileConfig;
    use std::rc::Rc;

    fn spine_config() -> ChartConfig {
        let mut config = ChartConfig::new(ChartKind::Spineplot);
        config.category = Some("region".to_string());
        config.value = Some("total".to_string());
        config
    }

    fn regions() -> Vec<Record> {
        vec![
            Record::new().with("region", "south").with("total", "30").with("men", 10.0).with("women", 20.0),
            Record::new().with("region", "east").with("total", 10.0).with("men", 4.0).with("women", 6.0),
            Record::new().with("region", "north").with("total", 60.0).with("men", 25.0).with("women", 35.0),
        ]
    }

    #[test]
    fn test_spine_sorted_by_category_with_spans() {
        let input = regions();
        let prepared = prepare(&spine_config(), &input).unwrap();
        let labels: Vec<String> = prepared.records().iter().map(|r| r.label("region")).collect();
        assert_eq!(labels, vec!["east", "north", "south"]);

        let spans: Vec<Span> = prepared.rows().iter().filter_map(|r| r.span).collect();
        assert_eq!(spans[0], Span { start: 0.0, end: 10.0 });
        assert_eq!(spans[1], Span { start: 10.0, end: 70.0 });
        assert_eq!(spans[2], Span { start: 70.0, end: 100.0 });
        assert_eq!(prepared.spine_total(), 100.0);
        assert_eq!(prepared.rows()[2].source_index, 0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = regions();
        let _ = prepare(&spine_config(), &input).unwrap();
        assert_eq!(input[0].get("total"), Some(&data::Value::from("30")));
    }

    #[test]
    fn test_spine_rejects_non_numeric_value() {
        let input = vec![Record::new().with("region", "a").with("total", "lots")];
        let err = prepare(&spine_config(), &input).unwrap_err();
        assert!(matches!(err, Error::NonNumeric { row: 0, .. }));
    }

    #[test]
    fn test_non_numeric_reports_input_row() {
        let input = vec![
            Record::new().with("region", "b").with("total", 10.0),
            Record::new().with("region", "c").with("total", 20.0),
            Record::new().with("region", "a").with("total", "lots"),
        ];
        // "a" sorts first but is the third input record.
        let err = prepare(&spine_config(), &input).unwrap_err();
        assert!(matches!(err, Error::NonNumeric { row: 2, .. }));
    }

    #[test]
    fn test_filter_then_empty() {
        let mut config = spine_config();
        config.filter = Some(Rc::new(|r: &Record| r.number("total").is_some_and(|t| t > 20.0)));
        let prepared = prepare(&config, &regions()).unwrap();
        assert_eq!(prepared.len(), 2);

        config.filter = Some(Rc::new(|_: &Record| false));
        assert!(matches!(prepare(&config, &regions()), Err(Error::EmptyData)));
    }

    #[test]
    fn test_multi_key_sort() {
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.x = Some("region".to_string());
        config.y = Some("total".to_string());
        config.sort_by = vec![SortKey { column: "total".to_string(), order: Order::Desc }];
        let prepared = prepare(&config, &regions()).unwrap();
        let labels: Vec<String> = prepared.records().iter().map(|r| r.label("region")).collect();
        assert_eq!(labels, vec!["north", "south", "east"]);
    }

    #[test]
    fn test_stack_segments_are_cumulative() {
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.x = Some("region".to_string());
        config.request_stack_by(Axis::X, vec!["men".to_string(), "women".to_string()]);
        let prepared = prepare(&config, &regions()).unwrap();
        let first = &prepared.rows()[0];
        assert_eq!(first.segments[0], Segment { key: "men".to_string(), start: 0.0, end: 10.0 });
        assert_eq!(first.segments[1], Segment { key: "women".to_string(), start: 10.0, end: 30.0 });
        assert_eq!(first.total, 30.0);
        assert_eq!(prepared.max_total(), 60.0);
    }

    #[test]
    fn test_classifier_fitted_on_color_column() {
        let mut config = spine_config();
        config.color = Some("total".to_string());
        config.quantiles = Some(QuantileConfig::new().buckets(2));
        let prepared = prepare(&config, &regions()).unwrap();
        let classifier = prepared.classifier().unwrap();
        assert_eq!(classifier.breakpoints().len(), 3);
        assert_eq!(classifier.range(), Some((10.0, 60.0)));
    }

    #[test]
    fn test_union_extent() {
        let prepared = prepare(&spine_config(), &regions()).unwrap();
        let extent = prepared.union_extent(&["men".to_string(), "women".to_string()]);
        assert_eq!(extent, Some((4.0, 35.0)));
    }

    #[test]
    fn test_sort_with_nan_values_is_total() {
        let records: Vec<Record> = (0..64)
            .map(|i| {
                let total = if i % 3 == 0 { f64::NAN } else { f64::from((i * 37) % 23) };
                Record::new().with("region", format!("r{i}").as_str()).with("total", total)
            })
            .collect();
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.x = Some("region".to_string());
        config.y = Some("total".to_string());

        for order in [Order::Asc, Order::Desc] {
            config.sort_by = vec![SortKey { column: "total".to_string(), order }];
            let prepared = prepare(&config, &records).unwrap();
            let totals: Vec<f64> = prepared.records().iter().filter_map(|r| r.number("total")).collect();
            let numbers: Vec<f64> = totals.iter().copied().filter(|t| !t.is_nan()).collect();
            assert_eq!(prepared.len(), 64);
            assert_eq!(totals.iter().filter(|t| t.is_nan()).count(), 22);
            match order {
                Order::Asc => {
                    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
                    assert!(totals[42..].iter().all(|t| t.is_nan()));
                }
                Order::Desc => {
                    assert!(numbers.windows(2).all(|w| w[0] >= w[1]));
                    assert!(totals[..22].iter().all(|t| t.is_nan()));
                }
            }
        }
    }
}
