//! Mark geometry for every layout.
//!
//! Positions are computed in plot coordinates and shifted by the frame's
//! margins when written to the surface.

use crate::color::Rgba;
use crate::config::{Axis, ChartConfig, LayoutMode, Orientation};
use crate::data::Record;
use crate::layout::{ColorMode, ScaleSet};
use crate::output::{Surface, SvgElement, TextAnchor};
use crate::prepare::{Prepared, RowLayout, Segment, Span};
use crate::quantile::ColorState;
use crate::scale::{PositionScale, Scale};

/// Opacity of bar and spine fills.
pub const MARK_OPACITY: f64 = 0.9;

/// Minimum segment extent, in pixels, for a stacked spine label.
pub const SEGMENT_LABEL_MIN: f64 = 40.0;

const LABEL_FONT: f64 = 11.0;
const LINE_HEIGHT: f64 = 13.0;

/// Position and size of a drawn mark, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Middle of the top edge.
    #[must_use]
    pub fn top_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y)
    }
}

/// A drawn mark and what it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    /// Index of the rectangle on the surface.
    pub element: usize,
    /// Row of the record in the prepared data.
    pub row: usize,
    /// Group or stack key.
    pub key: Option<String>,
    /// Value of the sub-bar or segment.
    pub value: Option<f64>,
    /// Stack total.
    pub total: Option<f64>,
    /// Where the mark was drawn.
    pub bounds: Bounds,
    /// Fill in the default state.
    pub fill: Rgba,
    /// Fill while hovered, when hover colors are configured.
    pub hover_fill: Option<Rgba>,
}

struct Piece<'a> {
    row: usize,
    record: &'a Record,
    key: Option<&'a str>,
    value: Option<f64>,
    total: Option<f64>,
    rect: Bounds,
    id: Option<String>,
}

struct Painter<'a> {
    config: &'a ChartConfig,
    prepared: &'a Prepared,
    scales: &'a ScaleSet,
    origin: (f64, f64),
    width: f64,
    height: f64,
    marks: Vec<Mark>,
}

/// Draw one mark per record (or per record and key) and, for spine plots, the
/// column and segment labels.
pub(crate) fn draw_marks(
    config: &ChartConfig,
    prepared: &Prepared,
    scales: &ScaleSet,
    surface: &mut Surface,
) -> Vec<Mark> {
    let frame = config.frame;
    let mut painter = Painter {
        config,
        prepared,
        scales,
        origin: (frame.margin.left, frame.margin.top),
        width: frame.inner_width(),
        height: frame.inner_height(),
        marks: Vec::new(),
    };

    for (row, (record, layout)) in prepared.iter().enumerate() {
        match &config.layout {
            LayoutMode::Plain => painter.plain(surface, row, record),
            LayoutMode::GroupBy { axis, keys } => painter.grouped(surface, row, record, *axis, keys),
            LayoutMode::StackBy { axis, .. } => painter.stacked(surface, row, record, layout, *axis),
            LayoutMode::Spine { orientation, stack } => {
                painter.spine(surface, row, record, layout, *orientation, stack.is_some());
            }
        }
    }

    log::debug!(
        target: "trueno_bars::render",
        "drew {} marks for {} records ({})",
        painter.marks.len(),
        prepared.len(),
        config.layout.name()
    );
    painter.marks
}

fn position(scale: &PositionScale, record: &Record, column: Option<&str>) -> Option<f64> {
    column.and_then(|c| record.get(c)).and_then(|v| scale.position(v))
}

/// Extent between a value and the zero baseline, as `(start, length)`.
fn from_baseline(scale: &PositionScale, value: f64) -> Option<(f64, f64)> {
    let base = scale.at(0.0)?;
    let end = scale.at(value)?;
    Some((base.min(end), (base - end).abs()))
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total
    } else {
        0.0
    }
}

impl<'a> Painter<'a> {
    fn skip(&self, row: usize, axis: &str) {
        log::warn!(
            target: "trueno_bars::render",
            "record {row} has no position on the {axis} axis; skipped"
        );
    }

    fn plain(&mut self, surface: &mut Surface, row: usize, record: &'a Record) {
        let (xs, ys) = (&self.scales.x, &self.scales.y);
        let x = position(xs, record, self.config.x.as_deref());
        let y = position(ys, record, self.config.y.as_deref());
        let (Some(x), Some(y)) = (x, y) else {
            self.skip(row, "x or y");
            return;
        };

        let rect = match (xs.bandwidth(), ys.bandwidth()) {
            (Some(bw), None) => {
                let v = self.config.y.as_deref().and_then(|c| record.number(c)).unwrap_or(0.0);
                let (top, height) = from_baseline(ys, v).unwrap_or((y, self.height - y));
                Bounds { x, y: top, width: bw, height }
            }
            (None, Some(bh)) => {
                let v = self.config.x.as_deref().and_then(|c| record.number(c)).unwrap_or(0.0);
                let (left, width) = from_baseline(xs, v).unwrap_or((0.0, x));
                Bounds { x: left, y, width, height: bh }
            }
            (Some(bw), Some(bh)) => Bounds { x, y, width: bw, height: bh },
            (None, None) => Bounds { x: 0.0, y, width: x, height: self.height - y },
        };
        self.push(surface, Piece { row, record, key: None, value: None, total: None, rect, id: None });
    }

    fn grouped(&mut self, surface: &mut Surface, row: usize, record: &'a Record, axis: Axis, keys: &'a [String]) {
        let Some(group) = &self.scales.group else {
            return;
        };
        let (band, column) = match axis {
            Axis::X => (&self.scales.x, self.config.x.as_deref()),
            Axis::Y => (&self.scales.y, self.config.y.as_deref()),
        };
        let Some(start) = position(band, record, column) else {
            self.skip(row, axis_name(axis));
            return;
        };

        for key in keys {
            let (Some(value), Some(offset)) = (record.number(key), group.position(key)) else {
                continue;
            };
            let rect = match axis {
                Axis::X => {
                    let Some((top, height)) = from_baseline(&self.scales.y, value) else { continue };
                    Bounds { x: start + offset, y: top, width: group.bandwidth(), height }
                }
                Axis::Y => {
                    let Some((left, width)) = from_baseline(&self.scales.x, value) else { continue };
                    Bounds { x: left, y: start + offset, width, height: group.bandwidth() }
                }
            };
            let piece =
                Piece { row, record, key: Some(key.as_str()), value: Some(value), total: None, rect, id: None };
            self.push(surface, piece);
        }
    }

    fn stacked(&mut self, surface: &mut Surface, row: usize, record: &'a Record, layout: &'a RowLayout, axis: Axis) {
        let (band, column) = match axis {
            Axis::X => (&self.scales.x, self.config.x.as_deref()),
            Axis::Y => (&self.scales.y, self.config.y.as_deref()),
        };
        let (Some(start), Some(bandwidth)) = (position(band, record, column), band.bandwidth()) else {
            self.skip(row, axis_name(axis));
            return;
        };

        for segment in &layout.segments {
            let rect = match axis {
                Axis::X => {
                    let (Some(a), Some(b)) = (self.scales.y.at(segment.start), self.scales.y.at(segment.end))
                    else {
                        continue;
                    };
                    Bounds { x: start, y: a.min(b), width: bandwidth, height: (a - b).abs() }
                }
                Axis::Y => {
                    let (Some(a), Some(b)) = (self.scales.x.at(segment.start), self.scales.x.at(segment.end))
                    else {
                        continue;
                    };
                    Bounds { x: a.min(b), y: start, width: (b - a).abs(), height: bandwidth }
                }
            };
            self.push(surface, self.segment_piece(row, record, layout, segment, rect, None));
        }
    }

    fn segment_piece(
        &self,
        row: usize,
        record: &'a Record,
        layout: &RowLayout,
        segment: &'a Segment,
        rect: Bounds,
        id: Option<String>,
    ) -> Piece<'a> {
        Piece {
            row,
            record,
            key: Some(segment.key.as_str()),
            value: Some(segment.value()),
            total: Some(layout.total),
            rect,
            id,
        }
    }

    fn spine_id(&self, row: usize, record: &Record) -> String {
        match self.config.id.as_deref() {
            Some(column) => format!("spineplot-{}", record.label(column)),
            None => format!("spineplot-{row}"),
        }
    }

    fn spine(
        &mut self,
        surface: &mut Surface,
        row: usize,
        record: &'a Record,
        layout: &'a RowLayout,
        orientation: Orientation,
        stacked: bool,
    ) {
        let Some(span) = layout.span else {
            return;
        };
        let (xs, ys) = (&self.scales.x, &self.scales.y);
        let id = self.spine_id(row, record);

        if !stacked {
            let (Some(x), Some(width)) = (xs.at(span.start), xs.at(span.width())) else { return };
            let rect = Bounds { x, y: 0.0, width, height: self.height };
            self.push(surface, Piece { row, record, key: None, value: None, total: None, rect, id: Some(id) });
            self.column_label(surface, record, span, Orientation::Horizontal);
            return;
        }

        for segment in &layout.segments {
            let lower = share(segment.start, layout.total);
            let upper = share(segment.end, layout.total);
            let rect = match orientation {
                Orientation::Horizontal => {
                    let (Some(x), Some(width), Some(top), Some(bottom)) =
                        (xs.at(span.start), xs.at(span.width()), ys.at(upper), ys.at(lower))
                    else {
                        continue;
                    };
                    Bounds { x, y: top, width, height: bottom - top }
                }
                Orientation::Vertical => {
                    let (Some(y), Some(height), Some(left), Some(right)) =
                        (ys.at(span.start), ys.at(span.width()), xs.at(lower), xs.at(upper))
                    else {
                        continue;
                    };
                    Bounds { x: left, y, width: right - left, height }
                }
            };
            let piece =
                self.segment_piece(row, record, layout, segment, rect, Some(format!("{id}-{}", segment.key)));
            self.push(surface, piece);
            self.segment_label(surface, record, segment, rect, orientation);
        }
        self.column_label(surface, record, span, orientation);
    }

    fn column_label(&self, surface: &mut Surface, record: &Record, span: Span, orientation: Orientation) {
        let Some(category) = self.config.category.as_deref() else { return };
        let text = record.label(category);
        let (ox, oy) = self.origin;
        let element = match orientation {
            Orientation::Horizontal => {
                let (Some(x), Some(half)) = (self.scales.x.at(span.start), self.scales.x.at(span.width()))
                else {
                    return;
                };
                SvgElement::text(ox + x + half / 2.0, oy + self.height + 16.0, &text, LABEL_FONT, TextAnchor::Middle)
            }
            Orientation::Vertical => {
                let (Some(y), Some(half)) = (self.scales.y.at(span.start), self.scales.y.at(span.width()))
                else {
                    return;
                };
                SvgElement::text(ox - 6.0, oy + y + half / 2.0 + 4.0, &text, LABEL_FONT, TextAnchor::End)
            }
        };
        surface.add_element(element.with_class("tick"));
    }

    fn segment_label(
        &self,
        surface: &mut Surface,
        record: &Record,
        segment: &Segment,
        rect: Bounds,
        orientation: Orientation,
    ) {
        let extent = match orientation {
            Orientation::Horizontal => rect.height,
            Orientation::Vertical => rect.width,
        };
        if extent <= SEGMENT_LABEL_MIN {
            return;
        }

        let mut lines = vec![segment.key.clone(), self.config.formatter.format(segment.value())];
        if let Some(coefficient) = record.number(&format!("{}coefficient", segment.key)) {
            lines.push(format!("({})", self.config.formatter.format(coefficient)));
        }

        let (ox, oy) = self.origin;
        let cx = ox + rect.x + rect.width / 2.0;
        let first = oy + rect.y + rect.height / 2.0 - LINE_HEIGHT * (lines.len() as f64 - 1.0) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let element = SvgElement::text(cx, first + LINE_HEIGHT * i as f64, line, LABEL_FONT, TextAnchor::Middle)
                .with_class("segment-label");
            surface.add_element(element);
        }
    }

    fn fills(&self, record: &Record, key: Option<&str>, value: Option<f64>) -> (Rgba, Option<Rgba>) {
        match &self.scales.color {
            ColorMode::Ordinal(scale) => {
                let label = match key {
                    Some(k) => k.to_string(),
                    None => self.config.color_column().map(|c| record.label(c)).unwrap_or_default(),
                };
                (scale.scale(label.as_str()), None)
            }
            ColorMode::Quantile => {
                let Some(classifier) = self.prepared.classifier() else {
                    return (Rgba::UNCLASSIFIED, None);
                };
                let v = match self.config.color_column() {
                    Some(c) => record.number(c),
                    None => value,
                };
                let hover = classifier.has_hover_colors().then(|| classifier.color(v, ColorState::Hover));
                (classifier.color(v, ColorState::Default), hover)
            }
        }
    }

    fn push(&mut self, surface: &mut Surface, piece: Piece<'a>) {
        let (fill, hover_fill) = self.fills(piece.record, piece.key, piece.value);
        let bounds = Bounds {
            x: self.origin.0 + piece.rect.x,
            y: self.origin.1 + piece.rect.y,
            width: piece.rect.width.max(0.0),
            height: piece.rect.height.max(0.0),
        };
        let spine = piece.id.is_some();
        let element = SvgElement::Rect {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            fill,
            stroke: spine.then_some(Rgba::WHITE),
            stroke_width: 1.0,
            opacity: Some(MARK_OPACITY),
            id: piece.id,
            class: Some("bar".to_string()),
        };
        let index = surface.add_element(element);
        self.marks.push(Mark {
            element: index,
            row: piece.row,
            key: piece.key.map(str::to_string),
            value: piece.value,
            total: piece.total,
            bounds,
            fill,
            hover_fill,
        });
    }
}

fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
    }
}
