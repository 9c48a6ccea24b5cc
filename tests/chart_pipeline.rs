//! End-to-end chart tests: configuration through drawing and interaction.
//!
//! Run: cargo test --test chart_pipeline

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use trueno_bars::charts::legend_entries;
use trueno_bars::prelude::*;
use trueno_bars::quantile::Classification;

fn population() -> Vec<Record> {
    serde_yaml_ng::from_str(
        r"
- {region: north, total: 120, men: 50, women: 70}
- {region: south, total: 80, men: 30, women: 50}
- {region: east, total: '45', men: 20, women: 25}
- {region: west, total: 0, men: 0, women: 0}
- {region: centre, total: 260, men: 120, women: 140}
",
    )
    .unwrap()
}

fn reds() -> Vec<Rgba> {
    ["#f7c7c5", "#e65158", "#c20216", "#750000", "#480000"]
        .iter()
        .map(|h| Rgba::from_hex(h).unwrap())
        .collect()
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_group_and_stack_cannot_combine() {
    let chart = BarChart::new()
        .x("region")
        .group_by(Axis::X, &["men"])
        .stack_by(Axis::X, &["women"]);
    assert!(matches!(chart.build(), Err(Error::ConflictingLayout { .. })));

    // The pipeline refuses the same configuration.
    let chart = BarChart::new()
        .x("region")
        .stack_by(Axis::Y, &["women"])
        .group_by(Axis::Y, &["men"]);
    assert!(chart.load(&population()).is_err());
}

#[test]
fn test_zero_buckets_rejected() {
    let chart = BarChart::new()
        .x("region")
        .y("total")
        .color("total")
        .quantiles(QuantileConfig::new().buckets(0));
    assert!(matches!(chart.build(), Err(Error::InvalidQuantiles(_))));
}

#[test]
fn test_invalid_format_rejected() {
    let chart = BarChart::new().x("region").y("total").format("%%");
    assert!(matches!(chart.build(), Err(Error::InvalidFormat(_))));
}

// ============================================================================
// Quantile coloring
// ============================================================================

#[test]
fn test_quantile_colors_and_legend() {
    let chart = BarChart::new()
        .x("region")
        .y("total")
        .color("total")
        .quantiles(QuantileConfig::new().colors(&reds()))
        .legend(true)
        .build()
        .unwrap();
    let mut surface = chart.surface();
    let drawn = chart.render(&population(), &mut surface).unwrap();

    let classifier = drawn.prepared().classifier().unwrap();
    assert_eq!(classifier.breakpoints().len(), 6);
    // The largest value lands in the top bucket, the smallest in the first.
    assert_eq!(drawn.marks()[4].fill, reds()[4]);
    assert_eq!(drawn.marks()[3].fill, reds()[0]);

    let entries = legend_entries(chart.config(), drawn.prepared(), drawn.scales());
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].0, reds()[0]);
    assert_eq!(surface.with_class("legend").count(), 10);
}

#[test]
fn test_explicit_range_marks_out_of_range() {
    let grey = Rgba::rgb(1, 2, 3);
    let chart = BarChart::new()
        .x("region")
        .y("total")
        .color("total")
        .range(10.0, 200.0)
        .quantiles(QuantileConfig::new().buckets(3).colors(&reds()).out_of_range_color(grey));
    let mut surface = chart.surface();
    let drawn = chart.render(&population(), &mut surface).unwrap();

    let classifier = drawn.prepared().classifier().unwrap();
    assert_eq!(classifier.classify(260.0), Classification::OutOfRange);
    assert_eq!(drawn.marks()[4].fill, grey);
    assert_eq!(drawn.marks()[3].fill, grey);
    assert_ne!(drawn.marks()[0].fill, grey);
}

#[test]
fn test_ignore_zeros_breakpoints() {
    let chart = BarChart::new()
        .x("region")
        .y("total")
        .color("total")
        .quantiles(QuantileConfig::new().buckets(3).ignore_zeros(true));
    let loaded = chart.load(&population()).unwrap();
    let bp = loaded.prepared().classifier().unwrap().breakpoints().as_slice().to_vec();
    assert_eq!(bp.len(), 4);
    assert_eq!(bp[0], 0.0);
    assert_eq!(bp[1], 0.0);
    assert_eq!(bp[3], 260.0);
}

#[test]
fn test_predefined_breakpoints() {
    let chart = Spineplot::new()
        .category("region")
        .value("total")
        .fill("total")
        .quantiles(QuantileConfig::new().predefined(&[0.0, 50.0, 100.0, 300.0]).colors(&reds()));
    let mut surface = chart.surface();
    let drawn = chart.render(&population(), &mut surface).unwrap();
    assert_eq!(drawn.prepared().classifier().unwrap().breakpoints().as_slice(), &[0.0, 50.0, 100.0, 300.0]);

    // Sorted by region: centre, east, north, south, west.
    let fills: Vec<Rgba> = drawn.marks().iter().map(|m| m.fill).collect();
    assert_eq!(fills, vec![reds()[2], reds()[0], reds()[2], reds()[1], reds()[0]]);
}

// ============================================================================
// Interaction
// ============================================================================

#[test]
fn test_hooks_receive_record_and_row() {
    let seen: Rc<RefCell<Vec<(String, String, usize)>>> = Rc::default();
    let (over, out, click) = (Rc::clone(&seen), Rc::clone(&seen), Rc::clone(&seen));

    let chart = Spineplot::new()
        .category("region")
        .value("total")
        .on_mouse_over(move |r, i| over.borrow_mut().push(("over".into(), r.label("region"), i)))
        .on_mouse_out(move |r, i| out.borrow_mut().push(("out".into(), r.label("region"), i)))
        .on_click(move |r, i| click.borrow_mut().push(("click".into(), r.label("region"), i)));
    let mut surface = chart.surface();
    let mut drawn = chart.render(&population(), &mut surface).unwrap();

    drawn.mouse_over(&mut surface, 2).unwrap();
    drawn.click(2).unwrap();
    drawn.mouse_out(&mut surface, 2).unwrap();

    let calls = seen.borrow();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], ("over".to_string(), "north".to_string(), 2));
    assert_eq!(calls[1].0, "click");
    assert_eq!(calls[2].0, "out");
}

#[test]
fn test_hover_without_hover_colors_keeps_fill() {
    let chart = BarChart::new().x("region").y("total");
    let mut surface = chart.surface();
    let mut drawn = chart.render(&population(), &mut surface).unwrap();
    let mark = drawn.marks()[0].clone();

    drawn.mouse_over(&mut surface, 0).unwrap();
    assert_eq!(surface.element(mark.element).unwrap().fill(), mark.fill);
    assert_eq!(drawn.tooltip().state().unwrap().html, "120");
}

#[test]
fn test_custom_tooltip() {
    let chart = BarChart::new()
        .x("region")
        .group_by(Axis::X, &["men", "women"])
        .tip(|t| format!("{} in {}", t.key.unwrap_or(""), t.record.label("region")));
    let mut surface = chart.surface();
    let mut drawn = chart.render(&population(), &mut surface).unwrap();
    drawn.mouse_over(&mut surface, 1).unwrap();
    assert_eq!(drawn.tooltip().state().unwrap().html, "women in north");
}

#[test]
fn test_drawing_twice_appends() {
    let chart = BarChart::new().x("region").y("total");
    let mut surface = chart.surface();
    let first = chart.render(&population(), &mut surface).unwrap().marks().len();
    let second = chart.render(&population(), &mut surface).unwrap().marks().len();
    assert_eq!(first, second);
    assert_eq!(surface.with_class("bar").count(), first + second);
}

// ============================================================================
// Pipeline stages
// ============================================================================

#[test]
fn test_stages_in_order() {
    let chart = Spineplot::new().category("region").value("total").build().unwrap();
    let records = population();
    let loaded = chart.load(&records).unwrap();
    assert_eq!(loaded.prepared().len(), 5);
    assert_eq!(loaded.prepared().spine_total(), 505.0);

    let scaled = loaded.scale().unwrap();
    assert!(scaled.scales().x.is_linear());

    let mut surface = chart.surface();
    let drawn = scaled.draw(&mut surface);
    assert_eq!(drawn.marks().len(), 5);
    // Caller data is untouched.
    assert_eq!(records[2].get("total"), Some(&Value::from("45")));
}

#[test]
fn test_empty_after_filter() {
    let chart = BarChart::new().x("region").y("total").filter(|_| false);
    assert!(matches!(chart.load(&population()), Err(Error::EmptyData)));
}

// ============================================================================
// Settings and output
// ============================================================================

#[test]
fn test_settings_file_to_svg_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("spine.yaml");
    std::fs::write(
        &settings_path,
        r##"
category: region
value: total
fill: total
stack_by: {axis: x, keys: [men, women]}
format: ",.0f"
legend: true
width: 640
height: 400
quantiles:
  buckets: 4
  colors: ["#f7c7c5", "#e65158", "#c20216", "#750000"]
"##,
    )
    .unwrap();

    let settings = ChartSettings::load(&settings_path).unwrap();
    let chart = Spineplot::from_settings(&settings).unwrap().build().unwrap();
    let mut surface = chart.surface();
    let drawn = chart.render(&population(), &mut surface).unwrap();
    assert_eq!(drawn.marks().len(), 10);

    let out = dir.path().join("spine.svg");
    surface.write_to_file(&out).unwrap();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("width=\"640\""));
    assert!(svg.contains("id=\"spineplot-0-men\""));
}
