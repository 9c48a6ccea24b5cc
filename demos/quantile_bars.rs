//! Quantile Bars Example
//!
//! Bars colored by quantile bucket, with hover colors and a legend.
//!
//! Run with: `cargo run --example quantile_bars`

use trueno_bars::prelude::*;

fn main() -> Result<()> {
    println!("Quantile Bars Example");
    println!("=====================\n");

    let records: Vec<Record> = [
        ("Andalucia", 8_472_407.0),
        ("Aragon", 1_326_261.0),
        ("Asturias", 1_011_792.0),
        ("Baleares", 1_173_008.0),
        ("Canarias", 2_172_944.0),
        ("Cantabria", 584_507.0),
        ("Castilla y Leon", 2_383_139.0),
        ("Cataluna", 7_763_362.0),
        ("Galicia", 2_695_645.0),
        ("Madrid", 6_751_251.0),
    ]
    .iter()
    .map(|(region, total)| Record::new().with("region", *region).with("total", *total))
    .collect();

    let palette: Vec<Rgba> = ["#f7c7c5", "#e65158", "#c20216", "#750000", "#480000"]
        .iter()
        .map(|h| Rgba::from_hex(h))
        .collect::<Result<_>>()?;
    let hover: Vec<Rgba> = palette.iter().map(|c| c.with_alpha(200)).collect();

    let chart = BarChart::new()
        .x("region")
        .y("total")
        .color("total")
        .sort_by("total", Order::Desc)
        .format(",.0f")
        .quantiles(QuantileConfig::new().colors(&palette).colors_on_hover(&hover))
        .legend(true)
        .on_click(|record, row| println!("  clicked {} (row {row})", record.label("region")))
        .dimensions(900, 500)
        .build()?;

    let mut surface = chart.surface();
    let mut drawn = chart.render(&records, &mut surface)?;

    if let Some(classifier) = drawn.prepared().classifier() {
        println!("Breakpoints: {:?}", classifier.breakpoints().as_slice());
    }
    println!("Marks drawn: {}\n", drawn.marks().len());

    drawn.mouse_over(&mut surface, 0)?;
    if let Some(tip) = drawn.tooltip().state() {
        println!("Tooltip over first bar: {}", tip.html);
    }
    drawn.click(0)?;
    drawn.mouse_out(&mut surface, 0)?;

    surface.write_to_file("quantile_bars.svg")?;
    println!("\n  Saved: quantile_bars.svg");
    Ok(())
}
