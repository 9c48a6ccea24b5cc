//! Spine Plot Example
//!
//! A stacked spine plot configured from YAML settings.
//!
//! Run with: `cargo run --example spineplot`

use trueno_bars::prelude::*;

const SETTINGS: &str = r##"
category: region
value: total
id: code
stack_by: {axis: x, keys: [men, women]}
format: ",.0f"
legend: true
width: 800
height: 500
colors: ["#1f77b4", "#ff7f0e"]
"##;

const DATA: &str = r"
- {code: AN, region: Andalucia, total: 8472407, men: 4187968, women: 4284439, womencoefficient: 0.506}
- {code: MD, region: Madrid, total: 6751251, men: 3235587, women: 3515664, womencoefficient: 0.521}
- {code: CT, region: Cataluna, total: 7763362, men: 3828428, women: 3934934, womencoefficient: 0.507}
- {code: GA, region: Galicia, total: 2695645, men: 1302628, women: 1393017, womencoefficient: 0.517}
- {code: CN, region: Canarias, total: 2172944, men: 1075838, women: 1097106, womencoefficient: 0.505}
";

fn main() -> Result<()> {
    println!("Spine Plot Example");
    println!("==================\n");

    let settings = ChartSettings::parse(SETTINGS)?;
    let records: Vec<Record> = serde_yaml_ng::from_str(DATA)
        .map_err(|e| Error::ConfigParse { line: 0, message: e.to_string() })?;

    let chart = Spineplot::from_settings(&settings)?.build()?;
    let mut surface = chart.surface();
    let drawn = chart.render(&records, &mut surface)?;

    println!("Grand total: {}", drawn.prepared().spine_total());
    for mark in drawn.marks() {
        println!(
            "  row {} {:>6}: x={:.1} y={:.1} w={:.1} h={:.1}",
            mark.row,
            mark.key.as_deref().unwrap_or("-"),
            mark.bounds.x,
            mark.bounds.y,
            mark.bounds.width,
            mark.bounds.height
        );
    }

    surface.write_to_file("spineplot.svg")?;
    println!("\n  Saved: spineplot.svg");
    Ok(())
}
