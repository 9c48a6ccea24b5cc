//! Tooltips shown while the pointer is over a mark.

use crate::config::{Axis, ChartConfig, LayoutMode};
use crate::data::Record;
use std::rc::Rc;

/// Vertical gap between a tooltip and the top of its mark.
pub const TIP_OFFSET: f64 = 10.0;

/// What the pointer is over.
#[derive(Debug, Clone, Copy)]
pub struct TipTarget<'a> {
    /// The record behind the mark.
    pub record: &'a Record,
    /// Row index of the record in the prepared data.
    pub row: usize,
    /// Group or stack key of the mark, if any.
    pub key: Option<&'a str>,
    /// Value of the sub-bar or segment, if any.
    pub value: Option<f64>,
    /// Stack total, stacked marks only.
    pub total: Option<f64>,
}

/// Custom tooltip content; the returned string is used as HTML.
pub type TipRenderer = Rc<dyn Fn(&TipTarget<'_>) -> String>;

/// Escape text for inclusion in HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Tooltip content for `target`: the configured renderer, or the default for
/// the chart's layout.
#[must_use]
pub fn tip_content(config: &ChartConfig, target: &TipTarget<'_>) -> String {
    if let Some(render) = &config.tip {
        return render(target);
    }
    let fmt = |v: f64| escape_html(&config.formatter.format(v));
    let label = |column: &Option<String>| {
        column.as_deref().map(|c| escape_html(&target.record.label(c))).unwrap_or_default()
    };

    match (&config.layout, target.key, target.value) {
        (LayoutMode::Spine { stack: None, .. }, _, _) => {
            let value = config.value.as_deref().and_then(|c| target.record.number(c));
            format!(
                "<div><span>{}</span></br><span>{}</span></div>",
                label(&config.category),
                value.map(fmt).unwrap_or_default()
            )
        }
        (LayoutMode::Spine { .. }, Some(key), Some(value)) => format!(
            "<div><span>{}</span></br><span>{}: {}</span></br><span>{}</span></div>",
            label(&config.category),
            escape_html(key),
            fmt(value),
            target.total.map(fmt).unwrap_or_default()
        ),
        (LayoutMode::StackBy { .. }, Some(key), Some(value)) => {
            let category = category_label(config, target);
            format!(
                "<div><span>{}: {}</span></br><span>{}</span></br><span>total: {}</span></div>",
                escape_html(key),
                fmt(value),
                category,
                target.total.map(fmt).unwrap_or_default()
            )
        }
        (LayoutMode::GroupBy { .. }, Some(key), Some(value)) => {
            format!("{}: {}", escape_html(key), fmt(value))
        }
        _ => {
            let value = [&config.y, &config.x]
                .into_iter()
                .flatten()
                .find_map(|c| target.record.number(c));
            value.map(fmt).unwrap_or_else(|| label(&config.y))
        }
    }
}

fn category_label(config: &ChartConfig, target: &TipTarget<'_>) -> String {
    let column = match &config.layout {
        LayoutMode::StackBy { axis: Axis::Y, .. }
        | LayoutMode::GroupBy { axis: Axis::Y, .. } => &config.y,
        _ => &config.x,
    };
    column.as_deref().map(|c| escape_html(&target.record.label(c))).unwrap_or_default()
}

/// A shown tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TipState {
    /// HTML content.
    pub html: String,
    /// Anchor point: top-center of the mark, raised by [`TIP_OFFSET`].
    pub anchor: (f64, f64),
    /// Mark the tooltip belongs to.
    pub mark: usize,
}

/// Tooltip attached to a drawn chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    class: String,
    state: Option<TipState>,
}

impl Tooltip {
    /// Hidden tooltip with a CSS class.
    #[must_use]
    pub fn new(class: &str) -> Self {
        Self { class: class.to_string(), state: None }
    }

    /// CSS class the host styles the tooltip with.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Show `html` above the mark.
    pub fn show(&mut self, html: String, anchor: (f64, f64), mark: usize) {
        self.state = Some(TipState { html, anchor: (anchor.0, anchor.1 - TIP_OFFSET), mark });
    }

    /// Hide the tooltip.
    pub fn hide(&mut self) {
        self.state = None;
    }

    /// Current state, `None` while hidden.
    #[must_use]
    pub fn state(&self) -> Option<&TipState> {
        self.state.as_ref()
    }

    /// Whether the tooltip is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartKind;

    fn target(record: &Record) -> TipTarget<'_> {
        TipTarget { record, row: 0, key: None, value: None, total: None }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_spine_default_content() {
        let mut config = ChartConfig::new(ChartKind::Spineplot);
        config.category = Some("region".to_string());
        config.value = Some("total".to_string());
        let record = Record::new().with("region", "<North>").with("total", 1234.56);
        assert_eq!(
            tip_content(&config, &target(&record)),
            "<div><span>&lt;North&gt;</span></br><span>1,234.6</span></div>"
        );
    }

    #[test]
    fn test_bars_default_content() {
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.x = Some("region".to_string());
        config.y = Some("total".to_string());
        let record = Record::new().with("region", "a").with("total", 1500.0);
        assert_eq!(tip_content(&config, &target(&record)), "1,500");
    }

    #[test]
    fn test_stacked_content() {
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.x = Some("region".to_string());
        config.request_stack_by(Axis::X, vec!["men".to_string()]);
        let record = Record::new().with("region", "east");
        let tip = TipTarget { key: Some("men"), value: Some(4.0), total: Some(10.0), ..target(&record) };
        let html = tip_content(&config, &tip);
        assert!(html.contains("men: 4"));
        assert!(html.contains("east"));
        assert!(html.contains("total: 10"));
    }

    #[test]
    fn test_custom_renderer_wins() {
        let mut config = ChartConfig::new(ChartKind::Bars);
        config.tip = Some(Rc::new(|t: &TipTarget<'_>| format!("row {}", t.row)));
        let record = Record::new();
        assert_eq!(tip_content(&config, &target(&record)), "row 0");
    }

    #[test]
    fn test_show_hide() {
        let mut tip = Tooltip::new("tip-bars");
        assert!(!tip.is_visible());
        tip.show("x".to_string(), (50.0, 30.0), 2);
        let state = tip.state().unwrap();
        assert_eq!(state.anchor, (50.0, 20.0));
        assert_eq!(state.mark, 2);
        tip.hide();
        assert!(tip.state().is_none());
        assert_eq!(tip.class(), "tip-bars");
    }
}
