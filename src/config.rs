//! Chart configuration.
//!
//! [`ChartConfig`] is the validated, flat configuration every chart builder
//! produces. [`ChartSettings`] is its declarative twin, loaded from YAML.
//!
//! Exactly one [`LayoutMode`] is resolved per chart: builders record the
//! requested layout explicitly and [`ChartConfig::validate`] rejects
//! combinations that cannot be drawn.

use crate::color::Rgba;
use crate::data::Record;
use crate::error::{Error, Result};
use crate::format::Formatter;
use crate::quantile::QuantileConfig;
use crate::scale::{OrdinalScale, ScaleKind};
use crate::tooltip::TipRenderer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Spine plot orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Columns side by side along x; stacks grow along y.
    #[default]
    Horizontal,
    /// Columns along y; stacks grow along x.
    Vertical,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// One sort directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column to sort on.
    pub column: String,
    /// Direction.
    #[serde(default)]
    pub order: Order,
}

/// The layout a chart draws with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// One bar per record.
    #[default]
    Plain,
    /// Side-by-side sub-bars per category, one per key column.
    GroupBy {
        /// Axis holding the categories.
        axis: Axis,
        /// Value columns, one sub-bar each.
        keys: Vec<String>,
    },
    /// Stacked segments per category, one per key column, in key order.
    StackBy {
        /// Axis holding the categories.
        axis: Axis,
        /// Value columns, bottom segment first.
        keys: Vec<String>,
    },
    /// Variable-width columns proportional to `value`, optionally split into
    /// proportional stacks.
    Spine {
        /// Direction columns are laid out in.
        orientation: Orientation,
        /// Stack columns, when the spine is stacked.
        stack: Option<Vec<String>>,
    },
}

impl LayoutMode {
    /// Short name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LayoutMode::Plain => "plain",
            LayoutMode::GroupBy { axis: Axis::X, .. } => "group-by-x",
            LayoutMode::GroupBy { axis: Axis::Y, .. } => "group-by-y",
            LayoutMode::StackBy { axis: Axis::X, .. } => "stack-by-x",
            LayoutMode::StackBy { axis: Axis::Y, .. } => "stack-by-y",
            LayoutMode::Spine { .. } => "spineplot",
        }
    }

    /// Group or stack columns, empty for plain layouts.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        match self {
            LayoutMode::GroupBy { keys, .. } | LayoutMode::StackBy { keys, .. } => keys,
            LayoutMode::Spine { stack: Some(keys), .. } => keys,
            _ => &[],
        }
    }
}

/// Which component a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// [`crate::charts::BarChart`].
    Bars,
    /// [`crate::charts::Spineplot`].
    Spineplot,
}

impl ChartKind {
    /// Component name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Bars => "bars",
            ChartKind::Spineplot => "spineplot",
        }
    }
}

/// Space reserved around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Top.
    pub top: f64,
    /// Right.
    pub right: f64,
    /// Bottom.
    pub bottom: f64,
    /// Left.
    pub left: f64,
}

impl Margin {
    /// The same margin on every side.
    #[must_use]
    pub const fn uniform(m: f64) -> Self {
        Self { top: m, right: m, bottom: m, left: m }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(40.0)
    }
}

/// Outer size of the drawing and the plot area inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Full width.
    pub width: u32,
    /// Full height.
    pub height: u32,
    /// Margins.
    pub margin: Margin,
}

impl Default for Frame {
    fn default() -> Self {
        Self { width: 800, height: 600, margin: Margin::default() }
    }
}

impl Frame {
    /// Width of the plot area.
    #[must_use]
    pub fn inner_width(&self) -> f64 {
        (f64::from(self.width) - self.margin.left - self.margin.right).max(0.0)
    }

    /// Height of the plot area.
    #[must_use]
    pub fn inner_height(&self) -> f64 {
        (f64::from(self.height) - self.margin.top - self.margin.bottom).max(0.0)
    }
}

/// Pointer hook, called with the record under the pointer and its row index.
pub type Hook = Rc<dyn Fn(&Record, usize)>;

/// Record filter applied before anything else.
pub type Filter = Rc<dyn Fn(&Record) -> bool>;

/// Optional pointer hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Pointer entered a mark.
    pub on_mouse_over: Option<Hook>,
    /// Pointer left a mark.
    pub on_mouse_out: Option<Hook>,
    /// Mark clicked.
    pub on_click: Option<Hook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_mouse_over", &self.on_mouse_over.is_some())
            .field("on_mouse_out", &self.on_mouse_out.is_some())
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

/// Validated chart configuration.
#[derive(Clone)]
pub struct ChartConfig {
    /// Component the configuration drives.
    pub kind: ChartKind,
    /// Resolved layout.
    pub layout: LayoutMode,
    /// Column on the x axis (bars).
    pub x: Option<String>,
    /// Column on the y axis (bars).
    pub y: Option<String>,
    /// Scale kind of the x column in plain layouts.
    pub x_scale: ScaleKind,
    /// Scale kind of the y column in plain layouts.
    pub y_scale: ScaleKind,
    /// Column driving the fill (also the column quantiles are computed on).
    pub color: Option<String>,
    /// Category column (spine plot).
    pub category: Option<String>,
    /// Value column (spine plot).
    pub value: Option<String>,
    /// Column used to build mark ids (spine plot).
    pub id: Option<String>,
    /// Sort directives, primary key first.
    pub sort_by: Vec<SortKey>,
    /// Number formatter.
    pub formatter: Formatter,
    /// Custom tooltip content.
    pub tip: Option<TipRenderer>,
    /// Draw a legend.
    pub legend: bool,
    /// Record filter.
    pub filter: Option<Filter>,
    /// Pointer hooks.
    pub hooks: Hooks,
    /// Quantile classification; disables the ordinal color scale.
    pub quantiles: Option<QuantileConfig>,
    /// Explicit `[min, max]` for out-of-range detection.
    pub range: Option<(f64, f64)>,
    /// Ordinal color range.
    pub colors: Option<Vec<Rgba>>,
    /// Preconfigured ordinal scale; wins over `colors`.
    pub color_scale: Option<OrdinalScale>,
    /// Drawing size.
    pub frame: Frame,
    layout_conflict: Option<(&'static str, &'static str)>,
    rejected_format: Option<String>,
}

impl fmt::Debug for ChartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartConfig")
            .field("kind", &self.kind)
            .field("layout", &self.layout)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("color", &self.color)
            .field("category", &self.category)
            .field("value", &self.value)
            .field("sort_by", &self.sort_by)
            .field("formatter", &self.formatter)
            .field("tip", &self.tip.is_some())
            .field("legend", &self.legend)
            .field("filter", &self.filter.is_some())
            .field("hooks", &self.hooks)
            .field("quantiles", &self.quantiles)
            .field("range", &self.range)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl ChartConfig {
    /// Empty configuration for a component.
    #[must_use]
    pub fn new(kind: ChartKind) -> Self {
        let (layout, formatter) = match kind {
            ChartKind::Bars => (LayoutMode::Plain, Formatter::Default),
            ChartKind::Spineplot => (
                LayoutMode::Spine { orientation: Orientation::Horizontal, stack: None },
                Formatter::Decimals(1),
            ),
        };
        Self {
            kind,
            layout,
            x: None,
            y: None,
            x_scale: ScaleKind::Band,
            y_scale: ScaleKind::Linear,
            color: None,
            category: None,
            value: None,
            id: None,
            sort_by: Vec::new(),
            formatter,
            tip: None,
            legend: false,
            filter: None,
            hooks: Hooks::default(),
            quantiles: None,
            range: None,
            colors: None,
            color_scale: None,
            frame: Frame::default(),
            layout_conflict: None,
            rejected_format: None,
        }
    }

    /// Use a d3-style format specifier; an unsupported one is reported by
    /// [`ChartConfig::validate`].
    pub fn set_format(&mut self, spec: &str) {
        match Formatter::from_spec(spec) {
            Ok(formatter) => {
                self.formatter = formatter;
                self.rejected_format = None;
            }
            Err(_) => self.rejected_format = Some(spec.to_string()),
        }
    }

    /// Request a group-by layout.
    pub fn request_group_by(&mut self, axis: Axis, keys: Vec<String>) {
        self.request_layout(LayoutMode::GroupBy { axis, keys });
    }

    /// Request a stack-by layout. On a spine plot this stacks the columns and
    /// the axis picks the orientation.
    pub fn request_stack_by(&mut self, axis: Axis, keys: Vec<String>) {
        match (&self.kind, &self.layout) {
            (ChartKind::Spineplot, LayoutMode::Spine { .. }) => {
                let orientation = match axis {
                    Axis::X => Orientation::Horizontal,
                    Axis::Y => Orientation::Vertical,
                };
                self.layout = LayoutMode::Spine { orientation, stack: Some(keys) };
            }
            _ => self.request_layout(LayoutMode::StackBy { axis, keys }),
        }
    }

    fn request_layout(&mut self, requested: LayoutMode) {
        let current = self.layout.name();
        let conflicts = match (&self.layout, &requested) {
            (LayoutMode::GroupBy { .. }, LayoutMode::StackBy { .. })
            | (LayoutMode::StackBy { .. }, LayoutMode::GroupBy { .. }) => true,
            (LayoutMode::Spine { .. }, _) => {
                self.layout_conflict.get_or_insert(("spineplot", requested.name()));
                return;
            }
            _ => false,
        };
        if conflicts {
            self.layout_conflict.get_or_insert((current, requested.name()));
        }
        self.layout = requested;
    }

    /// Check that every column the layout needs is present and that the
    /// layout requests are compatible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingLayout`], [`Error::UnsupportedLayout`],
    /// [`Error::MissingConfig`], [`Error::InvalidFormat`] or
    /// [`Error::InvalidQuantiles`].
    pub fn validate(&self) -> Result<()> {
        if let Some(spec) = &self.rejected_format {
            return Err(Error::InvalidFormat(spec.clone()));
        }
        if let Some((first, second)) = self.layout_conflict {
            if first == "spineplot" {
                return Err(Error::UnsupportedLayout { chart: self.kind.name(), layout: second });
            }
            return Err(Error::ConflictingLayout {
                first: family(first),
                second: family(second),
            });
        }

        match &self.layout {
            LayoutMode::Plain => {
                require(&self.x, "x")?;
                require(&self.y, "y")?;
            }
            LayoutMode::GroupBy { axis, keys } | LayoutMode::StackBy { axis, keys } => {
                match axis {
                    Axis::X => require(&self.x, axis.name())?,
                    Axis::Y => require(&self.y, axis.name())?,
                }
                if keys.is_empty() {
                    return Err(Error::MissingConfig("group/stack key"));
                }
            }
            LayoutMode::Spine { stack, .. } => {
                require(&self.category, "category")?;
                require(&self.value, "value")?;
                if stack.as_ref().is_some_and(Vec::is_empty) {
                    return Err(Error::MissingConfig("stack key"));
                }
            }
        }

        if let Some((min, max)) = self.range {
            if min.is_nan() || max.is_nan() || min > max {
                return Err(Error::InvalidQuantiles(format!("range [{min}, {max}] has min above max")));
            }
        }

        if let Some(quantiles) = &self.quantiles {
            if self.color.is_none() && self.layout.keys().is_empty() {
                return Err(Error::MissingConfig("color"));
            }
            quantiles.validate()?;
        }
        Ok(())
    }

    /// Column the quantile classifier reads, if any.
    #[must_use]
    pub fn color_column(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

fn family(name: &'static str) -> &'static str {
    if name.starts_with("group-by") {
        "group-by"
    } else if name.starts_with("stack-by") {
        "stack-by"
    } else {
        name
    }
}

fn require(column: &Option<String>, role: &'static str) -> Result<()> {
    match column {
        Some(c) if !c.is_empty() => Ok(()),
        _ => Err(Error::MissingConfig(role)),
    }
}

/// Group or stack directive in [`ChartSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysSettings {
    /// Axis the categories sit on.
    pub axis: Axis,
    /// Value columns.
    pub keys: Vec<String>,
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_linear() -> ScaleKind {
    ScaleKind::Linear
}
fn default_band() -> ScaleKind {
    ScaleKind::Band
}

/// Declarative chart settings, typically read from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
    /// x column.
    #[serde(default)]
    pub x: Option<String>,
    /// y column.
    #[serde(default)]
    pub y: Option<String>,
    /// x scale kind.
    #[serde(default = "default_band")]
    pub x_scale: ScaleKind,
    /// y scale kind.
    #[serde(default = "default_linear")]
    pub y_scale: ScaleKind,
    /// Color / fill column.
    #[serde(default, alias = "fill")]
    pub color: Option<String>,
    /// Category column.
    #[serde(default)]
    pub category: Option<String>,
    /// Value column.
    #[serde(default)]
    pub value: Option<String>,
    /// Id column.
    #[serde(default)]
    pub id: Option<String>,
    /// Spine orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// Group-by directive.
    #[serde(default)]
    pub group_by: Option<KeysSettings>,
    /// Stack-by directive.
    #[serde(default)]
    pub stack_by: Option<KeysSettings>,
    /// Sort directives.
    #[serde(default)]
    pub sort_by: Vec<SortKey>,
    /// d3-style format specifier.
    #[serde(default)]
    pub format: Option<String>,
    /// Ordinal colors.
    #[serde(default)]
    pub colors: Option<Vec<Rgba>>,
    /// Quantile classification.
    #[serde(default)]
    pub quantiles: Option<QuantileConfig>,
    /// Explicit `[min, max]`.
    #[serde(default)]
    pub range: Option<(f64, f64)>,
    /// Draw a legend.
    #[serde(default)]
    pub legend: bool,
    /// Full width.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Full height.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Margins.
    #[serde(default)]
    pub margin: Margin,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            x_scale: default_band(),
            y_scale: default_linear(),
            color: None,
            category: None,
            value: None,
            id: None,
            orientation: Orientation::default(),
            group_by: None,
            stack_by: None,
            sort_by: Vec::new(),
            format: None,
            colors: None,
            quantiles: None,
            range: None,
            legend: false,
            width: default_width(),
            height: default_height(),
            margin: Margin::default(),
        }
    }
}

impl ChartSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Apply the settings to a fresh configuration for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the format specifier is not supported.
    pub fn to_config(&self, kind: ChartKind) -> Result<ChartConfig> {
        let mut config = ChartConfig::new(kind);
        config.x.clone_from(&self.x);
        config.y.clone_from(&self.y);
        config.x_scale = self.x_scale;
        config.y_scale = self.y_scale;
        config.color.clone_from(&self.color);
        config.category.clone_from(&self.category);
        config.value.clone_from(&self.value);
        config.id.clone_from(&self.id);
        config.sort_by.clone_from(&self.sort_by);
        config.colors.clone_from(&self.colors);
        config.quantiles.clone_from(&self.quantiles);
        config.range = self.range;
        config.legend = self.legend;
        config.frame = Frame { width: self.width, height: self.height, margin: self.margin };

        if let Some(spec) = &self.format {
            config.formatter = Formatter::from_spec(spec)?;
        }
        if let LayoutMode::Spine { stack, .. } = &config.layout {
            config.layout = LayoutMode::Spine { orientation: self.orientation, stack: stack.clone() };
        }
        if let Some(group) = &self.group_by {
            config.request_group_by(group.axis, group.keys.clone());
        }
        if let Some(stack) = &self.stack_by {
            match kind {
                // A spine plot's stacking direction comes from its orientation.
                ChartKind::Spineplot => {
                    let axis = match self.orientation {
                        Orientation::Horizontal => Axis::X,
                        Orientation::Vertical => Axis::Y,
                    };
                    config.request_stack_by(axis, stack.keys.clone());
                }
                ChartKind::Bars => config.request_stack_by(stack.axis, stack.keys.clone()),
            }
        }
        Ok(config)
    }
}
