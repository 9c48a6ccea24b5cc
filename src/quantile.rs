//! Quantile bucketing and color classification.
//!
//! [`compute_breakpoints`] turns a numeric column into ordered bucket
//! boundaries; [`QuantileClassifier`] maps a value to the color of the bucket
//! it falls in.
//!
//! Quantiles interpolate linearly between closest ranks: for a sorted
//! sequence of length `n`, quantile `p` sits at position `(n - 1) * p`.

use crate::color::Rgba;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bucket count used when none is configured.
pub const DEFAULT_BUCKETS: usize = 5;

fn default_buckets() -> usize {
    DEFAULT_BUCKETS
}
fn default_out_of_range_color() -> Rgba {
    Rgba::rgb(238, 238, 238)
}
fn default_unclassified_color() -> Rgba {
    Rgba::UNCLASSIFIED
}

/// Quantile classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileConfig {
    /// Number of buckets.
    #[serde(default = "default_buckets")]
    pub buckets: usize,

    /// Caller-supplied breakpoints; when non-empty they are used as-is.
    #[serde(default)]
    pub predefined: Vec<f64>,

    /// Exclude values <= 0 from the quantile computation.
    #[serde(default)]
    pub ignore_zeros: bool,

    /// One color per bucket, lowest bucket first.
    #[serde(default)]
    pub colors: Vec<Rgba>,

    /// Alternate bucket colors shown while the pointer is over a mark.
    #[serde(default)]
    pub colors_on_hover: Option<Vec<Rgba>>,

    /// Color for values outside the active `[min, max]` range.
    #[serde(default = "default_out_of_range_color")]
    pub out_of_range_color: Rgba,

    /// Color for values no bucket accepts.
    #[serde(default = "default_unclassified_color")]
    pub unclassified_color: Rgba,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            buckets: default_buckets(),
            predefined: Vec::new(),
            ignore_zeros: false,
            colors: Vec::new(),
            colors_on_hover: None,
            out_of_range_color: default_out_of_range_color(),
            unclassified_color: default_unclassified_color(),
        }
    }
}

impl QuantileConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket count.
    #[must_use]
    pub fn buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    /// Use fixed breakpoints instead of computing them.
    #[must_use]
    pub fn predefined(mut self, breakpoints: &[f64]) -> Self {
        self.predefined = breakpoints.to_vec();
        self
    }

    /// Exclude non-positive values from the quantiles.
    #[must_use]
    pub fn ignore_zeros(mut self, ignore: bool) -> Self {
        self.ignore_zeros = ignore;
        self
    }

    /// Set the bucket colors.
    #[must_use]
    pub fn colors(mut self, colors: &[Rgba]) -> Self {
        self.colors = colors.to_vec();
        self
    }

    /// Set the hover colors.
    #[must_use]
    pub fn colors_on_hover(mut self, colors: &[Rgba]) -> Self {
        self.colors_on_hover = Some(colors.to_vec());
        self
    }

    /// Set the out-of-range color.
    #[must_use]
    pub fn out_of_range_color(mut self, color: Rgba) -> Self {
        self.out_of_range_color = color;
        self
    }

    /// Set the fallback color for unclassified values.
    #[must_use]
    pub fn unclassified_color(mut self, color: Rgba) -> Self {
        self.unclassified_color = color;
        self
    }

    /// Check the settings before any data is seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuantiles`] for a zero bucket count or for
    /// `ignore_zeros` with fewer than two buckets.
    pub fn validate(&self) -> Result<()> {
        if !self.predefined.is_empty() {
            return Ok(());
        }
        if self.buckets == 0 {
            return Err(Error::InvalidQuantiles("bucket count must be at least 1".to_string()));
        }
        if self.ignore_zeros && self.buckets < 2 {
            return Err(Error::InvalidQuantiles(
                "ignore_zeros needs at least 2 buckets".to_string(),
            ));
        }
        Ok(())
    }
}

/// Quantile `p` of an ascending slice, `None` when empty.
#[must_use]
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let pos = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            if lo == hi {
                Some(sorted[lo])
            } else {
                let w = pos - lo as f64;
                Some(sorted[lo] + (sorted[hi] - sorted[lo]) * w)
            }
        }
    }
}

/// Ordered bucket boundaries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakpoints(Vec<f64>);

impl Breakpoints {
    /// Wrap an already ordered list.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Boundaries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no boundaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(lower, upper)` bounds of each bucket, lowest first.
    #[must_use]
    pub fn bucket_bounds(&self) -> Vec<(f64, f64)> {
        self.0.windows(2).map(|w| (w[0], w[1])).collect()
    }
}

/// Compute bucket boundaries for `values` (any order).
///
/// Predefined breakpoints win outright. Otherwise `buckets + 1` boundaries are
/// produced, except that five buckets whose upper boundaries are all equal
/// collapse to `[q(0), q(0.2)]`.
///
/// # Errors
///
/// Returns [`Error::InvalidQuantiles`] for an invalid configuration and
/// [`Error::EmptyData`] when there are no values to bucket.
pub fn compute_breakpoints(values: &[f64], config: &QuantileConfig) -> Result<Breakpoints> {
    if !config.predefined.is_empty() {
        return Ok(Breakpoints::new(config.predefined.clone()));
    }
    config.validate()?;

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Err(Error::EmptyData);
    }
    sorted.sort_by(f64::total_cmp);

    let k = config.buckets;
    let mut breakpoints = Vec::with_capacity(k + 1);

    if config.ignore_zeros {
        let positive_start = sorted.partition_point(|&v| v <= 0.0);
        let positive = &sorted[positive_start..];
        breakpoints.push(sorted[0]);
        breakpoints.push(0.0);
        let steps = (k - 1) as f64;
        for i in 1..k {
            breakpoints.push(quantile(positive, i as f64 / steps).unwrap_or(0.0));
        }
    } else {
        breakpoints.push(sorted[0]);
        for i in 1..=k {
            breakpoints.push(quantile(&sorted, i as f64 / k as f64).unwrap_or(sorted[0]));
        }
    }

    #[allow(clippy::float_cmp)]
    let degenerate = k == 5 && breakpoints[1..=5].windows(2).all(|w| w[0] == w[1]);
    if degenerate {
        let low = sorted[0];
        let fifth = quantile(&sorted, 0.2).unwrap_or(low);
        log::debug!(
            target: "trueno_bars::quantile",
            "upper breakpoints all equal {}; collapsing to [{low}, {fifth}]",
            breakpoints[1]
        );
        breakpoints = vec![low, fifth];
    }

    Ok(Breakpoints::new(breakpoints))
}

/// Which color list a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorState {
    /// Resting color.
    #[default]
    Default,
    /// Pointer is over the mark.
    Hover,
}

/// Outcome of classifying one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Index of the bucket (0 = lowest).
    Bucket(usize),
    /// Outside the active `[min, max]` range.
    OutOfRange,
    /// No bucket accepts the value.
    Unclassified,
}

/// Maps values to bucket colors.
#[derive(Debug, Clone)]
pub struct QuantileClassifier {
    breakpoints: Breakpoints,
    range: Option<(f64, f64)>,
    colors: Vec<Rgba>,
    colors_on_hover: Option<Vec<Rgba>>,
    out_of_range_color: Rgba,
    unclassified_color: Rgba,
}

impl QuantileClassifier {
    /// Create a classifier.
    ///
    /// `range` is the explicit `[min, max]` if one was configured, else the
    /// observed extent of the classified column.
    #[must_use]
    pub fn new(breakpoints: Breakpoints, config: &QuantileConfig, range: Option<(f64, f64)>) -> Self {
        Self {
            breakpoints,
            range,
            colors: config.colors.clone(),
            colors_on_hover: config.colors_on_hover.clone(),
            out_of_range_color: config.out_of_range_color,
            unclassified_color: config.unclassified_color,
        }
    }

    /// Compute breakpoints and build the classifier in one step.
    ///
    /// # Errors
    ///
    /// See [`compute_breakpoints`].
    pub fn fit(
        values: &[f64],
        config: &QuantileConfig,
        explicit_range: Option<(f64, f64)>,
    ) -> Result<Self> {
        let breakpoints = compute_breakpoints(values, config)?;
        let observed = values.iter().copied().filter(|v| !v.is_nan()).fold(None, |acc, v| {
            match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            }
        });
        Ok(Self::new(breakpoints, config, explicit_range.or(observed)))
    }

    /// The boundaries in use.
    #[must_use]
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// The active `[min, max]` range.
    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Whether hover colors are configured.
    #[must_use]
    pub fn has_hover_colors(&self) -> bool {
        self.colors_on_hover.is_some()
    }

    /// Bucket colors, lowest first.
    #[must_use]
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Classify a value.
    #[must_use]
    pub fn classify(&self, value: f64) -> Classification {
        if value.is_nan() {
            return Classification::Unclassified;
        }
        let b = self.breakpoints.as_slice();
        match b.len() {
            0 | 1 => Classification::Unclassified,
            2 => {
                if value <= b[1] {
                    Classification::Bucket(0)
                } else {
                    Classification::Unclassified
                }
            }
            _ => {
                if let Some((lo, hi)) = self.range {
                    if value < lo || value > hi {
                        log::warn!(
                            target: "trueno_bars::quantile",
                            "value {value} outside range [{lo}, {hi}]; using out-of-range color"
                        );
                        return Classification::OutOfRange;
                    }
                }
                (1..b.len())
                    .find(|&i| value <= b[i])
                    .map_or(Classification::Unclassified, |i| Classification::Bucket(i - 1))
            }
        }
    }

    /// Resolve a classification to a color.
    #[must_use]
    pub fn resolve(&self, classification: Classification, state: ColorState) -> Rgba {
        match classification {
            Classification::OutOfRange => self.out_of_range_color,
            Classification::Unclassified => self.unclassified_color,
            Classification::Bucket(i) => {
                let palette = match state {
                    ColorState::Default => Some(&self.colors),
                    ColorState::Hover => self.colors_on_hover.as_ref(),
                };
                palette.and_then(|p| p.get(i)).copied().unwrap_or(self.unclassified_color)
            }
        }
    }

    /// Color for a cell; non-numeric cells are unclassified.
    #[must_use]
    pub fn color(&self, value: Option<f64>, state: ColorState) -> Rgba {
        let classification = value.map_or(Classification::Unclassified, |v| self.classify(v));
        self.resolve(classification, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn palette() -> Vec<Rgba> {
        ["#f7c7c5", "#e65158", "#c20216", "#750000", "#480000"]
            .iter()
            .map(|h| Rgba::from_hex(h).unwrap())
            .collect()
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [0.0, 0.0, 0.0, 5.0, 10.0, 15.0, 20.0, 100.0];
        assert_abs_diff_eq!(quantile(&sorted, 0.4).unwrap(), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(quantile(&sorted, 0.8).unwrap(), 18.0, epsilon = 1e-9);
        assert_eq!(quantile(&sorted, 1.0), Some(100.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[3.0], 0.7), Some(3.0));
    }

    #[test]
    fn test_default_five_buckets() {
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let bp = compute_breakpoints(&values, &QuantileConfig::new()).unwrap();
        assert_eq!(bp.as_slice(), &[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_mostly_zero_does_not_collapse_when_top_differs() {
        let values = [0.0, 0.0, 0.0, 5.0, 10.0, 15.0, 20.0, 100.0];
        let bp = compute_breakpoints(&values, &QuantileConfig::new().buckets(5)).unwrap();
        let expected = [0.0, 0.0, 4.0, 11.0, 18.0, 100.0];
        assert_eq!(bp.len(), expected.len());
        for (got, want) in bp.as_slice().iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_no_collapse_when_only_last_position_differs() {
        let mut values = vec![0.0; 9];
        values.push(100.0);
        let bp = compute_breakpoints(&values, &QuantileConfig::new()).unwrap();
        assert_eq!(bp.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.0, 100.0]);
    }

    #[test]
    fn test_five_bucket_collapse() {
        let values = [1.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0];
        let bp = compute_breakpoints(&values, &QuantileConfig::new()).unwrap();
        assert_eq!(bp.as_slice(), &[1.0, 7.0]);
    }

    #[test]
    fn test_collapse_only_for_five_buckets() {
        let values = [7.0; 12];
        let bp = compute_breakpoints(&values, &QuantileConfig::new().buckets(4)).unwrap();
        assert_eq!(bp.len(), 5);
        let bp = compute_breakpoints(&values, &QuantileConfig::new().buckets(5)).unwrap();
        assert_eq!(bp.len(), 2);
    }

    #[test]
    fn test_ignore_zeros_seeds_min_and_zero() {
        let values = [-3.0, 0.0, 0.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        let config = QuantileConfig::new().buckets(5).ignore_zeros(true);
        let bp = compute_breakpoints(&values, &config).unwrap();
        assert_eq!(bp.len(), 6);
        assert_eq!(bp.as_slice()[0], -3.0);
        assert_eq!(bp.as_slice()[1], 0.0);
        assert_abs_diff_eq!(bp.as_slice()[2], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bp.as_slice()[5], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ignore_zeros_all_zero_collapses() {
        let config = QuantileConfig::new().ignore_zeros(true);
        let bp = compute_breakpoints(&[0.0, 0.0, 0.0], &config).unwrap();
        assert_eq!(bp.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_predefined_wins() {
        let config = QuantileConfig::new().predefined(&[0.0, 3.0]);
        let bp = compute_breakpoints(&[], &config).unwrap();
        assert_eq!(bp.as_slice(), &[0.0, 3.0]);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(compute_breakpoints(&[1.0], &QuantileConfig::new().buckets(0)).is_err());
        let config = QuantileConfig::new().buckets(1).ignore_zeros(true);
        assert!(matches!(compute_breakpoints(&[1.0], &config), Err(Error::InvalidQuantiles(_))));
        assert!(matches!(compute_breakpoints(&[], &QuantileConfig::new()), Err(Error::EmptyData)));
    }

    #[test]
    fn test_classify_buckets() {
        let config = QuantileConfig::new().colors(&palette());
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let classifier = QuantileClassifier::fit(&values, &config, None).unwrap();

        assert_eq!(classifier.classify(0.0), Classification::Bucket(0));
        assert_eq!(classifier.classify(2.0), Classification::Bucket(0));
        assert_eq!(classifier.classify(2.5), Classification::Bucket(1));
        assert_eq!(classifier.classify(10.0), Classification::Bucket(4));
        assert_eq!(classifier.color(Some(9.0), ColorState::Default), palette()[4]);
    }

    #[test]
    fn test_out_of_range_implicit_and_explicit() {
        let config = QuantileConfig::new().colors(&palette()).out_of_range_color(Rgba::BLACK);
        let values: Vec<f64> = (0..=10).map(f64::from).collect();

        let implicit = QuantileClassifier::fit(&values, &config, None).unwrap();
        assert_eq!(implicit.classify(-1.0), Classification::OutOfRange);
        assert_eq!(implicit.color(Some(11.0), ColorState::Default), Rgba::BLACK);

        let explicit = QuantileClassifier::fit(&values, &config, Some((2.0, 8.0))).unwrap();
        assert_eq!(explicit.classify(1.0), Classification::OutOfRange);
        assert_eq!(explicit.classify(8.0), Classification::Bucket(3));
    }

    struct CaptureLog;

    static CAPTURED: std::sync::Mutex<Vec<(log::Level, String, String)>> = std::sync::Mutex::new(Vec::new());
    static CAPTURE: CaptureLog = CaptureLog;

    impl log::Log for CaptureLog {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut captured) = CAPTURED.lock() {
                captured.push((record.level(), record.target().to_string(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_out_of_range_is_logged() {
        // Fails when a logger is already installed.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);

        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let classifier = QuantileClassifier::fit(&values, &QuantileConfig::new(), None).unwrap();
        assert_eq!(classifier.classify(4321.5), Classification::OutOfRange);

        let captured = CAPTURED.lock().unwrap();
        assert!(captured.iter().any(|(level, target, message)| {
            *level == log::Level::Warn && target == "trueno_bars::quantile" && message.contains("4321.5")
        }));
    }

    #[test]
    fn test_two_breakpoint_path() {
        let config = QuantileConfig::new().predefined(&[0.0, 3.0]).colors(&palette());
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let classifier = QuantileClassifier::fit(&values, &config, None).unwrap();

        assert_eq!(classifier.classify(3.0), Classification::Bucket(0));
        assert_eq!(classifier.classify(-10.0), Classification::Bucket(0));
        assert_eq!(classifier.classify(3.5), Classification::Unclassified);
        assert_eq!(classifier.color(Some(4.0), ColorState::Default), Rgba::UNCLASSIFIED);
    }

    #[test]
    fn test_hover_palette() {
        let hover: Vec<Rgba> = palette().iter().map(|c| c.with_alpha(128)).collect();
        let config = QuantileConfig::new().colors(&palette()).colors_on_hover(&hover);
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let classifier = QuantileClassifier::fit(&values, &config, None).unwrap();

        assert!(classifier.has_hover_colors());
        assert_eq!(classifier.color(Some(1.0), ColorState::Hover), hover[0]);
        assert_eq!(classifier.color(Some(1.0), ColorState::Default), palette()[0]);
    }

    #[test]
    fn test_missing_colors_fall_back() {
        let config = QuantileConfig::new().colors(&palette()[..2]);
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let classifier = QuantileClassifier::fit(&values, &config, None).unwrap();
        assert_eq!(classifier.color(Some(9.0), ColorState::Default), Rgba::UNCLASSIFIED);
        assert_eq!(classifier.color(Some(9.0), ColorState::Hover), Rgba::UNCLASSIFIED);
        assert_eq!(classifier.color(None, ColorState::Default), Rgba::UNCLASSIFIED);
    }

    #[test]
    fn test_bucket_bounds() {
        let bp = Breakpoints::new(vec![0.0, 1.0, 5.0]);
        assert_eq!(bp.bucket_bounds(), vec![(0.0, 1.0), (1.0, 5.0)]);
    }

    #[test]
    fn test_config_yaml_defaults() {
        let config: QuantileConfig =
            serde_yaml_ng::from_str("colors: ['#f7c7c5', '#e65158']\nignore_zeros: true\n").unwrap();
        assert_eq!(config.buckets, DEFAULT_BUCKETS);
        assert!(config.ignore_zeros);
        assert_eq!(config.colors.len(), 2);
        assert_eq!(config.unclassified_color, Rgba::UNCLASSIFIED);
    }
}
