//! Scale functions for data-to-visual mappings.
//!
//! Linear scales map numbers to pixels, band scales map categories to equal
//! slots, and ordinal scales map categories to colors.

use crate::color::Rgba;
use crate::data::{self, Record, Value};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if domain_min equals domain_max or either bound is not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain("Domain bounds must be finite".to_string()));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Create a scale from a data extent, widening an empty extent by one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not finite.
    pub fn from_extent(extent: (f64, f64), range: (f64, f64)) -> Result<Self> {
        let (lo, hi) = extent;
        if (hi - lo).abs() < f64::EPSILON {
            Self::new((lo, lo + 1.0), range)
        } else {
            Self::new((lo, hi), range)
        }
    }

    /// Get the domain extent.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Band scale: one equal-width slot per category.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range_start: f64,
    range_end: f64,
    step: f64,
    bandwidth: f64,
    offset: f64,
}

impl BandScale {
    /// Default inner/outer padding, as a fraction of the step.
    pub const DEFAULT_PADDING: f64 = 0.1;

    /// Create a band scale with default padding.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty.
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Result<Self> {
        Self::with_padding(domain, range, Self::DEFAULT_PADDING, Self::DEFAULT_PADDING)
    }

    /// Create a band scale with explicit padding (each in `[0, 1)`).
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or padding is out of bounds.
    pub fn with_padding(
        domain: Vec<String>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::ScaleDomain("Band scale requires at least one category".to_string()));
        }
        if !(0.0..1.0).contains(&padding_inner) || padding_outer < 0.0 {
            return Err(Error::ScaleDomain("Band padding must be in [0, 1)".to_string()));
        }

        let n = domain.len() as f64;
        let (lo, hi) = (range.0.min(range.1), range.0.max(range.1));
        let step = (hi - lo) / (n - padding_inner + 2.0 * padding_outer).max(1.0);
        let offset = lo + ((hi - lo) - step * (n - padding_inner)) / 2.0;
        let bandwidth = step * (1.0 - padding_inner);

        Ok(Self {
            domain,
            range_start: range.0,
            range_end: range.1,
            step,
            bandwidth,
            offset,
        })
    }

    /// Width of each band.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between the starts of adjacent bands.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The categories, in slot order.
    #[must_use]
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Start of the band for `key`, `None` for unknown categories.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|d| d == key)?;
        // A reversed range fills slots from the far end.
        let slot = if self.range_start > self.range_end {
            self.domain.len() - 1 - index
        } else {
            index
        };
        Some(self.offset + self.step * slot as f64)
    }
}

impl Scale<&str, f64> for BandScale {
    fn scale(&self, value: &str) -> f64 {
        self.position(value).unwrap_or(f64::NAN)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }
}

/// Ordinal color scale; unseen keys extend the domain in first-seen order and
/// the range is cycled.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    domain: RefCell<Vec<String>>,
    range: Vec<Rgba>,
}

impl OrdinalScale {
    /// Create an ordinal scale over `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty.
    pub fn new(range: &[Rgba]) -> Result<Self> {
        if range.is_empty() {
            return Err(Error::ScaleDomain("Ordinal scale requires at least one color".to_string()));
        }
        Ok(Self { domain: RefCell::new(Vec::new()), range: range.to_vec() })
    }

    /// Pre-seed the domain so colors are assigned in this order.
    #[must_use]
    pub fn with_domain(self, keys: &[String]) -> Self {
        for key in keys {
            let _ = self.scale(key.as_str());
        }
        self
    }

    /// Keys seen so far.
    #[must_use]
    pub fn domain(&self) -> Vec<String> {
        self.domain.borrow().clone()
    }

    /// The colors cycled through.
    #[must_use]
    pub fn colors(&self) -> &[Rgba] {
        &self.range
    }
}

impl Scale<&str, Rgba> for OrdinalScale {
    fn scale(&self, value: &str) -> Rgba {
        let mut domain = self.domain.borrow_mut();
        let index = match domain.iter().position(|d| d == value) {
            Some(i) => i,
            None => {
                domain.push(value.to_string());
                domain.len() - 1
            }
        };
        self.range[index % self.range.len()]
    }

    fn range(&self) -> (Rgba, Rgba) {
        (self.range[0], self.range[self.range.len() - 1])
    }
}

/// Positional scale kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// Continuous numeric axis.
    #[default]
    Linear,
    /// Categorical axis.
    Band,
}

/// A positional scale of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionScale {
    /// Numeric.
    Linear(LinearScale),
    /// Categorical.
    Band(BandScale),
}

impl PositionScale {
    /// Pixel position of a cell; `None` when the cell does not fit the scale.
    #[must_use]
    pub fn position(&self, value: &Value) -> Option<f64> {
        match self {
            PositionScale::Linear(s) => value.as_f64().map(|v| s.scale(v)),
            PositionScale::Band(s) => s.position(&value.label()),
        }
    }

    /// Pixel position of a number (linear scales only).
    #[must_use]
    pub fn at(&self, value: f64) -> Option<f64> {
        match self {
            PositionScale::Linear(s) => Some(s.scale(value)),
            PositionScale::Band(_) => None,
        }
    }

    /// Band width, `None` for linear scales.
    #[must_use]
    pub fn bandwidth(&self) -> Option<f64> {
        match self {
            PositionScale::Linear(_) => None,
            PositionScale::Band(s) => Some(s.bandwidth()),
        }
    }

    /// Whether this is a linear scale.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        matches!(self, PositionScale::Linear(_))
    }
}

/// Request for [`generate_scale`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSpec {
    /// Column the domain is read from.
    pub column: String,
    /// Scale kind.
    pub kind: ScaleKind,
    /// Output pixel range.
    pub range: (f64, f64),
    /// Extend a linear domain to include zero.
    pub min_zero: bool,
}

impl ScaleSpec {
    /// A linear scale request.
    #[must_use]
    pub fn linear(column: &str, range: (f64, f64)) -> Self {
        Self { column: column.to_string(), kind: ScaleKind::Linear, range, min_zero: true }
    }

    /// A band scale request.
    #[must_use]
    pub fn band(column: &str, range: (f64, f64)) -> Self {
        Self { column: column.to_string(), kind: ScaleKind::Band, range, min_zero: false }
    }
}

/// Build a positional scale over one column of `records`.
///
/// # Errors
///
/// Returns [`Error::ScaleDomain`] when the column has no usable values.
pub fn generate_scale(records: &[Record], spec: &ScaleSpec) -> Result<PositionScale> {
    match spec.kind {
        ScaleKind::Linear => {
            let (lo, hi) = data::extent(records, &spec.column).ok_or_else(|| {
                Error::ScaleDomain(format!("column '{}' has no numeric values", spec.column))
            })?;
            linear_over((lo, hi), spec.range, spec.min_zero).map(PositionScale::Linear)
        }
        ScaleKind::Band => {
            let domain = data::distinct_labels(records, &spec.column);
            BandScale::new(domain, spec.range).map(PositionScale::Band)
        }
    }
}

/// Linear scale over an extent, optionally stretched to include zero.
///
/// # Errors
///
/// Returns an error if a bound is not finite.
pub fn linear_over(extent: (f64, f64), range: (f64, f64), min_zero: bool) -> Result<LinearScale> {
    let (lo, hi) = if min_zero { (extent.0.min(0.0), extent.1.max(0.0)) } else { extent };
    LinearScale::from_extent((lo, hi), range)
}
