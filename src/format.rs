//! Number formatting for tooltips, labels and legends.
//!
//! Supports the subset of d3-format specifiers the charts use:
//! `[,][.precision][f|d|%|e]`.

use crate::error::{Error, Result};
use std::fmt;
use std::rc::Rc;

/// Presentation type of a [`NumberFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatKind {
    /// Shortest representation (no type character).
    #[default]
    General,
    /// Fixed point (`f`).
    Fixed,
    /// Rounded integer (`d`).
    Integer,
    /// Multiply by 100, fixed point, append `%`.
    Percent,
    /// Exponent notation (`e`).
    Exponent,
}

/// A parsed format specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberFormat {
    grouping: bool,
    precision: Option<usize>,
    kind: FormatKind,
}

impl NumberFormat {
    /// Fixed-point format with thousands separators.
    #[must_use]
    pub const fn grouped_fixed(precision: usize) -> Self {
        Self { grouping: true, precision: Some(precision), kind: FormatKind::Fixed }
    }

    /// Parse a specifier such as `",.2f"`, `".1%"` or `"d"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for unsupported specifiers.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || Error::InvalidFormat(spec.to_string());
        let mut rest = spec;
        let mut format = Self::default();

        if let Some(stripped) = rest.strip_prefix(',') {
            format.grouping = true;
            rest = stripped;
        }

        if let Some(stripped) = rest.strip_prefix('.') {
            let digits: String = stripped.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return Err(invalid());
            }
            format.precision = Some(digits.parse().map_err(|_| invalid())?);
            rest = &stripped[digits.len()..];
        }

        format.kind = match rest {
            "" => FormatKind::General,
            "f" => FormatKind::Fixed,
            "d" => FormatKind::Integer,
            "%" => FormatKind::Percent,
            "e" => FormatKind::Exponent,
            _ => return Err(invalid()),
        };
        Ok(format)
    }

    /// Format a number.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let precision = self.precision.unwrap_or(6);
        let body = match self.kind {
            FormatKind::General => match self.precision {
                Some(p) => trim_fraction(&format!("{value:.p$}")),
                None => format!("{value}"),
            },
            FormatKind::Fixed => format!("{value:.precision$}"),
            FormatKind::Integer => format!("{:.0}", value.round()),
            FormatKind::Percent => format!("{:.precision$}", value * 100.0),
            FormatKind::Exponent => {
                let raw = format!("{value:.precision$e}");
                match raw.split_once('e') {
                    Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
                    _ => raw,
                }
            }
        };
        let body = if self.grouping && self.kind != FormatKind::Exponent {
            group_thousands(&body)
        } else {
            body
        };
        if self.kind == FormatKind::Percent {
            format!("{body}%")
        } else {
            body
        }
    }
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Insert `,` between groups of three integer digits.
fn group_thousands(s: &str) -> String {
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{frac_part}")
}

/// Format with thousands separators and `decimals` fraction digits;
/// whole numbers are printed without a fraction.
#[must_use]
pub fn format_with_decimals(value: f64, decimals: usize) -> String {
    if value.fract() == 0.0 {
        NumberFormat::grouped_fixed(0).format(value)
    } else {
        NumberFormat::grouped_fixed(decimals).format(value)
    }
}

/// How a chart turns numbers into text.
#[derive(Clone, Default)]
pub enum Formatter {
    /// Whole numbers as `,.0f`, values in `(0, 1)` as `,.2f`, everything else `,.1f`.
    #[default]
    Default,
    /// [`format_with_decimals`] with a fixed number of decimals.
    Decimals(usize),
    /// A parsed d3-style specifier.
    Spec(NumberFormat),
    /// Caller-provided closure.
    Custom(Rc<dyn Fn(f64) -> String>),
}

impl Formatter {
    /// Build from a specifier string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the specifier is not supported.
    pub fn from_spec(spec: &str) -> Result<Self> {
        NumberFormat::parse(spec).map(Formatter::Spec)
    }

    /// Wrap a closure.
    pub fn custom(f: impl Fn(f64) -> String + 'static) -> Self {
        Formatter::Custom(Rc::new(f))
    }

    /// Format a number.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        match self {
            Formatter::Default => {
                let precision = if value.fract() == 0.0 {
                    0
                } else if value > 0.0 && value < 1.0 {
                    2
                } else {
                    1
                };
                NumberFormat::grouped_fixed(precision).format(value)
            }
            Formatter::Decimals(decimals) => format_with_decimals(value, *decimals),
            Formatter::Spec(spec) => spec.format(value),
            Formatter::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Default => f.write_str("Formatter::Default"),
            Formatter::Decimals(d) => write!(f, "Formatter::Decimals({d})"),
            Formatter::Spec(spec) => write!(f, "Formatter::Spec({spec:?})"),
            Formatter::Custom(_) => f.write_str("Formatter::Custom(..)"),
        }
    }
}
