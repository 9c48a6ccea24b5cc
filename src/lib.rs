//! # Trueno-Bars
//!
//! Bar charts and spine plots over tabular records, rendered to SVG, with
//! quantile-based color classification.
//!
//! ## Features
//!
//! - **Six layouts**: plain, grouped (x or y), stacked (x or y) and spine plots
//! - **Quantile classification**: breakpoints computed from the data or
//!   predefined, with out-of-range and unclassified colors
//! - **Typed pipeline**: configured → loaded → scaled → drawn, enforced by types
//! - **Declarative settings**: charts can be described in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trueno_bars::prelude::*;
//!
//! let chart = BarChart::new()
//!     .x("region")
//!     .y("total")
//!     .color("total")
//!     .quantiles(QuantileConfig::new().buckets(5).colors(&palette))
//!     .build()?;
//!
//! let mut surface = chart.surface();
//! let mut drawn = chart.render(&records, &mut surface)?;
//! drawn.mouse_over(&mut surface, 0)?;
//! surface.write_to_file("bars.svg")?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Colors and categorical palettes.
pub mod color;

/// Records and cell values.
pub mod data;

/// Number formatting.
pub mod format;

/// Quantile breakpoints and color classification.
pub mod quantile;

/// Scale functions for data-to-visual mappings.
pub mod scale;

// ============================================================================
// Chart Modules
// ============================================================================

/// Chart configuration and YAML settings.
pub mod config;

/// Data preparation.
pub mod prepare;

/// Scale selection per layout.
pub mod layout;

/// Tooltips.
pub mod tooltip;

/// Chart components and the drawing pipeline.
pub mod charts;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Output encoders (SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-bars operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use trueno_bars::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::charts::{BarChart, Chart, Drawn, Loaded, Mark, Scaled, Spineplot};
    pub use crate::color::{Rgba, CATEGORY10, CATEGORY20C};
    pub use crate::config::{Axis, ChartSettings, LayoutMode, Margin, Order, Orientation};
    pub use crate::data::{Record, Value};
    pub use crate::error::{Error, Result};
    pub use crate::format::Formatter;
    pub use crate::output::Surface;
    pub use crate::quantile::{compute_breakpoints, QuantileClassifier, QuantileConfig};
    pub use crate::scale::{BandScale, LinearScale, OrdinalScale, Scale, ScaleKind};
    pub use crate::tooltip::TipTarget;
}
