//! Output encoders.

mod svg;

pub use svg::{Surface, SvgElement, TextAnchor};
