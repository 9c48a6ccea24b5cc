//! SVG drawing surface.
//!
//! Charts append elements to a [`Surface`] and keep the returned indices so
//! interaction can restyle a mark after it has been drawn.

use crate::color::Rgba;
use crate::error::{Error, Result};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// An SVG element.
///
/// Field names match SVG attribute names.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f64,
        opacity: Option<f64>,
        id: Option<String>,
        class: Option<String>,
    },
    /// Text
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        fill: Rgba,
        anchor: TextAnchor,
        class: Option<String>,
    },
}

impl SvgElement {
    /// A plain filled rectangle.
    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64, fill: Rgba) -> Self {
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke: None,
            stroke_width: 1.0,
            opacity: None,
            id: None,
            class: None,
        }
    }

    /// Text at a position.
    #[must_use]
    pub fn text(x: f64, y: f64, text: &str, font_size: f64, anchor: TextAnchor) -> Self {
        SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill: Rgba::BLACK,
            anchor,
            class: None,
        }
    }

    /// Set the `class` attribute.
    #[must_use]
    pub fn with_class(mut self, value: &str) -> Self {
        match &mut self {
            SvgElement::Rect { class, .. } | SvgElement::Text { class, .. } => {
                *class = Some(value.to_string());
            }
        }
        self
    }

    /// Fill color.
    #[must_use]
    pub fn fill(&self) -> Rgba {
        match self {
            SvgElement::Rect { fill, .. } | SvgElement::Text { fill, .. } => *fill,
        }
    }

    /// The `class` attribute.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        match self {
            SvgElement::Rect { class, .. } | SvgElement::Text { class, .. } => class.as_deref(),
        }
    }
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Align text start at position
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position
    End,
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl Surface {
    /// Create an empty surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(Rgba::WHITE), elements: Vec::new() }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Append an element and return its index.
    pub fn add_element(&mut self, element: SvgElement) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// All elements in drawing order.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Element at `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&SvgElement> {
        self.elements.get(index)
    }

    /// Elements carrying `class`.
    pub fn with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a SvgElement> + 'a {
        self.elements.iter().filter(move |e| e.class() == Some(class))
    }

    /// Change the fill of an element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarkNotFound`] if there is no element at `index`.
    pub fn set_fill(&mut self, index: usize, color: Rgba) -> Result<()> {
        match self.elements.get_mut(index) {
            Some(SvgElement::Rect { fill, .. } | SvgElement::Text { fill, .. }) => {
                *fill = color;
                Ok(())
            }
            None => Err(Error::MarkNotFound(index)),
        }
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, bg.to_css());
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect { x, y, width, height, fill, stroke, stroke_width, opacity, id, class } => {
            let mut attrs = String::new();
            if let Some(id) = id {
                let _ = write!(attrs, r#" id="{}""#, escape(id));
            }
            if let Some(class) = class {
                let _ = write!(attrs, r#" class="{}""#, escape(class));
            }
            if let Some(s) = stroke {
                let _ = write!(attrs, r#" stroke="{}" stroke-width="{stroke_width}""#, s.to_css());
            }
            if let Some(o) = opacity {
                let _ = write!(attrs, r#" fill-opacity="{o}""#);
            }
            format!(
                r#"<rect{attrs} x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"/>"#,
                fill.to_css()
            )
        }
        SvgElement::Text { x, y, text, font_size, fill, anchor, class } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let class_attr =
                class.as_ref().map(|c| format!(r#" class="{}""#, escape(c))).unwrap_or_default();
            format!(
                r#"<text{class_attr} x="{x}" y="{y}" font-size="{font_size}" fill="{}" text-anchor="{anchor_str}" font-family="sans-serif">{}</text>"#,
                fill.to_css(),
                escape(text)
            )
        }
    }
}
