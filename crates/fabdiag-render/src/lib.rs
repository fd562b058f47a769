#![forbid(unsafe_code)]

//! Layout and text emitters for fabric topologies.
//!
//! [`Layout::compute`] places tiers on a fixed canvas; an [`Emitter`] turns the topology plus
//! its layout into draw.io XML, Graphviz DOT or a Mermaid flowchart.

pub mod dot;
pub mod drawio;
pub mod emit;
pub mod geom;
pub mod layout;
pub mod legend;
pub mod mermaid;
pub mod model;
pub mod style;

mod util;

pub use emit::{Emitter, emitter_for};
pub use layout::{Layout, LayoutSession};
pub use legend::{LegendEntry, legend_entries};
pub use style::{Style, StyleName};

use fabdiag_core::Topology;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported output format: {format} (expected drawio, dot or mermaid)")]
    UnsupportedFormat { format: String },
    #[error("unsupported style: {style} (expected default, cisco or hedgehog)")]
    UnsupportedStyle { style: String },
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    #[default]
    Drawio,
    Dot,
    Mermaid,
}

impl Format {
    pub const ALL: [Format; 3] = [Self::Drawio, Self::Dot, Self::Mermaid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drawio => "drawio",
            Self::Dot => "dot",
            Self::Mermaid => "mermaid",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Drawio => "diagram.drawio",
            Self::Dot => "diagram.dot",
            Self::Mermaid => "diagram.mmd",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drawio" => Ok(Self::Drawio),
            "dot" => Ok(Self::Dot),
            "mermaid" | "mmd" => Ok(Self::Mermaid),
            _ => Err(Error::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: Format,
    /// Applied by the draw.io emitter only.
    pub style: StyleName,
}

impl RenderOptions {
    /// Parses both names, rejecting unknown values.
    pub fn from_names(format: &str, style: &str) -> Result<Self> {
        Ok(Self {
            format: format.parse()?,
            style: style.parse()?,
        })
    }
}

pub fn render_topology(topology: &Topology, options: &RenderOptions) -> Result<String> {
    let layout = Layout::compute(topology);
    render_layout(topology, &layout, options)
}

/// Emits an already computed layout.
pub fn render_layout(
    topology: &Topology,
    layout: &Layout<'_>,
    options: &RenderOptions,
) -> Result<String> {
    emitter_for(options.format).emit(topology, layout, options.style.style())
}
