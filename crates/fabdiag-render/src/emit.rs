use crate::dot::DotEmitter;
use crate::drawio::DrawioEmitter;
use crate::layout::Layout;
use crate::mermaid::MermaidEmitter;
use crate::style::Style;
use crate::{Format, Result};
use fabdiag_core::Topology;

/// A text backend. Implementations are stateless; the same inputs always produce the same
/// bytes.
pub trait Emitter {
    fn format(&self) -> Format;

    fn emit(&self, topology: &Topology, layout: &Layout<'_>, style: &Style) -> Result<String>;
}

pub fn emitter_for(format: Format) -> &'static dyn Emitter {
    match format {
        Format::Drawio => &DrawioEmitter,
        Format::Dot => &DotEmitter,
        Format::Mermaid => &MermaidEmitter,
    }
}
