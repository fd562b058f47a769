#![forbid(unsafe_code)]

//! `fabdiag` turns fabric wiring records into network diagrams.
//!
//! The core pipeline (records → topology → tiers and redundancy pairs) is re-exported from
//! `fabdiag-core`.
//!
//! # Features
//!
//! - `render`: enable layout and the draw.io / DOT / Mermaid emitters (`fabdiag::render`)

pub use fabdiag_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use fabdiag_render::model;
    pub use fabdiag_render::{
        Emitter, Error, Format, Layout, LayoutSession, LegendEntry, RenderOptions, Style, StyleName,
        emitter_for, legend_entries, render_layout, render_topology,
    };

    use std::time::{Duration, Instant};

    #[derive(Debug, thiserror::Error)]
    pub enum PipelineError {
        #[error(transparent)]
        Records(#[from] fabdiag_core::Error),
        #[error(transparent)]
        Render(#[from] fabdiag_render::Error),
    }

    pub type Result<T> = std::result::Result<T, PipelineError>;

    fn render_timing_enabled() -> bool {
        static ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
        *ENABLED.get_or_init(|| {
            matches!(
                std::env::var("FABDIAG_RENDER_TIMING").as_deref(),
                Ok("1") | Ok("true")
            )
        })
    }

    /// Records → diagram text.
    pub fn render_records(
        records: &[fabdiag_core::Record],
        options: &RenderOptions,
    ) -> Result<String> {
        render_stages(records, options, None)
    }

    /// Runs the whole pipeline on a YAML record stream.
    ///
    /// With `FABDIAG_RENDER_TIMING=1` the duration of each stage is logged at `info`.
    pub fn render_yaml(text: &str, options: &RenderOptions) -> Result<String> {
        let total_start = render_timing_enabled().then(Instant::now);
        let records = fabdiag_core::parse_records(text)?;
        let parsed = total_start.map(|start| (start, start.elapsed()));
        render_stages(&records, options, parsed)
    }

    fn render_stages(
        records: &[fabdiag_core::Record],
        options: &RenderOptions,
        parsed: Option<(Instant, Duration)>,
    ) -> Result<String> {
        let timing_enabled = render_timing_enabled();
        let total_start = parsed
            .map(|(start, _)| start)
            .or_else(|| timing_enabled.then(Instant::now));

        let extract_start = timing_enabled.then(Instant::now);
        let topology = fabdiag_core::extract_topology(records);
        let extract = extract_start.map(|s| s.elapsed());

        let layout_start = timing_enabled.then(Instant::now);
        let layout = Layout::compute(&topology);
        let layout_time = layout_start.map(|s| s.elapsed());

        let emit_start = timing_enabled.then(Instant::now);
        let out = render_layout(&topology, &layout, options)?;
        let emit = emit_start.map(|s| s.elapsed());

        if let Some(start) = total_start {
            tracing::info!(
                format = %options.format,
                records = records.len(),
                nodes = topology.nodes().len(),
                links = topology.links().len(),
                total = ?start.elapsed(),
                parse = ?parsed.map(|(_, d)| d).unwrap_or_default(),
                extract = ?extract.unwrap_or_default(),
                layout = ?layout_time.unwrap_or_default(),
                emit = ?emit.unwrap_or_default(),
                bytes = out.len(),
                "render timing"
            );
        }
        Ok(out)
    }
}
