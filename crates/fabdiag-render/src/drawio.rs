//! draw.io (`mxfile`) emitter.
//!
//! Cells are laid out from the shared [`Layout`]. Each tier becomes a container; redundancy
//! pairs (server pairs and leaf groups) become nested containers inside their tier, and node
//! geometry is written relative to the innermost container.

use crate::emit::Emitter;
use crate::layout::{CANVAS_MARGIN, Layout};
use crate::legend::{LegendEntry, legend_entries};
use crate::model::{Bounds, PortLabel};
use crate::style::{EDGE_BASE, Style};
use crate::util::{escape_xml, fmt_num};
use crate::{Format, Result};
use fabdiag_core::{LayeredNodes, Pairing, Tier, Topology};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;

const TIER_PAD: f64 = 20.0;
const TIER_TITLE: f64 = 20.0;
const PAIR_PAD: f64 = 8.0;
const PAIR_TITLE: f64 = 12.0;
const PORT_LABEL_WIDTH: f64 = 40.0;
const PORT_LABEL_HEIGHT: f64 = 14.0;
const LEGEND_WIDTH: f64 = 220.0;
const LEGEND_HEADER: f64 = 28.0;
const LEGEND_ROW: f64 = 22.0;
const MIN_PAGE_HEIGHT: f64 = 200.0;

const ROOT: &str = "1";

#[derive(Debug, Clone, Copy, Default)]
pub struct DrawioEmitter;

impl Emitter for DrawioEmitter {
    fn format(&self) -> Format {
        Format::Drawio
    }

    fn emit(&self, topology: &Topology, layout: &Layout<'_>, style: &Style) -> Result<String> {
        let legend = legend_entries(topology);
        let legend_height = if legend.is_empty() {
            0.0
        } else {
            LEGEND_HEADER + legend.len() as f64 * LEGEND_ROW + PAIR_PAD
        };
        let page_height = (layout.height + legend_height + CANVAS_MARGIN).max(MIN_PAGE_HEIGHT);

        let mut out = String::new();
        out.push_str("<mxfile host=\"fabdiag\" type=\"device\">\n");
        out.push_str("  <diagram id=\"fabric\" name=\"Fabric\">\n");
        let _ = writeln!(
            &mut out,
            r#"    <mxGraphModel dx="{w}" dy="{h}" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="{w}" pageHeight="{h}" math="0" shadow="0">"#,
            w = fmt_num(layout.width),
            h = fmt_num(page_height),
        );
        out.push_str("      <root>\n");
        out.push_str("        <mxCell id=\"0\"/>\n");
        out.push_str("        <mxCell id=\"1\" parent=\"0\"/>\n");

        let frames = frames(layout);
        let mut owner: FxHashMap<&str, usize> = FxHashMap::default();
        for (i, frame) in frames.iter().enumerate() {
            for member in &frame.members {
                owner.insert(member.as_str(), i);
            }
        }

        for frame in &frames {
            let (parent_id, origin) = match frame.parent {
                Some(p) => (frames[p].id.as_str(), (frames[p].bounds.min_x, frames[p].bounds.min_y)),
                None => (ROOT, (0.0, 0.0)),
            };
            let container_style = match frame.kind {
                FrameKind::Tier => style.tier_container,
                FrameKind::Pair => style.pair_container,
            };
            write_vertex(
                &mut out,
                &frame.id,
                &frame.label,
                container_style,
                parent_id,
                frame.bounds.min_x - origin.0,
                frame.bounds.min_y - origin.1,
                frame.bounds.width(),
                frame.bounds.height(),
            );
        }

        for node_box in &layout.nodes {
            let Some(node) = topology.node(&node_box.id) else {
                continue;
            };
            let (parent_id, origin) = match owner.get(node_box.id.as_str()) {
                Some(&i) => (frames[i].id.as_str(), (frames[i].bounds.min_x, frames[i].bounds.min_y)),
                None => (ROOT, (0.0, 0.0)),
            };
            write_vertex(
                &mut out,
                &node_cell_id(&node.id),
                &node.label,
                style.node_style(node_box.tier),
                parent_id,
                node_box.x - origin.0,
                node_box.y - origin.1,
                node_box.width,
                node_box.height,
            );
        }

        for edge in &layout.edges {
            let Some(link) = topology.links().get(edge.link) else {
                continue;
            };
            let entry = LegendEntry::for_link(link);
            let _ = writeln!(
                &mut out,
                r#"        <mxCell id="edge-{i}" value="" style="{base}{stroke}exitX={ex};exitY={ey};exitDx={dx};exitDy={dy};entryX={nx};entryY={ny};entryDx={dx};entryDy={dy};" edge="1" parent="{ROOT}" source="{s}" target="{t}">"#,
                i = edge.link,
                base = EDGE_BASE,
                stroke = style.link_style(entry),
                ex = fmt_num(edge.exit.x),
                ey = fmt_num(edge.exit.y),
                nx = fmt_num(edge.entry.x),
                ny = fmt_num(edge.entry.y),
                dx = fmt_num(edge.offset.dx),
                dy = fmt_num(edge.offset.dy),
                s = escape_xml(&node_cell_id(&edge.source)),
                t = escape_xml(&node_cell_id(&edge.target)),
            );
            out.push_str("          <mxGeometry relative=\"1\" as=\"geometry\"/>\n");
            out.push_str("        </mxCell>\n");
        }

        for edge in &layout.edges {
            if let Some(label) = &edge.source_label {
                write_port_label(&mut out, &format!("port-{}-src", edge.link), label, style);
            }
            if let Some(label) = &edge.target_label {
                write_port_label(&mut out, &format!("port-{}-dst", edge.link), label, style);
            }
        }

        if !legend.is_empty() {
            write_legend(&mut out, &legend, layout.height, legend_height, style);
        }

        out.push_str("      </root>\n");
        out.push_str("    </mxGraphModel>\n");
        out.push_str("  </diagram>\n");
        out.push_str("</mxfile>\n");
        Ok(out)
    }
}

pub fn node_cell_id(id: &str) -> String {
    format!("node-{id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Tier,
    Pair,
}

#[derive(Debug, Clone)]
struct Frame {
    id: String,
    kind: FrameKind,
    label: String,
    parent: Option<usize>,
    /// Absolute, padded.
    bounds: Bounds,
    /// Nodes placed directly inside this frame.
    members: Vec<String>,
}

fn frames(layout: &Layout<'_>) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for tier in Tier::ALL {
        let ids = layout.layers.ids(tier);
        let Some(b) = layout.bounds_of(ids.iter().copied()) else {
            continue;
        };
        frames.push(Frame {
            id: format!("tier-{}", tier.as_str()),
            kind: FrameKind::Tier,
            label: tier.title().to_string(),
            parent: None,
            bounds: Bounds {
                min_x: b.min_x - TIER_PAD,
                min_y: b.min_y - TIER_PAD - TIER_TITLE,
                max_x: b.max_x + TIER_PAD,
                max_y: b.max_y + TIER_PAD,
            },
            members: ids.iter().map(|s| s.to_string()).collect(),
        });
    }

    for (tier, prefix, groups) in pair_groups(&layout.layers, &layout.pairing) {
        let Some(parent) = frames.iter().position(|f| f.id == format!("tier-{}", tier.as_str()))
        else {
            continue;
        };
        for (a, b, label) in groups {
            let Some(bounds) = layout.bounds_of([a.as_str(), b.as_str()]) else {
                continue;
            };
            frames[parent].members.retain(|m| *m != a && *m != b);
            frames.push(Frame {
                id: format!("{prefix}-{a}-{b}"),
                kind: FrameKind::Pair,
                label: label.to_string(),
                parent: Some(parent),
                bounds: Bounds {
                    min_x: bounds.min_x - PAIR_PAD,
                    min_y: bounds.min_y - PAIR_PAD - PAIR_TITLE,
                    max_x: bounds.max_x + PAIR_PAD,
                    max_y: bounds.max_y + PAIR_PAD,
                },
                members: vec![a, b],
            });
        }
    }
    frames
}

type PairGroups = Vec<(String, String, &'static str)>;

/// Server pairs and leaf groups whose members sit next to each other in their row.
fn pair_groups(
    layers: &LayeredNodes<'_>,
    pairing: &Pairing,
) -> [(Tier, &'static str, PairGroups); 2] {
    let adjacent = |tier: Tier, a: &str, b: &str| {
        let ids = layers.ids(tier);
        let pa = ids.iter().position(|id| *id == a);
        let pb = ids.iter().position(|id| *id == b);
        matches!((pa, pb), (Some(x), Some(y)) if x.abs_diff(y) == 1)
    };

    let leaves = pairing
        .leaf_groups
        .iter()
        .filter(|g| adjacent(Tier::Leaf, &g.leaves[0], &g.leaves[1]))
        .map(|g| (g.leaves[0].clone(), g.leaves[1].clone(), g.redundancy.as_str()))
        .collect();
    let servers = pairing
        .server_pairs()
        .into_iter()
        .filter(|(a, b, _)| adjacent(Tier::Server, a, b))
        .map(|(a, b, r)| (a.to_string(), b.to_string(), r.as_str()))
        .collect();

    [
        (Tier::Leaf, "group", leaves),
        (Tier::Server, "pair", servers),
    ]
}

#[allow(clippy::too_many_arguments)]
fn write_vertex(
    out: &mut String,
    id: &str,
    value: &str,
    style: &str,
    parent: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) {
    let _ = writeln!(
        out,
        r#"        <mxCell id="{}" value="{}" style="{}" vertex="1" parent="{}">"#,
        escape_xml(id),
        escape_xml(value),
        escape_xml(style),
        escape_xml(parent),
    );
    let _ = writeln!(
        out,
        r#"          <mxGeometry x="{}" y="{}" width="{}" height="{}" as="geometry"/>"#,
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height),
    );
    out.push_str("        </mxCell>\n");
}

fn write_port_label(out: &mut String, id: &str, label: &PortLabel, style: &Style) {
    let label_style = format!("{}rotation={};", style.port_label, fmt_num(label.rotation));
    write_vertex(
        out,
        id,
        &label.text,
        &label_style,
        ROOT,
        label.x - PORT_LABEL_WIDTH / 2.0,
        label.y - PORT_LABEL_HEIGHT / 2.0,
        PORT_LABEL_WIDTH,
        PORT_LABEL_HEIGHT,
    );
}

fn write_legend(out: &mut String, entries: &[LegendEntry], top: f64, height: f64, style: &Style) {
    write_vertex(
        out,
        "legend",
        "Legend",
        style.legend_container,
        ROOT,
        CANVAS_MARGIN,
        top,
        LEGEND_WIDTH,
        height,
    );
    for (i, entry) in entries.iter().enumerate() {
        let y = LEGEND_HEADER + i as f64 * LEGEND_ROW + LEGEND_ROW / 2.0;
        let _ = writeln!(
            out,
            r#"        <mxCell id="legend-{key}" value="" style="{EDGE_BASE}{stroke}" edge="1" parent="legend">"#,
            key = entry.key(),
            stroke = style.link_style(*entry),
        );
        out.push_str("          <mxGeometry relative=\"1\" as=\"geometry\">\n");
        let _ = writeln!(
            out,
            r#"            <mxPoint x="12" y="{}" as="sourcePoint"/>"#,
            fmt_num(y)
        );
        let _ = writeln!(
            out,
            r#"            <mxPoint x="62" y="{}" as="targetPoint"/>"#,
            fmt_num(y)
        );
        out.push_str("          </mxGeometry>\n");
        out.push_str("        </mxCell>\n");
        write_vertex(
            out,
            &format!("legend-{}-label", entry.key()),
            entry.label(),
            "text;align=left;verticalAlign=middle;fontSize=10;",
            "legend",
            72.0,
            y - 8.0,
            LEGEND_WIDTH - 80.0,
            16.0,
        );
    }
}
