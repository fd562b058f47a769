//! Graphviz DOT emitter.
//!
//! Tiers become `cluster_*` subgraphs pinned to one rank. Parallel spine→leaf fabric links are
//! folded into one edge whose width grows with the link count.

use crate::emit::Emitter;
use crate::layout::Layout;
use crate::legend::{LegendEntry, legend_entries};
use crate::style::Style;
use crate::util::{IdAllocator, escape_dot, fmt_num, sanitize_id};
use crate::{Format, Result};
use fabdiag_core::{Link, LinkKind, Node, NodeKind, Tier, Topology};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;

const BASE_PENWIDTH: f64 = 1.0;
const PENWIDTH_STEP: f64 = 1.0;
const MAX_PENWIDTH: f64 = 6.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct DotEmitter;

impl Emitter for DotEmitter {
    fn format(&self) -> Format {
        Format::Dot
    }

    fn emit(&self, topology: &Topology, layout: &Layout<'_>, _style: &Style) -> Result<String> {
        let mut out = String::new();
        out.push_str("graph fabric {\n");
        out.push_str("  graph [rankdir=TB, splines=line, nodesep=0.5, ranksep=1.2, fontname=\"Helvetica\"];\n");
        out.push_str("  node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\", fontsize=10];\n");
        out.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n");

        let mut clusters = IdAllocator::default();
        for name in Tier::ALL.map(Tier::as_str).into_iter().chain(["legend"]) {
            clusters.claim(format!("cluster_{name}"));
        }
        for tier in Tier::ALL {
            write_tier(&mut out, tier, layout, &mut clusters);
        }

        for edge in collapse_links(topology, layout) {
            write_edge(&mut out, &edge);
        }

        write_legend(&mut out, &legend_entries(topology));
        out.push_str("}\n");
        Ok(out)
    }
}

fn tier_fill(tier: Tier) -> &'static str {
    match tier {
        Tier::Gateway => "#e1d5e7",
        Tier::Spine => "#dae8fc",
        Tier::Leaf => "#d5e8d4",
        Tier::Server => "#f5f5f5",
        Tier::External => "#ffe6cc",
    }
}

fn node_shape(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::Switch | NodeKind::Server => "box",
        NodeKind::Gateway => "hexagon",
        NodeKind::External => "ellipse",
    }
}

fn write_node(out: &mut String, indent: &str, node: &Node, tier: Tier) {
    let _ = writeln!(
        out,
        "{indent}\"{}\" [label=\"{}\", shape={}, fillcolor=\"{}\"];",
        escape_dot(&node.id),
        escape_dot(&node.label),
        node_shape(node),
        tier_fill(tier),
    );
}

fn write_tier(out: &mut String, tier: Tier, layout: &Layout<'_>, clusters: &mut IdAllocator) {
    let nodes = layout.layers.tier(tier);
    if nodes.is_empty() {
        return;
    }

    let groups: Vec<(&str, &str, &str)> = match tier {
        Tier::Leaf => layout
            .pairing
            .leaf_groups
            .iter()
            .map(|g| (g.leaves[0].as_str(), g.leaves[1].as_str(), g.redundancy.as_str()))
            .collect(),
        Tier::Server => layout
            .pairing
            .server_pairs()
            .into_iter()
            .map(|(a, b, r)| (a, b, r.as_str()))
            .collect(),
        _ => Vec::new(),
    };
    let grouped = |id: &str| groups.iter().any(|(a, b, _)| *a == id || *b == id);

    let _ = writeln!(out, "  subgraph cluster_{} {{", tier.as_str());
    let _ = writeln!(out, "    label=\"{}\";", tier.title());
    out.push_str("    style=dashed;\n    color=\"#b3b3b3\";\n");

    for (a, b, label) in &groups {
        let cluster = clusters.claim(format!("cluster_{}_{}", sanitize_id(a), sanitize_id(b)));
        let _ = writeln!(out, "    subgraph {cluster} {{");
        let _ = writeln!(out, "      label=\"{label}\";");
        out.push_str("      style=dotted;\n");
        for id in [a, b] {
            if let Some(node) = nodes.iter().find(|n| n.id == *id) {
                write_node(out, "      ", node, tier);
            }
        }
        out.push_str("    }\n");
    }

    for node in nodes.iter().filter(|n| !grouped(&n.id)) {
        write_node(out, "    ", node, tier);
    }

    out.push_str("    {rank=same;");
    for node in nodes {
        let _ = write!(out, " \"{}\";", escape_dot(&node.id));
    }
    out.push_str("}\n");
    out.push_str("  }\n");
}

#[derive(Debug, Clone)]
struct DotEdge<'a> {
    source: &'a str,
    target: &'a str,
    entry: LegendEntry,
    count: usize,
    tail_ports: Vec<&'a str>,
    head_ports: Vec<&'a str>,
}

fn is_spine_leaf_fabric(link: &Link, layout: &Layout<'_>) -> bool {
    link.kind == LinkKind::Fabric
        && layout.layers.tier_of(&link.source) == Some(Tier::Spine)
        && layout.layers.tier_of(&link.target) == Some(Tier::Leaf)
}

/// One edge per link, except spine→leaf fabric links sharing both endpoints, which fold into
/// the first of them.
fn collapse_links<'a>(topology: &'a Topology, layout: &Layout<'_>) -> Vec<DotEdge<'a>> {
    let mut edges: Vec<DotEdge<'a>> = Vec::new();
    let mut folded: FxHashMap<(&'a str, &'a str), usize> = FxHashMap::default();

    for link in topology.links() {
        if layout.node_box(&link.source).is_none() || layout.node_box(&link.target).is_none() {
            continue;
        }
        let tail = link.source_port_name();
        let head = link.target_port_name();

        if is_spine_leaf_fabric(link, layout) {
            let key = (link.source.as_str(), link.target.as_str());
            if let Some(&i) = folded.get(&key) {
                let edge = &mut edges[i];
                edge.count += 1;
                edge.tail_ports.extend(tail);
                edge.head_ports.extend(head);
                continue;
            }
            folded.insert(key, edges.len());
        }

        edges.push(DotEdge {
            source: &link.source,
            target: &link.target,
            entry: LegendEntry::for_link(link),
            count: 1,
            tail_ports: tail.into_iter().collect(),
            head_ports: head.into_iter().collect(),
        });
    }
    edges
}

fn write_edge(out: &mut String, edge: &DotEdge<'_>) {
    let _ = write!(
        out,
        "  \"{}\" -- \"{}\" [color=\"{}\"",
        escape_dot(edge.source),
        escape_dot(edge.target),
        edge.entry.color(),
    );
    if edge.entry.is_dashed() {
        out.push_str(", style=dashed");
    }
    if edge.count > 1 {
        let width =
            (BASE_PENWIDTH + PENWIDTH_STEP * edge.count as f64).min(MAX_PENWIDTH);
        let _ = write!(out, ", penwidth={}", fmt_num(width));
    }
    if !edge.tail_ports.is_empty() {
        let _ = write!(out, ", taillabel=\"{}\"", escape_dot(&edge.tail_ports.join(",")));
    }
    if !edge.head_ports.is_empty() {
        let _ = write!(out, ", headlabel=\"{}\"", escape_dot(&edge.head_ports.join(",")));
    }
    out.push_str("];\n");
}

fn write_legend(out: &mut String, entries: &[LegendEntry]) {
    if entries.is_empty() {
        return;
    }
    out.push_str("  subgraph cluster_legend {\n");
    out.push_str("    label=\"Legend\";\n    style=solid;\n    color=\"#666666\";\n");
    out.push_str("    node [shape=plaintext, style=\"\", label=\"\", width=0.3, height=0.2];\n");
    for entry in entries {
        let key = entry.key();
        let _ = write!(
            out,
            "    \"legend_{key}_a\" -- \"legend_{key}_b\" [label=\"{}\", color=\"{}\"",
            entry.label(),
            entry.color(),
        );
        if entry.is_dashed() {
            out.push_str(", style=dashed");
        }
        out.push_str("];\n");
    }
    out.push_str("  }\n");
}
