//! Mermaid flowchart emitter.

use crate::emit::Emitter;
use crate::layout::Layout;
use crate::legend::{LegendEntry, legend_entries};
use crate::style::Style;
use crate::util::{IdAllocator, escape_mermaid, sanitize_id};
use crate::{Format, Result};
use fabdiag_core::{Node, Tier, Topology};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidEmitter;

impl Emitter for MermaidEmitter {
    fn format(&self) -> Format {
        Format::Mermaid
    }

    fn emit(&self, topology: &Topology, layout: &Layout<'_>, _style: &Style) -> Result<String> {
        let mut ids = MermaidIds::new(topology);
        let mut out = String::from("flowchart TB\n");

        for tier in Tier::ALL {
            write_tier(&mut out, tier, layout, &mut ids);
        }

        let mut link_styles: BTreeMap<LegendEntry, Vec<usize>> = BTreeMap::new();
        let mut index = 0usize;
        for edge in &layout.edges {
            let Some(link) = topology.links().get(edge.link) else {
                continue;
            };
            let label = match (link.source_port_name(), link.target_port_name()) {
                (Some(s), Some(t)) => format!("{s} : {t}"),
                (Some(p), None) | (None, Some(p)) => p.to_string(),
                (None, None) => String::new(),
            };
            let _ = write!(out, "  {} ---", ids.get(&link.source));
            if !label.is_empty() {
                let _ = write!(out, "|\"{}\"|", escape_mermaid(&label));
            }
            let _ = writeln!(out, " {}", ids.get(&link.target));
            link_styles
                .entry(LegendEntry::for_link(link))
                .or_default()
                .push(index);
            index += 1;
        }

        let legend = legend_entries(topology);
        if !legend.is_empty() {
            out.push_str("  subgraph legend[\"Legend\"]\n    direction LR\n");
            for entry in &legend {
                let key = entry.key();
                let _ = writeln!(
                    out,
                    "    legend_{key}_a[\" \"] ---|\"{}\"| legend_{key}_b[\" \"]",
                    entry.label()
                );
                link_styles.entry(*entry).or_default().push(index);
                index += 1;
            }
            out.push_str("  end\n");
        }

        for (entry, indices) in &link_styles {
            let list: Vec<String> = indices.iter().map(usize::to_string).collect();
            let _ = write!(
                out,
                "  linkStyle {} stroke:{},stroke-width:2px",
                list.join(","),
                entry.color()
            );
            if entry.is_dashed() {
                out.push_str(",stroke-dasharray:5 4");
            }
            out.push_str(";\n");
        }

        for tier in Tier::ALL {
            let nodes = layout.layers.tier(tier);
            if nodes.is_empty() {
                continue;
            }
            let _ = writeln!(out, "  classDef {} {};", tier.as_str(), class_style(tier));
            let members: Vec<&str> = nodes.iter().map(|n| ids.get(&n.id)).collect();
            let _ = writeln!(out, "  class {} {};", members.join(","), tier.as_str());
        }
        Ok(out)
    }
}

fn class_style(tier: Tier) -> &'static str {
    match tier {
        Tier::Gateway => "fill:#e1d5e7,stroke:#9673a6",
        Tier::Spine => "fill:#dae8fc,stroke:#6c8ebf",
        Tier::Leaf => "fill:#d5e8d4,stroke:#82b366",
        Tier::Server => "fill:#f5f5f5,stroke:#666666",
        Tier::External => "fill:#ffe6cc,stroke:#d79b00",
    }
}

/// Node and subgraph ids rewritten to Mermaid-safe identifiers, unique across the diagram.
struct MermaidIds {
    ids: FxHashMap<String, String>,
    alloc: IdAllocator,
}

impl MermaidIds {
    fn new(topology: &Topology) -> Self {
        let mut alloc = IdAllocator::default();
        let ids = topology
            .nodes()
            .iter()
            .map(|node| {
                let id = alloc.claim(format!("n_{}", sanitize_id(&node.id)));
                (node.id.clone(), id)
            })
            .collect();
        Self { ids, alloc }
    }

    fn get<'s>(&'s self, id: &'s str) -> &'s str {
        self.ids.get(id).map_or(id, String::as_str)
    }

    fn group(&mut self, a: &str, b: &str) -> String {
        self.alloc
            .claim(format!("group_{}_{}", sanitize_id(a), sanitize_id(b)))
    }
}

fn write_node(out: &mut String, indent: &str, node: &Node, ids: &MermaidIds) {
    let _ = writeln!(
        out,
        "{indent}{}[\"{}\"]",
        ids.get(&node.id),
        escape_mermaid(&node.label)
    );
}

fn write_tier(out: &mut String, tier: Tier, layout: &Layout<'_>, ids: &mut MermaidIds) {
    let nodes = layout.layers.tier(tier);
    if nodes.is_empty() {
        return;
    }

    let groups: Vec<(String, String, &str)> = match tier {
        Tier::Leaf => layout
            .pairing
            .leaf_groups
            .iter()
            .map(|g| (g.leaves[0].clone(), g.leaves[1].clone(), g.redundancy.as_str()))
            .collect(),
        Tier::Server => layout
            .pairing
            .server_pairs()
            .into_iter()
            .map(|(a, b, r)| (a.to_string(), b.to_string(), r.as_str()))
            .collect(),
        _ => Vec::new(),
    };

    let _ = writeln!(out, "  subgraph tier_{}[\"{}\"]", tier.as_str(), tier.title());
    out.push_str("    direction LR\n");
    for (a, b, label) in &groups {
        let group = ids.group(a, b);
        let _ = writeln!(out, "    subgraph {group}[\"{label}\"]");
        for id in [a, b] {
            if let Some(node) = nodes.iter().find(|n| n.id == *id) {
                write_node(out, "      ", node, ids);
            }
        }
        out.push_str("    end\n");
    }
    for node in nodes
        .iter()
        .filter(|n| !groups.iter().any(|(a, b, _)| *a == n.id || *b == n.id))
    {
        write_node(out, "    ", node, ids);
    }
    out.push_str("  end\n");
}
