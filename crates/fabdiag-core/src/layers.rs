//! Tier classification: gateway, spine, leaf, server and external rows.

use crate::model::{Node, NodeKind, Topology};
use crate::pairing::Pairing;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Gateway,
    Spine,
    Leaf,
    Server,
    External,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Self::Gateway,
        Self::Spine,
        Self::Leaf,
        Self::Server,
        Self::External,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Spine => "spine",
            Self::Leaf => "leaf",
            Self::Server => "server",
            Self::External => "external",
        }
    }

    /// Plural display title used for clusters.
    pub fn title(self) -> &'static str {
        match self {
            Self::Gateway => "Gateways",
            Self::Spine => "Spines",
            Self::Leaf => "Leaves",
            Self::Server => "Servers",
            Self::External => "Externals",
        }
    }
}

/// The five tiers of a topology as ordered node slices. Recomputed per render.
#[derive(Debug, Clone, Default)]
pub struct LayeredNodes<'a> {
    pub gateway: Vec<&'a Node>,
    pub spine: Vec<&'a Node>,
    pub leaf: Vec<&'a Node>,
    pub server: Vec<&'a Node>,
    pub external: Vec<&'a Node>,
}

impl<'a> LayeredNodes<'a> {
    /// Partitions and sorts nodes. Servers come out in id order; see [`layer_topology`] for the
    /// pairing-aware server order.
    pub fn classify(topology: &'a Topology) -> Self {
        let mut layers = Self::default();
        for node in topology.nodes() {
            match node.kind {
                NodeKind::Switch if node.is_spine() => layers.spine.push(node),
                NodeKind::Switch => layers.leaf.push(node),
                NodeKind::Server => layers.server.push(node),
                NodeKind::Gateway => layers.gateway.push(node),
                NodeKind::External => {
                    if topology.degree(&node.id) > 0 {
                        layers.external.push(node);
                    } else {
                        tracing::debug!(id = %node.id, "omitting external without links");
                    }
                }
            }
        }

        layers.spine.sort_by(|a, b| switch_order(a, b));
        layers.leaf.sort_by(|a, b| switch_order(a, b));
        layers.gateway.sort_by(|a, b| a.id.cmp(&b.id));
        layers.external.sort_by(|a, b| a.id.cmp(&b.id));
        layers.server.sort_by(|a, b| a.id.cmp(&b.id));
        layers
    }

    pub fn tier(&self, tier: Tier) -> &[&'a Node] {
        match tier {
            Tier::Gateway => &self.gateway,
            Tier::Spine => &self.spine,
            Tier::Leaf => &self.leaf,
            Tier::Server => &self.server,
            Tier::External => &self.external,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &'a Node)> + '_ {
        Tier::ALL
            .into_iter()
            .flat_map(move |tier| self.tier(tier).iter().map(move |n| (tier, *n)))
    }

    pub fn len(&self) -> usize {
        Tier::ALL.iter().map(|t| self.tier(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the tier and position of a node.
    pub fn position(&self, id: &str) -> Option<(Tier, usize)> {
        Tier::ALL.into_iter().find_map(|tier| {
            self.tier(tier)
                .iter()
                .position(|n| n.id == id)
                .map(|idx| (tier, idx))
        })
    }

    pub fn tier_of(&self, id: &str) -> Option<Tier> {
        self.position(id).map(|(tier, _)| tier)
    }

    pub fn ids(&self, tier: Tier) -> Vec<&'a str> {
        self.tier(tier).iter().map(|n| n.id.as_str()).collect()
    }

    /// Reorders the server tier to follow `order`; servers missing from it go last, by id.
    pub fn order_servers(&mut self, order: &[String]) {
        let rank: FxHashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        self.server.sort_by(|a, b| {
            let ra = rank.get(a.id.as_str()).copied().unwrap_or(usize::MAX);
            let rb = rank.get(b.id.as_str()).copied().unwrap_or(usize::MAX);
            ra.cmp(&rb).then_with(|| a.id.cmp(&b.id))
        });
    }
}

/// Nodes carrying a description sort first (by description), then everything by id.
fn switch_order(a: &Node, b: &Node) -> Ordering {
    match (a.description.as_deref(), b.description.as_deref()) {
        (Some(da), Some(db)) => da.cmp(db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

/// Classifies the topology, infers redundancy pairs and applies the final server order.
pub fn layer_topology(topology: &Topology) -> (LayeredNodes<'_>, Pairing) {
    let mut layers = LayeredNodes::classify(topology);
    let pairing = Pairing::compute(topology, &layers);
    let order = pairing.server_order(&layers);
    layers.order_servers(&order);
    (layers, pairing)
}
